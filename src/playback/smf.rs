// Standard MIDI File encoding of an exported sequence.
//
// Output is SMF format 0: one track on channel 0. Every chord starts with a
// marker carrying its 0-based index, followed by a tempo event when the tempo
// differs from the previous chord's, then its note-ons. Its note-offs sit at
// the chord's end tick, ahead of the next chord's marker.
//
// Tempo meta events hold whole microseconds per quarter note in 24 bits, so a
// decoded time can differ from the export by a few microseconds (bpm 70 is
// stored as 857142 µs), and tempos of 3 bpm or slower cannot be written.

use midly::{
    num::{u15, u24, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};
use tracing::debug;

use crate::error::ChordError;

use super::types::{NoteEvent, NoteEventKind, PlaybackData};

/// Ticks per quarter note in MIDI output.
pub const TICKS_PER_QUARTER: u16 = 480;

const CHANNEL: u8 = 0;

fn beats_to_ticks(beats: f64) -> u32 {
    (beats * TICKS_PER_QUARTER as f64).round() as u32
}

const DEFAULT_TEMPO_MICROS: u32 = 500_000;
const MAX_TEMPO_MICROS: u32 = 0xFF_FFFF;

fn tempo_micros(bpm: u16) -> Result<u24, ChordError> {
    let micros = 60_000_000 / bpm.max(1) as u32;
    if micros > MAX_TEMPO_MICROS {
        return Err(ChordError::Midi(format!("{} bpm is too slow for a MIDI tempo event", bpm)));
    }
    Ok(u24::new(micros))
}

/// Encode an export as SMF bytes. `velocity` is clamped to 127.
///
/// Fails with [`ChordError::Midi`] when a chord's tempo does not fit a tempo
/// event.
pub fn write_midi(data: &PlaybackData, velocity: u8) -> Result<Vec<u8>, ChordError> {
    let markers: Vec<String> = data.chords.iter().map(|c| c.index.to_string()).collect();
    let velocity = u7::new(velocity.min(127));
    let channel = u4::new(CHANNEL);

    let mut timed: Vec<(u32, TrackEventKind)> = Vec::new();
    let mut last_bpm = None;
    for (chord, marker) in data.chords.iter().zip(&markers) {
        let start = beats_to_ticks(chord.start_beat);
        let end = beats_to_ticks(chord.start_beat + chord.beats);

        timed.push((start, TrackEventKind::Meta(MetaMessage::Marker(marker.as_bytes()))));
        if last_bpm != Some(chord.bpm) {
            timed.push((
                start,
                TrackEventKind::Meta(MetaMessage::Tempo(tempo_micros(chord.bpm)?)),
            ));
            last_bpm = Some(chord.bpm);
        }
        for &pitch in &chord.midi_notes {
            timed.push((
                start,
                TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOn { key: u7::new(pitch), vel: velocity },
                },
            ));
        }
        for &pitch in &chord.midi_notes {
            timed.push((
                end,
                TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOff { key: u7::new(pitch), vel: u7::new(0) },
                },
            ));
        }
    }

    let mut track: Track = Vec::with_capacity(timed.len() + 1);
    let mut last_tick = 0;
    for (tick, kind) in timed {
        track.push(TrackEvent {
            delta: u28::new(tick - last_tick),
            kind,
        });
        last_tick = tick;
    }
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));
    smf.tracks.push(track);

    let mut buf = Vec::new();
    smf.write(&mut buf)
        .map_err(|e| ChordError::Midi(format!("failed to encode MIDI: {}", e)))?;
    debug!(bytes = buf.len(), chords = data.chords.len(), "MIDI encoded");
    Ok(buf)
}

/// Decode SMF bytes back into note events with times in seconds.
///
/// Chord indices come from the marker events; a note-on with velocity 0 counts
/// as a note-off.
pub fn read_midi(bytes: &[u8]) -> Result<Vec<NoteEvent>, ChordError> {
    let smf = Smf::parse(bytes).map_err(|e| ChordError::Midi(format!("failed to parse MIDI: {}", e)))?;
    let ticks_per_quarter = match smf.header.timing {
        Timing::Metrical(tpq) => tpq.as_int() as f64,
        Timing::Timecode(..) => {
            return Err(ChordError::Midi("timecode-based files are not supported".to_string()))
        }
    };
    let track = smf
        .tracks
        .first()
        .ok_or_else(|| ChordError::Midi("file has no tracks".to_string()))?;

    let mut events = Vec::new();
    let mut micros_per_quarter = DEFAULT_TEMPO_MICROS as f64;
    let mut time = 0.0;
    let mut chord = 0;

    for event in track {
        time += event.delta.as_int() as f64 * micros_per_quarter / (ticks_per_quarter * 1_000_000.0);
        match event.kind {
            TrackEventKind::Meta(MetaMessage::Tempo(t)) => micros_per_quarter = t.as_int() as f64,
            TrackEventKind::Meta(MetaMessage::Marker(text)) => {
                if let Some(index) = std::str::from_utf8(text).ok().and_then(|s| s.trim().parse().ok()) {
                    chord = index;
                }
            }
            TrackEventKind::Midi { message, .. } => {
                let (kind, pitch) = match message {
                    MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => (NoteEventKind::On, key),
                    MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => (NoteEventKind::Off, key),
                    _ => continue,
                };
                events.push(NoteEvent {
                    time,
                    kind,
                    pitch: pitch.as_int(),
                    chord,
                });
            }
            _ => {}
        }
    }
    Ok(events)
}
