//! Offline rendering of a resolved sequence into timestamped events.

use tracing::debug;

use crate::chord::ResolvedChord;
use crate::error::ChordError;
use crate::pitch::map_pitches;

use super::types::{NoteEvent, NoteEventKind, PlaybackChord, PlaybackData};

/// Lay a resolved sequence out in time.
///
/// Each chord's notes turn on at its start and off at its end, and the next
/// chord starts exactly where the previous one ends, so a chord's note-offs
/// always precede the next chord's note-ons. The first invalid chord aborts
/// the export.
///
/// # Example
/// ```
/// use chordcraft::playback::{export, NoteEventKind};
/// use chordcraft::{resolve_sequence, Chord, SessionDefaults};
///
/// let chords = resolve_sequence(&[Chord::new(1, "135")], &SessionDefaults::default());
/// let data = export(&chords).unwrap();
///
/// assert_eq!(data.total_duration, 0.75);
/// assert_eq!(data.events.len(), 8);
/// assert_eq!(data.events[0].kind, NoteEventKind::On);
/// assert_eq!(data.events[7].time, 0.75);
/// ```
pub fn export(chords: &[ResolvedChord]) -> Result<PlaybackData, ChordError> {
    let mut placed = Vec::with_capacity(chords.len());
    let mut events = Vec::new();
    let mut time = 0.0;
    let mut beat = 0.0;

    for (index, chord) in chords.iter().enumerate() {
        chord.validate().map_err(|e| e.at_chord(index + 1))?;
        let midi_notes = map_pitches(chord).map_err(|e| e.at_chord(index + 1))?.all();
        let duration = chord.duration_secs();

        events.extend(midi_notes.iter().map(|&pitch| NoteEvent {
            time,
            kind: NoteEventKind::On,
            pitch,
            chord: index,
        }));
        events.extend(midi_notes.iter().map(|&pitch| NoteEvent {
            time: time + duration,
            kind: NoteEventKind::Off,
            pitch,
            chord: index,
        }));

        placed.push(PlaybackChord {
            index,
            midi_notes,
            start_time: time,
            duration,
            start_beat: beat,
            beats: chord.beats,
            bpm: chord.bpm,
        });
        time += duration;
        beat += chord.beats;
    }

    debug!(chords = placed.len(), events = events.len(), secs = time, "sequence exported");
    Ok(PlaybackData {
        chords: placed,
        events,
        total_duration: time,
        total_beats: beat,
    })
}
