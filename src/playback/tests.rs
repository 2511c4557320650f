use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use super::*;
use crate::chord::{Chord, ResolvedChord};
use crate::error::ChordError;
use crate::propagate::{resolve_sequence, SessionDefaults};

const C_MAJOR: [u8; 4] = [36, 60, 64, 55];

fn resolve(chords: &[Chord]) -> Vec<ResolvedChord> {
    resolve_sequence(chords, &SessionDefaults::default())
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

async fn connect(backend: &RecordingBackend) -> Sequencer {
    Sequencer::connect(backend, DEFAULT_RELEASE_TAIL).await.unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_play_single_chord_timing() {
    let backend = RecordingBackend::new();
    let sequencer = connect(&backend).await;
    let chords = resolve(&[Chord::new(1, "135")]);

    let outcome = sequencer.play(&chords, 0).await.unwrap();

    assert_eq!(outcome, PlaybackOutcome::Completed);
    assert_eq!(
        backend.calls(),
        vec![
            RecordedCall {
                at: ms(0),
                call: BackendCall::Play { pitches: C_MAJOR.to_vec(), sustain: ms(850) },
            },
            RecordedCall {
                at: ms(750),
                call: BackendCall::Release { pitches: C_MAJOR.to_vec() },
            },
        ]
    );
    assert_eq!(sequencer.state(), PlaybackState::Idle);
    assert_eq!(sequencer.control().now_playing(), None);
}

#[tokio::test(start_paused = true)]
async fn test_tempo_changes_chord_length() {
    let backend = RecordingBackend::new();
    let sequencer = connect(&backend).await;
    let chords = resolve(&[
        Chord::new(1, "135").with_bpm(120),
        Chord::new(4, "135").with_beats(1.0),
        Chord::new(5, "135").with_bpm(60),
    ]);

    sequencer.play(&chords, 0).await.unwrap();

    let release_times: Vec<Duration> = backend
        .calls()
        .into_iter()
        .filter(|c| matches!(c.call, BackendCall::Release { .. }))
        .map(|c| c.at)
        .collect();
    // 2 beats at 120, 1 beat at 120, 2 beats at 60
    assert_eq!(release_times, vec![ms(1000), ms(1500), ms(3500)]);
}

#[tokio::test(start_paused = true)]
async fn test_play_start_index() {
    let chords = resolve(&[Chord::new(1, "135"), Chord::new(4, "135"), Chord::new(5, "135")]);

    let backend = RecordingBackend::new();
    connect(&backend).await.play(&chords, 2).await.unwrap();
    let plays = backend
        .calls()
        .iter()
        .filter(|c| matches!(c.call, BackendCall::Play { .. }))
        .count();
    assert_eq!(plays, 1);

    // Negative start clamps to the first chord
    let backend = RecordingBackend::new();
    connect(&backend).await.play(&chords, -4).await.unwrap();
    let plays = backend
        .calls()
        .iter()
        .filter(|c| matches!(c.call, BackendCall::Play { .. }))
        .count();
    assert_eq!(plays, 3);

    // Past the end: nothing to play
    let backend = RecordingBackend::new();
    let outcome = connect(&backend).await.play(&chords, 10).await.unwrap();
    assert_eq!(outcome, PlaybackOutcome::Completed);
    assert!(backend.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_stop_mid_playback() {
    let backend = RecordingBackend::new();
    let sequencer = connect(&backend).await;
    let chords = resolve(&[Chord::new(1, "135"), Chord::new(4, "135"), Chord::new(5, "135")]);

    let task = {
        let sequencer = sequencer.clone();
        let chords = chords.clone();
        tokio::spawn(async move { sequencer.play(&chords, 0).await })
    };

    tokio::time::sleep(ms(1000)).await;
    assert_eq!(sequencer.state(), PlaybackState::Playing);
    assert_eq!(sequencer.control().now_playing(), Some(1));

    sequencer.stop().await.unwrap();
    assert_eq!(sequencer.state(), PlaybackState::Idle);

    let outcome = task.await.unwrap().unwrap();
    assert_eq!(outcome, PlaybackOutcome::Stopped { at: 2 });

    let calls = backend.calls();
    assert!(calls.contains(&RecordedCall { at: ms(1000), call: BackendCall::AllNotesOff }));
    // The third chord never starts
    let last_play = calls
        .iter()
        .filter(|c| matches!(c.call, BackendCall::Play { .. }))
        .map(|c| c.at)
        .max();
    assert_eq!(last_play, Some(ms(750)));
}

#[tokio::test(start_paused = true)]
async fn test_stopped_session_stays_silent_after_replay() {
    let backend = RecordingBackend::new();
    let sequencer = connect(&backend).await;
    let chords = resolve(&[Chord::new(1, "135"), Chord::new(4, "135"), Chord::new(5, "135")]);

    let first = {
        let sequencer = sequencer.clone();
        let chords = chords.clone();
        tokio::spawn(async move { sequencer.play(&chords, 0).await })
    };
    tokio::time::sleep(ms(300)).await;
    sequencer.stop().await.unwrap();

    let second = {
        let sequencer = sequencer.clone();
        let chords = chords.clone();
        tokio::spawn(async move { sequencer.play(&chords, 0).await })
    };

    // The first session wakes at 750 ms, after the second has started
    tokio::time::sleep(ms(700)).await;
    assert_eq!(first.await.unwrap().unwrap(), PlaybackOutcome::Stopped { at: 1 });
    assert_eq!(sequencer.state(), PlaybackState::Playing);
    assert_eq!(sequencer.control().now_playing(), Some(0));

    assert_eq!(second.await.unwrap().unwrap(), PlaybackOutcome::Completed);
    assert_eq!(sequencer.state(), PlaybackState::Idle);

    let calls = backend.calls();
    let plays: Vec<Duration> = calls
        .iter()
        .filter(|c| matches!(c.call, BackendCall::Play { .. }))
        .map(|c| c.at)
        .collect();
    assert_eq!(plays, vec![ms(0), ms(300), ms(1050), ms(1800)]);
    let releases: Vec<Duration> = calls
        .iter()
        .filter(|c| matches!(c.call, BackendCall::Release { .. }))
        .map(|c| c.at)
        .collect();
    assert_eq!(releases, vec![ms(1050), ms(1800), ms(2550)]);
}

#[tokio::test(start_paused = true)]
async fn test_play_while_playing_is_rejected() {
    let backend = RecordingBackend::new();
    let sequencer = connect(&backend).await;
    let chords = resolve(&[Chord::new(1, "135"), Chord::new(5, "135")]);

    let task = {
        let sequencer = sequencer.clone();
        let chords = chords.clone();
        tokio::spawn(async move { sequencer.play(&chords, 0).await })
    };
    tokio::time::sleep(ms(100)).await;

    let second = sequencer.play(&chords, 0).await;
    assert!(matches!(second, Err(ChordError::Playback(_))));

    assert_eq!(task.await.unwrap().unwrap(), PlaybackOutcome::Completed);
}

#[tokio::test]
async fn test_backend_unavailable() {
    let backend = RecordingBackend::unavailable();
    let result = Sequencer::connect(&backend, DEFAULT_RELEASE_TAIL).await;
    assert!(matches!(result, Err(ChordError::BackendUnavailable(_))));
}

#[tokio::test(start_paused = true)]
async fn test_backend_failure_aborts_with_all_notes_off() {
    let backend = RecordingBackend::failing_on_play(1);
    let sequencer = connect(&backend).await;
    let chords = resolve(&[Chord::new(1, "135"), Chord::new(5, "135"), Chord::new(1, "135")]);

    let result = sequencer.play(&chords, 0).await;

    assert!(matches!(result, Err(ChordError::Playback(_))));
    let calls = backend.calls();
    assert_eq!(calls.last(), Some(&RecordedCall { at: ms(750), call: BackendCall::AllNotesOff }));
    assert_eq!(sequencer.state(), PlaybackState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_chord_aborts_playback() {
    let backend = RecordingBackend::new();
    let sequencer = connect(&backend).await;
    let chords = resolve(&[Chord::new(1, "135"), Chord::new(1, "1395")]);

    match sequencer.play(&chords, 0).await {
        Err(ChordError::InvalidChord { chord, .. }) => assert_eq!(chord, 2),
        other => panic!("expected InvalidChord, got {:?}", other),
    }
    assert_eq!(backend.calls().last().map(|c| c.call.clone()), Some(BackendCall::AllNotesOff));
}

#[tokio::test(start_paused = true)]
async fn test_preview_plays_one_chord() {
    let backend = RecordingBackend::new();
    let sequencer = connect(&backend).await;
    sequencer.stop().await.unwrap();

    let chord = &resolve(&[Chord::new(1, "135").with_beats(4.0)])[0];
    sequencer.preview(chord).await.unwrap();

    let calls = backend.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[2], RecordedCall { at: ms(1500), call: BackendCall::Release { pitches: C_MAJOR.to_vec() } });
    assert!(sequencer.control().is_cancelled());
}

#[derive(Clone, Default)]
struct ReleaseLog {
    releases: Arc<Mutex<Vec<Vec<u8>>>>,
}

#[async_trait]
impl PlayerBackend for ReleaseLog {
    async fn prepare(&self) -> Result<Arc<dyn PlayerHandle>, ChordError> {
        Ok(Arc::new(self.clone()))
    }
}

#[async_trait]
impl PlayerHandle for ReleaseLog {
    async fn play(&self, _pitches: &[u8], _sustain: Duration) -> Result<(), ChordError> {
        Ok(())
    }

    async fn release(&self, pitches: &[u8]) -> Result<(), ChordError> {
        self.releases.lock().unwrap().push(pitches.to_vec());
        Ok(())
    }
}

#[tokio::test]
async fn test_default_all_notes_off_covers_every_pitch() {
    let backend = ReleaseLog::default();
    let sequencer = Sequencer::connect(&backend, DEFAULT_RELEASE_TAIL).await.unwrap();
    sequencer.stop().await.unwrap();

    let releases = backend.releases.lock().unwrap();
    assert_eq!(releases.len(), 1);
    assert_eq!(releases[0], (0..=127).collect::<Vec<u8>>());
}

#[test]
fn test_export_layout() {
    let chords = resolve(&[
        Chord::new(1, "135"),
        Chord::new(4, "135").with_bpm(120).with_beats(3.0),
        Chord::new(5, "1").with_beats(1.0),
    ]);
    let data = export(&chords).unwrap();

    let starts: Vec<f64> = data.chords.iter().map(|c| c.start_time).collect();
    assert_eq!(starts, vec![0.0, 0.75, 2.25]);
    let beats: Vec<f64> = data.chords.iter().map(|c| c.start_beat).collect();
    assert_eq!(beats, vec![0.0, 2.0, 5.0]);
    assert_eq!(data.total_beats, 6.0);
    assert_eq!(data.total_duration, 2.75);
    assert_eq!(data.chords[1].bpm, 120);
    assert_eq!(data.chords[2].midi_notes, vec![31, 55]);
}

#[test]
fn test_export_offs_precede_next_ons() {
    let chords = resolve(&[Chord::new(1, "135"), Chord::new(1, "135")]);
    let data = export(&chords).unwrap();

    let at_boundary: Vec<NoteEventKind> = data
        .events
        .iter()
        .filter(|e| e.time == 0.75)
        .map(|e| e.kind)
        .collect();
    let mut expected = vec![NoteEventKind::Off; 4];
    expected.extend([NoteEventKind::On; 4]);
    assert_eq!(at_boundary, expected);
}

#[test]
fn test_export_rejects_invalid_chord() {
    let chords = resolve(&[Chord::new(1, "135"), Chord::new(1, "135").with_accidentals(&[9])]);
    match export(&chords) {
        Err(ChordError::InvalidChord { chord, .. }) => assert_eq!(chord, 2),
        other => panic!("expected InvalidChord, got {:?}", other),
    }
}

#[test]
fn test_midi_round_trip_with_tempo_change() {
    let chords = resolve(&[
        Chord::new(1, "135"),
        Chord::new(5, "1357").with_bpm(120),
        Chord::new(1, "135").with_bpm(160).with_beats(1.0),
        Chord::new(4, "135"),
    ]);
    let data = export(&chords).unwrap();
    let bytes = write_midi(&data, 100).unwrap();

    let smf = midly::Smf::parse(&bytes).unwrap();
    assert_eq!(smf.header.format, midly::Format::SingleTrack);
    assert_eq!(smf.header.timing, midly::Timing::Metrical(midly::num::u15::new(480)));
    let tempos: Vec<u32> = smf.tracks[0]
        .iter()
        .filter_map(|e| match e.kind {
            midly::TrackEventKind::Meta(midly::MetaMessage::Tempo(t)) => Some(t.as_int()),
            _ => None,
        })
        .collect();
    assert_eq!(tempos, vec![375_000, 500_000, 375_000]);

    assert_eq!(read_midi(&bytes).unwrap(), data.events);
}

#[test]
fn test_midi_velocity_and_ticks() {
    let chords = resolve(&[Chord::new(1, "1")]);
    let bytes = write_midi(&export(&chords).unwrap(), 200).unwrap();
    let smf = midly::Smf::parse(&bytes).unwrap();

    let notes: Vec<(u32, u8)> = smf.tracks[0]
        .iter()
        .filter_map(|e| match e.kind {
            midly::TrackEventKind::Midi { message: midly::MidiMessage::NoteOn { vel, .. }, .. } => {
                Some((e.delta.as_int(), vel.as_int()))
            }
            midly::TrackEventKind::Midi { message: midly::MidiMessage::NoteOff { .. }, .. } => {
                Some((e.delta.as_int(), 0))
            }
            _ => None,
        })
        .collect();
    // Velocity clamps to 127; the first note-off lands two quarters later
    assert_eq!(notes, vec![(0, 127), (0, 127), (960, 0), (0, 0)]);
}

#[test]
fn test_midi_rejects_tempo_too_slow() {
    let data = export(&resolve(&[Chord::new(1, "135").with_bpm(3)])).unwrap();
    assert!(matches!(write_midi(&data, 100), Err(ChordError::Midi(_))));

    let data = export(&resolve(&[Chord::new(1, "135").with_bpm(4)])).unwrap();
    let events = read_midi(&write_midi(&data, 100).unwrap()).unwrap();
    assert_eq!(events.last().map(|e| e.time), Some(30.0));
}

#[test]
fn test_midi_tempo_is_exact_to_the_microsecond() {
    let data = export(&resolve(&[Chord::new(1, "135").with_bpm(70), Chord::new(5, "135")])).unwrap();
    let decoded = read_midi(&write_midi(&data, 100).unwrap()).unwrap();

    assert_eq!(decoded.len(), data.events.len());
    for (got, want) in decoded.iter().zip(&data.events) {
        assert_eq!((got.kind, got.pitch, got.chord), (want.kind, want.pitch, want.chord));
        assert!((got.time - want.time).abs() < 1e-5, "{} vs {}", got.time, want.time);
    }
}

#[test]
fn test_read_midi_rejects_garbage() {
    assert!(matches!(read_midi(b"not a midi file"), Err(ChordError::Midi(_))));
}
