//! Playback and export type definitions
//!
//! Times in this module are in seconds from the first played chord unless a
//! field name says beats.

use serde::Serialize;

/// What the sequencer is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Idle,
    Playing,
}

/// How a call to `Sequencer::play` ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum PlaybackOutcome {
    /// Every chord from the start index was played.
    Completed,
    /// Cancelled by `stop()`. `at` is the index of the first chord not played.
    Stopped { at: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteEventKind {
    On,
    Off,
}

/// A single timestamped note-on or note-off.
///
/// `chord` is the 0-based index of the chord the note belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteEvent {
    pub time: f64,
    pub kind: NoteEventKind,
    pub pitch: u8,
    pub chord: usize,
}

/// One chord of an export, with its pitches and placement.
///
/// # Fields
/// - `index`: 0-based position in the resolved sequence
/// - `midi_notes`: bass first, then the shape tones in entry order
/// - `start_time` / `duration`: seconds
/// - `start_beat` / `beats`: position and length in beats (tempo independent)
/// - `bpm`: tempo in force for this chord
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackChord {
    pub index: usize,
    pub midi_notes: Vec<u8>,
    pub start_time: f64,
    pub duration: f64,
    pub start_beat: f64,
    pub beats: f64,
    pub bpm: u16,
}

/// Complete export of a sequence: chord placements plus the flat event list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackData {
    pub chords: Vec<PlaybackChord>,
    pub events: Vec<NoteEvent>,
    pub total_duration: f64,
    pub total_beats: f64,
}
