//! # Playback Module
//!
//! Turns a resolved chord sequence into sound or into a MIDI file.
//!
//! ## Purpose
//! 1. **Real-time playback** - a [`Sequencer`] drives a [`PlayerBackend`] chord by chord,
//!    waiting `beats * 60 / bpm` seconds between them
//! 2. **Export** - [`export()`] lays the same sequence out as timestamped note events,
//!    and [`write_midi()`] encodes those as a Standard MIDI File
//!
//! ## Sub-modules
//! - `types` - PlaybackState, PlaybackOutcome, NoteEvent, PlaybackChord, PlaybackData
//! - `backend` - the backend contract plus `RecordingBackend` and `LoggingBackend`
//! - `engine` - the sequencer and its shared `PlaybackControl`
//! - `export` - deterministic event layout
//! - `smf` - MIDI file encoding and decoding
//!
//! ## States
//! ```text
//! Idle ──play──▶ Playing ──last chord──▶ Idle   (Completed)
//!                   │
//!                   └──stop──▶ Idle              (Stopped { at })
//! ```
//! `stop()` sets the cancellation flag and silences all 128 pitches at once;
//! the playing task notices the flag before its next chord.
//!
//! ## Example
//! ```rust
//! use chordcraft::playback::{export, read_midi, write_midi};
//! use chordcraft::{resolve_sequence, Chord, SessionDefaults};
//!
//! let chords = vec![Chord::new(1, "135"), Chord::new(5, "1357"), Chord::new(1, "135")];
//! let resolved = resolve_sequence(&chords, &SessionDefaults::default());
//!
//! let data = export(&resolved).unwrap();
//! assert_eq!(data.chords.len(), 3);
//! assert_eq!(data.chords[2].start_time, 1.5);
//!
//! let bytes = write_midi(&data, 127).unwrap();
//! assert_eq!(read_midi(&bytes).unwrap(), data.events);
//! ```
//!
//! ## Related Modules
//! - `propagate` - produces the `ResolvedChord`s played here
//! - `pitch` - maps each chord to pitch numbers

mod backend;
mod engine;
mod export;
mod smf;
mod types;

#[cfg(test)]
mod tests;

pub use backend::{BackendCall, LoggingBackend, PlayerBackend, PlayerHandle, RecordedCall, RecordingBackend};
pub use engine::{PlaybackControl, Sequencer, DEFAULT_RELEASE_TAIL};
pub use export::export;
pub use smf::{read_midi, write_midi, TICKS_PER_QUARTER};
pub use types::{NoteEvent, NoteEventKind, PlaybackChord, PlaybackData, PlaybackOutcome, PlaybackState};
