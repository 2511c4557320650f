//! # Error Types
//!
//! This module defines all error types for the chordcraft engine.
//!
//! Errors raised while checking or mapping a single chord carry enough context
//! (the offending field, and the chord's position when known) to point the user
//! at the slot that needs fixing.
//!
//! ## Error Types
//! - `MalformedInput` - A song file that is not JSON or lacks the `chords` array
//! - `OutOfRange` - A bass/shape/accidental/tempo value outside its legal range
//! - `InvalidChord` - An `OutOfRange` problem tagged with the chord's position
//! - `BackendUnavailable` - No audio/MIDI sink could be prepared
//! - `Playback` - The sink failed while a sequence was sounding
//! - `ConfigError` - Invalid YAML session configuration
//! - `Midi` - Standard MIDI File encode/decode failure
//! - `Io` - File system errors
//!
//! ## Usage
//! ```rust
//! use chordcraft::{Chord, ChordError};
//!
//! let chord = Chord::new(9, "135");
//! match chord.validate() {
//!     Ok(()) => println!("valid"),
//!     Err(ChordError::OutOfRange(message)) => eprintln!("rejected: {}", message),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChordError {
    /// The song file could not be understood.
    ///
    /// # Example
    /// ```
    /// # use chordcraft::ChordError;
    /// let err = ChordError::MalformedInput("missing `chords` array".to_string());
    /// assert_eq!(err.to_string(), "Malformed input: missing `chords` array");
    /// ```
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A chord field is outside its legal range.
    ///
    /// Raised by [`Chord::validate`](crate::Chord::validate) and by every
    /// consumer of chords (pitch mapper, analyzer, sequencer) instead of
    /// silently wrapping the value.
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// An out-of-range chord, with its 1-indexed position in the sequence.
    ///
    /// # Example
    /// ```
    /// # use chordcraft::ChordError;
    /// let err = ChordError::InvalidChord {
    ///     chord: 3,
    ///     message: "bass must be between 1 and 7, got 0".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Invalid chord at position 3: bass must be between 1 and 7, got 0");
    /// ```
    #[error("Invalid chord at position {chord}: {message}")]
    InvalidChord { chord: usize, message: String },

    #[error("Playback backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Playback failed: {0}")]
    Playback(String),

    #[error("Invalid config: {0}")]
    ConfigError(String),

    #[error("MIDI error: {0}")]
    Midi(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChordError {
    /// Tag a chord-level error with the chord's 1-indexed position.
    ///
    /// Errors that are not about a single chord pass through unchanged.
    pub fn at_chord(self, chord: usize) -> Self {
        match self {
            ChordError::OutOfRange(message) => ChordError::InvalidChord { chord, message },
            other => other,
        }
    }
}
