//! Song file format.
//!
//! ```json
//! {
//!   "default_beats": 2,
//!   "bgcolor": "#ffffff",
//!   "color": "#88ccee",
//!   "chords": [
//!     { "bpm": 160, "key": 0, "bass": 1, "shape": "135", "beats": 2 }
//!   ]
//! }
//! ```
//!
//! Only `chords` is required when reading. Chords whose degrees are out of
//! range still load; they are rejected later, one slot at a time.

use serde::{Deserialize, Serialize};

use crate::chord::Chord;
use crate::error::ChordError;

/// A parsed song file. Top-level fields the file left out are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct SongDocument {
    pub default_beats: Option<f64>,
    pub bgcolor: Option<String>,
    pub color: Option<String>,
    pub chords: Vec<Chord>,
}

#[derive(Deserialize)]
struct RawDocument {
    default_beats: Option<f64>,
    bgcolor: Option<String>,
    color: Option<String>,
    chords: Option<Vec<Chord>>,
}

#[derive(Serialize)]
struct DocumentOut<'a> {
    default_beats: f64,
    bgcolor: &'a str,
    color: &'a str,
    chords: &'a [Chord],
}

impl SongDocument {
    pub fn from_json(content: &str) -> Result<Self, ChordError> {
        let raw: RawDocument =
            serde_json::from_str(content).map_err(|e| ChordError::MalformedInput(e.to_string()))?;
        let chords = raw
            .chords
            .ok_or_else(|| ChordError::MalformedInput("missing `chords` array".to_string()))?;

        if let Some(beats) = raw.default_beats {
            if !beats.is_finite() || beats < 0.0 {
                return Err(ChordError::MalformedInput(format!(
                    "default_beats must not be negative, got {}",
                    beats
                )));
            }
        }

        Ok(Self {
            default_beats: raw.default_beats,
            bgcolor: raw.bgcolor,
            color: raw.color,
            chords,
        })
    }
}

/// Serialize a complete song file, indented by two spaces.
pub fn write_document(default_beats: f64, bgcolor: &str, color: &str, chords: &[Chord]) -> Result<String, ChordError> {
    let out = DocumentOut {
        default_beats,
        bgcolor,
        color,
        chords,
    };
    serde_json::to_string_pretty(&out).map_err(|e| ChordError::MalformedInput(e.to_string()))
}
