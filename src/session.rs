//! # Editing Session
//!
//! The state behind the chord editor: session-wide key, tempo and default
//! length, display colors, the chord list and which chord is sounding.
//!
//! ## Editing
//! Chords are addressed by position only. New chords are the default triad
//! with the session's default length.
//!
//! ## Rendering
//! [`Session::render()`] resolves the sequence and produces pitches and
//! labels for every chord. Each slot is its own `Result`, so one out-of-range
//! chord never hides the others.
//!
//! ## Files
//! [`Session::to_json()`] writes the first chord's tempo and key explicitly
//! when it inherits them, so the file carries the session's starting values.
//! [`Session::load_json()`] reads them back from the first chord; a file that
//! fails to parse leaves the session untouched.
//!
//! ## Example
//! ```rust
//! use chordcraft::session::Session;
//!
//! let mut session = Session::default();
//! session.append();
//! session.append();
//!
//! let rendered = session.render();
//! assert_eq!(rendered.len(), 2);
//! assert_eq!(rendered[0].as_ref().unwrap().pitches.all(), vec![36, 60, 64, 55]);
//! ```

use serde::Serialize;
use tracing::info;

use crate::analysis::{analyze_sequence, ChordLabels};
use crate::chord::{BpmOverride, Chord, KeyOverride, ResolvedChord};
use crate::config::SessionConfig;
use crate::document::{write_document, SongDocument};
use crate::error::ChordError;
use crate::keys::key_label;
use crate::pitch::{map_pitches, ChordPitches};
use crate::playback::PlaybackControl;
use crate::propagate::{resolve_sequence, SessionDefaults};

/// Everything the editor shows for one chord.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedChord {
    pub index: usize,
    pub resolved: ResolvedChord,
    pub key_label: &'static str,
    pub pitches: ChordPitches,
    pub pitch_names: Vec<String>,
    pub labels: ChordLabels,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub defaults: SessionDefaults,
    pub bgcolor: String,
    pub color: String,
    chords: Vec<Chord>,
    now_playing: Option<usize>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}

impl Session {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            defaults: config.defaults,
            bgcolor: config.bgcolor.clone(),
            color: config.color.clone(),
            chords: Vec::new(),
            now_playing: None,
        }
    }

    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    /// The chord a fresh slot starts with.
    pub fn new_chord(&self) -> Chord {
        Chord {
            beats_override: Some(self.defaults.default_beats),
            ..Chord::default()
        }
    }

    /// Insert a new chord so it lands at `index` (`index == len` appends).
    pub fn insert_before(&mut self, index: usize) -> Result<(), ChordError> {
        if index > self.chords.len() {
            return Err(self.index_error(index));
        }
        let chord = self.new_chord();
        self.chords.insert(index, chord);
        Ok(())
    }

    pub fn append(&mut self) {
        let chord = self.new_chord();
        self.chords.push(chord);
    }

    pub fn remove(&mut self, index: usize) -> Result<Chord, ChordError> {
        if index >= self.chords.len() {
            return Err(self.index_error(index));
        }
        Ok(self.chords.remove(index))
    }

    /// Swap in `chord` at `index`, returning the chord it replaced.
    pub fn replace(&mut self, index: usize, chord: Chord) -> Result<Chord, ChordError> {
        match self.chords.get_mut(index) {
            Some(slot) => Ok(std::mem::replace(slot, chord)),
            None => Err(self.index_error(index)),
        }
    }

    fn index_error(&self, index: usize) -> ChordError {
        ChordError::OutOfRange(format!(
            "chord index {} is outside a sequence of {}",
            index,
            self.chords.len()
        ))
    }

    pub fn now_playing(&self) -> Option<usize> {
        self.now_playing
    }

    /// Highlight the chord being played; `None` clears the highlight.
    pub fn set_now_playing(&mut self, index: Option<usize>) {
        self.now_playing = index.filter(|i| *i < self.chords.len());
    }

    /// Follow the chord a sequencer is sounding. Returns true when the
    /// highlight moved.
    pub fn sync_now_playing(&mut self, control: &PlaybackControl) -> bool {
        let before = self.now_playing;
        self.set_now_playing(control.now_playing());
        self.now_playing != before
    }

    pub fn resolved(&self) -> Vec<ResolvedChord> {
        resolve_sequence(&self.chords, &self.defaults)
    }

    pub fn render(&self) -> Vec<Result<RenderedChord, ChordError>> {
        let resolved = self.resolved();
        let labels = analyze_sequence(&resolved);

        resolved
            .into_iter()
            .zip(labels)
            .enumerate()
            .map(|(index, (chord, labels))| -> Result<RenderedChord, ChordError> {
                let labels = labels?;
                let pitches = map_pitches(&chord).map_err(|e| e.at_chord(index + 1))?;
                Ok(RenderedChord {
                    index,
                    key_label: key_label(chord.key),
                    pitch_names: pitches.names(),
                    pitches,
                    labels,
                    resolved: chord,
                })
            })
            .collect()
    }

    pub fn to_json(&self) -> Result<String, ChordError> {
        let mut chords = self.chords.clone();
        if let Some(first) = chords.first_mut() {
            if first.bpm_override.value().is_none() {
                first.bpm_override = BpmOverride::Value(self.defaults.initial_bpm);
            }
            if first.key_override.is_inherit() {
                first.key_override = KeyOverride::Value(self.defaults.initial_key);
            }
        }
        write_document(self.defaults.default_beats, &self.bgcolor, &self.color, &chords)
    }

    /// Replace the session's contents with a song file.
    pub fn load_json(&mut self, content: &str) -> Result<(), ChordError> {
        let doc = SongDocument::from_json(content)?;

        if let Some(beats) = doc.default_beats {
            self.defaults.default_beats = beats;
        }
        if let Some(bgcolor) = doc.bgcolor {
            self.bgcolor = bgcolor;
        }
        if let Some(color) = doc.color {
            self.color = color;
        }
        if let Some(first) = doc.chords.first() {
            if let Some(bpm) = first.bpm_override.value() {
                self.defaults.initial_bpm = bpm;
            }
            if let Some(key) = first.key_override.value() {
                self.defaults.initial_key = key;
            }
        }

        info!(chords = doc.chords.len(), "song loaded");
        self.chords = doc.chords;
        self.now_playing = None;
        Ok(())
    }
}
