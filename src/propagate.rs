//! # Override Propagator
//!
//! Resolves sparse per-chord overrides into a fully specified sequence.
//!
//! A key or tempo change stays in force until the next chord that changes it;
//! the change applies to the chord that carries it, not the one after. A chord's
//! length is its own `beats` when set (and nonzero), otherwise the session default.
//! Lengths do not carry forward.
//!
//! ## Example
//! ```rust
//! use chordcraft::{resolve_sequence, Chord, SessionDefaults};
//!
//! let chords = vec![
//!     Chord::new(1, "135"),
//!     Chord::new(4, "135").with_key(-3),
//!     Chord::new(5, "135"),
//! ];
//! let resolved = resolve_sequence(&chords, &SessionDefaults::default());
//!
//! assert_eq!(resolved[0].key, 0);
//! assert_eq!(resolved[1].key, -3);
//! assert_eq!(resolved[2].key, -3); // inherited
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chord::{Chord, ResolvedChord};

/// Session-wide starting values the propagator falls back on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionDefaults {
    pub initial_key: i8,
    pub initial_bpm: u16,
    pub default_beats: f64,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            initial_key: 0,
            initial_bpm: 160,
            default_beats: 2.0,
        }
    }
}

/// Resolve every chord's key, tempo and length in one left-to-right pass.
///
/// Pure: the same chords and defaults always produce the same output. Chords are
/// not validated here; out-of-range degrees are reported per chord by the mapper
/// and analyzer so one bad slot cannot affect its neighbours.
pub fn resolve_sequence(chords: &[Chord], defaults: &SessionDefaults) -> Vec<ResolvedChord> {
    let mut current_key = defaults.initial_key;
    let mut current_bpm = defaults.initial_bpm;

    let resolved: Vec<ResolvedChord> = chords
        .iter()
        .map(|chord| {
            if let Some(key) = chord.key_override.value() {
                current_key = key;
            }
            if let Some(bpm) = chord.bpm_override.value() {
                current_bpm = bpm;
            }
            let beats = match chord.beats_override {
                Some(beats) if beats != 0.0 => beats,
                _ => defaults.default_beats,
            };
            ResolvedChord {
                bass: chord.bass,
                shape: chord.shape.clone(),
                accidentals: chord.accidentals.clone(),
                memo: chord.memo.clone(),
                key: current_key,
                bpm: current_bpm,
                beats,
            }
        })
        .collect();

    debug!(chords = resolved.len(), "resolved chord sequence");
    resolved
}
