//! # Diatonic Scale Resolver
//!
//! Turns a chord's key and accidental set into a concrete seven-step semitone
//! table. Accidentals are chord-local: two neighbouring chords in the same key
//! may resolve to different scales.
//!
//! ## Reference
//! ```text
//! degree        1  2  3  4  5  6  7
//! base offset   0  2  4  5  7  9  11
//! ```
//! A `+n` accidental adds one semitone to degree `n`, `-n` removes one.
//!
//! The tonic's pitch class comes from the key: `key * 7` semitones (one perfect
//! fifth per step on the circle), folded into a single octave.

use crate::chord::Accidentals;
use crate::math::fit_range;

/// Semitone offsets of the major scale from its tonic.
pub const BASE_SCALE: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

/// A chord-local diatonic scale, in semitones above the tonic.
///
/// Entries can fall outside `0..12` (e.g. a flattened tonic is `-1`); the pitch
/// mapper folds them into registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleTable([i32; 7]);

impl ScaleTable {
    pub fn resolve(accidentals: &Accidentals) -> Self {
        let mut steps = BASE_SCALE;
        for (i, step) in steps.iter_mut().enumerate() {
            *step += accidentals.shift(i as u8 + 1);
        }
        Self(steps)
    }

    /// Semitone offset of a 0-based scale index.
    pub fn step(&self, index: usize) -> i32 {
        self.0[index % 7]
    }

    pub fn steps(&self) -> &[i32; 7] {
        &self.0
    }
}

/// Pitch class of the tonic for a circle-of-fifths key value.
///
/// # Examples
/// ```
/// use chordcraft::scale::key_offset;
///
/// assert_eq!(key_offset(0), 0);  // C
/// assert_eq!(key_offset(1), 7);  // G
/// assert_eq!(key_offset(-1), 5); // F
/// assert_eq!(key_offset(-3), 3); // E♭
/// ```
pub fn key_offset(key: i8) -> i32 {
    fit_range(key as i32 * 7, 0, 12)
}
