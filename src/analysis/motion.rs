//! Inter-chord motion metric.
//!
//! Measures how far the bass moves between two consecutive chords, counted in
//! fifths on the circle: the difference between the bass tones' spelling
//! locations (key change and accidentals included), folded into `-5..=6`.
//! Positive motion is sharpward ("up", e.g. I → V), negative is flatward
//! ("down", e.g. V → I). A tritone is always reported as `Up(6)`.
//!
//! This is a display hint only; nothing else in the pipeline reads it.

use std::fmt;

use serde::Serialize;

use crate::chord::ResolvedChord;
use crate::error::ChordError;
use crate::math::fit_range;

use super::spelling::degree_locations;

/// Magnitudes at or above this count as a large move for highlighting.
pub const LARGE_MOTION: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "direction", content = "fifths", rename_all = "lowercase")]
pub enum Motion {
    None,
    Up(u8),
    Down(u8),
}

impl Motion {
    /// Build from a signed fifths count.
    pub fn from_fifths(fifths: i32) -> Self {
        match fifths.signum() {
            1 => Motion::Up(fifths as u8),
            -1 => Motion::Down((-fifths) as u8),
            _ => Motion::None,
        }
    }

    pub fn fifths(&self) -> i32 {
        match self {
            Motion::None => 0,
            Motion::Up(n) => *n as i32,
            Motion::Down(n) => -(*n as i32),
        }
    }

    pub fn magnitude(&self) -> u8 {
        self.fifths().unsigned_abs() as u8
    }

    pub fn is_large(&self) -> bool {
        self.magnitude() >= LARGE_MOTION
    }
}

impl fmt::Display for Motion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Motion::None => f.write_str("-"),
            Motion::Up(n) => write!(f, "↑{}", n),
            Motion::Down(n) => write!(f, "↓{}", n),
        }
    }
}

fn bass_location(chord: &ResolvedChord) -> i32 {
    degree_locations(chord.key, &chord.accidentals)[chord.bass as usize - 1]
}

/// Bass motion from `prev` to `current`.
///
/// # Example
/// ```
/// use chordcraft::analysis::{chord_motion, Motion};
/// use chordcraft::{resolve_sequence, Chord, SessionDefaults};
///
/// let chords = resolve_sequence(&[Chord::new(5, "1357"), Chord::new(1, "135")], &SessionDefaults::default());
/// assert_eq!(chord_motion(&chords[0], &chords[1]).unwrap(), Motion::Down(1));
/// ```
pub fn chord_motion(prev: &ResolvedChord, current: &ResolvedChord) -> Result<Motion, ChordError> {
    prev.validate_degrees()?;
    current.validate_degrees()?;

    let fifths = fit_range(bass_location(current) - bass_location(prev), -5, 12);
    Ok(Motion::from_fifths(fifths))
}
