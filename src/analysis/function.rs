//! Main-function classification
//!
//! Scores each shape degree by the intervals it forms with the rest of the
//! shape and reports the strongest degrees as the chord's function.

use std::fmt;

use serde::Serialize;

use crate::chord::{ResolvedChord, Shape};
use crate::error::ChordError;

/// The degrees that dominate a chord's sound, renumbered to absolute scale degrees.
///
/// Displayed as `"1"`, `"1,5"` or `"2/4"` (primary degrees, then the runner-up
/// degrees after a slash when there are any).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MainFunction {
    pub primary: Vec<u8>,
    pub secondary: Vec<u8>,
}

impl fmt::Display for MainFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join_degrees(&self.primary))?;
        if !self.secondary.is_empty() {
            write!(f, "/{}", join_degrees(&self.secondary))?;
        }
        Ok(())
    }
}

fn join_degrees(degrees: &[u8]) -> String {
    degrees.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(",")
}

/// Weight of every shape degree, in shape order.
///
/// Per degree `n` (relative to the bass):
/// - `+2` when `n` is the bass itself (degree 1)
/// - `+2` when the third above, `(n+1) % 7 + 1`, is also voiced
/// - `+3` when the fifth above, `(n+3) % 7 + 1`, is also voiced
/// - `+1` when the seventh above, `(n+5) % 7 + 1`, is also voiced
pub fn degree_weights(shape: &Shape) -> Vec<(u8, i32)> {
    shape
        .degrees()
        .map(|n| {
            let mut points = 0;
            if n == 1 {
                points += 2;
            }
            if shape.contains((n + 1) % 7 + 1) {
                points += 2;
            }
            if shape.contains((n + 3) % 7 + 1) {
                points += 3;
            }
            if shape.contains((n + 5) % 7 + 1) {
                points += 1;
            }
            (n, points)
        })
        .collect()
}

/// Classify a chord's main function.
///
/// # Example
/// ```
/// use chordcraft::analysis::main_function;
/// use chordcraft::{resolve_sequence, Chord, SessionDefaults};
///
/// let chord = &resolve_sequence(&[Chord::new(5, "1357")], &SessionDefaults::default())[0];
/// assert_eq!(main_function(chord).unwrap().to_string(), "5");
/// ```
pub fn main_function(chord: &ResolvedChord) -> Result<MainFunction, ChordError> {
    chord.validate_degrees()?;

    let weights = degree_weights(&chord.shape);
    let max = weights.iter().map(|(_, p)| *p).max().unwrap_or(0);
    let absolute = |n: u8| (n + chord.bass - 2) % 7 + 1;

    let pick = |target: i32| -> Vec<u8> {
        weights
            .iter()
            .filter(|(_, p)| *p == target)
            .map(|(n, _)| absolute(*n))
            .collect()
    };

    Ok(MainFunction {
        primary: pick(max),
        secondary: pick(max - 1),
    })
}
