//! Scale-level metric: how far a chord's accidentals pull it from a diatonic scale.
//!
//! The seven degrees sit on the circle of fifths at positions
//! `[1, 3, 5, 0, 2, 4, 6]` (F is 0, B is 6). A raised degree moves 7 places up
//! the circle, a lowered one 7 places down. An unaltered (or modally rotated)
//! scale spans exactly 6 fifths; anything wider is ranked by its span.

use std::fmt;

use serde::Serialize;

use crate::chord::Accidentals;
use crate::error::ChordError;

/// Circle-of-fifths position of each degree in a major scale, F = 0.
pub const CIRCLE_POSITIONS: [i32; 7] = [1, 3, 5, 0, 2, 4, 6];

/// Rank symbols for spans 7, 8, … 13, then repeating with a tier number.
pub const LEVEL_MARKS: [&str; 7] = ["α", "β", "γ", "δ", "ε", "ζ", "η"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ScaleLevel {
    /// The accidentals (if any) still form seven consecutive fifths.
    Diatonic,
    /// `rank` indexes [`LEVEL_MARKS`]; `tier` starts at 1 and grows every 7 fifths.
    Remote { span: i32, rank: usize, tier: i32 },
}

impl ScaleLevel {
    fn from_span(span: i32) -> Self {
        if span == 6 {
            return ScaleLevel::Diatonic;
        }
        let extra = (span - 7).div_euclid(7);
        ScaleLevel::Remote {
            span,
            rank: span.rem_euclid(7) as usize,
            tier: if extra > 0 { extra + 1 } else { 1 },
        }
    }
}

impl fmt::Display for ScaleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleLevel::Diatonic => f.write_str("-"),
            ScaleLevel::Remote { rank, tier, .. } => {
                f.write_str(LEVEL_MARKS[*rank])?;
                if *tier > 1 {
                    write!(f, "{}", tier)?;
                }
                Ok(())
            }
        }
    }
}

/// Rank a chord's accidental set.
///
/// # Examples
/// ```
/// use chordcraft::analysis::scale_level;
/// use chordcraft::Accidentals;
///
/// assert_eq!(scale_level(&Accidentals::default()).unwrap().to_string(), "-");
/// // Melodic minor: lowered third
/// assert_eq!(scale_level(&Accidentals::new(vec![-3])).unwrap().to_string(), "β");
/// ```
pub fn scale_level(accidentals: &Accidentals) -> Result<ScaleLevel, ChordError> {
    accidentals.validate()?;

    let circle: Vec<i32> = CIRCLE_POSITIONS
        .iter()
        .enumerate()
        .map(|(i, &pos)| pos + 7 * accidentals.shift(i as u8 + 1))
        .collect();
    let max = circle.iter().copied().max().unwrap_or(0);
    let min = circle.iter().copied().min().unwrap_or(0);

    Ok(ScaleLevel::from_span(max - min))
}
