//! Shape presets and re-voicing over a different bass.
//!
//! Presets are written from the root (`"135"` is a root-position triad). To put
//! a different chord tone in the bass, every digit is renumbered relative to the
//! new bass degree and the digits are sorted, so `"135"` with its third in the
//! bass becomes `"136"`.

use crate::chord::Shape;
use crate::error::ChordError;

/// Preset groups offered by the shape picker.
pub const SHAPE_PRESETS: [(&str, &[&str]); 4] = [
    ("triads", &["135", "137", "157", "123", "125"]),
    ("sevenths", &["1357", "1235", "1345", "1457", "1567"]),
    ("ninths", &["12357", "13457", "12345"]),
    ("others", &["1", "13", "15", "17", "123457", "1234567"]),
];

/// Re-express `shape` relative to a bass on its degree `bass`.
///
/// Each digit `n` becomes `(n - (bass - 1) + 6) % 7 + 1`; the result is sorted.
///
/// # Examples
/// ```
/// use chordcraft::shapes::convert_shape;
/// use chordcraft::Shape;
///
/// assert_eq!(convert_shape(&Shape::new("135"), 1).unwrap().as_str(), "135");
/// assert_eq!(convert_shape(&Shape::new("135"), 3).unwrap().as_str(), "136");
/// assert_eq!(convert_shape(&Shape::new("135"), 5).unwrap().as_str(), "146");
/// ```
pub fn convert_shape(shape: &Shape, bass: u8) -> Result<Shape, ChordError> {
    shape.validate()?;
    if !(1..=7).contains(&bass) {
        return Err(ChordError::OutOfRange(format!(
            "bass must be between 1 and 7, got {}",
            bass
        )));
    }

    let mut digits: Vec<u8> = shape.degrees().map(|n| (n + 7 - bass) % 7 + 1).collect();
    digits.sort_unstable();
    Ok(Shape::new(digits.iter().map(|d| d.to_string()).collect::<String>()))
}

/// Every voicing of a preset: one per chord tone placed in the bass.
///
/// The full seven-note cluster is only offered over degree 1, since every
/// rotation of it is the same set.
pub fn voicings(preset: &str) -> Result<Vec<(u8, Shape)>, ChordError> {
    let shape = Shape::new(preset);
    shape.validate()?;
    if shape.len() == 7 {
        return Ok(vec![(1, shape)]);
    }

    (1..=7u8)
        .filter(|b| shape.contains(*b))
        .map(|b| convert_shape(&shape, b).map(|s| (b, s)))
        .collect()
}
