//! Enharmonic spelling of chord tones.
//!
//! Every degree gets a *location* on the circle of fifths, counted from F:
//! its diatonic position, plus the key, plus or minus 7 for an accidental.
//! The letter is the location modulo 7; each full lap of 7 above the natural
//! letters adds a sharp, each lap below adds a flat.

use crate::chord::{Accidentals, ResolvedChord};
use crate::error::ChordError;
use crate::math::fit_range;

use super::level::CIRCLE_POSITIONS;

/// Letter names in circle-of-fifths order, starting at F.
pub const FIFTHS_NAMES: [&str; 7] = ["F", "C", "G", "D", "A", "E", "B"];

/// Circle-of-fifths location of each degree (index 0 = degree 1) in a key.
pub fn degree_locations(key: i8, accidentals: &Accidentals) -> [i32; 7] {
    let mut locations = [0; 7];
    for (i, location) in locations.iter_mut().enumerate() {
        *location = CIRCLE_POSITIONS[i] + key as i32 + 7 * accidentals.shift(i as u8 + 1);
    }
    locations
}

/// Name a circle-of-fifths location.
///
/// Pairs of sharps collapse into `×` (so 3 sharps read `×#`); flats never collapse.
///
/// # Examples
/// ```
/// use chordcraft::analysis::spell_location;
///
/// assert_eq!(spell_location(1), "C");
/// assert_eq!(spell_location(7), "F#");
/// assert_eq!(spell_location(14), "F×");
/// assert_eq!(spell_location(-1), "Bb");
/// assert_eq!(spell_location(-9), "Ebb");
/// ```
pub fn spell_location(location: i32) -> String {
    let letter = FIFTHS_NAMES[fit_range(location, 0, 7) as usize];
    let laps = location.div_euclid(7);
    let suffix = if location > 0 {
        "#".repeat(laps as usize).replace("##", "×")
    } else if location < 0 {
        "b".repeat((-laps) as usize)
    } else {
        String::new()
    };
    format!("{}{}", letter, suffix)
}

/// Spell the shape's tones (not the bass) in shape order.
pub fn spell_chord(chord: &ResolvedChord) -> Result<Vec<String>, ChordError> {
    chord.validate_degrees()?;

    let locations = degree_locations(chord.key, &chord.accidentals);
    Ok(chord
        .shape
        .degrees()
        .map(|n| {
            let absolute = (n + chord.bass - 1) as usize;
            spell_location(locations[(absolute - 1) % 7])
        })
        .collect())
}

/// Spell the bass tone.
pub fn spell_bass(chord: &ResolvedChord) -> Result<String, ChordError> {
    chord.validate_degrees()?;
    let locations = degree_locations(chord.key, &chord.accidentals);
    Ok(spell_location(locations[chord.bass as usize - 1]))
}
