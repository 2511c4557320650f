//! # Pitch Mapper
//!
//! Converts a resolved chord into absolute pitch numbers (MIDI note numbers).
//!
//! ## Registers
//! Each voice is folded into a fixed 12-semitone band so voices never jump
//! octaves between chords:
//! - **Bass**: `29..41` (F2 up to E3)
//! - **Upper voices**: `53..65` (F4 up to E5)
//!
//! ## Upper voice degrees
//! A shape digit `d` counts diatonic steps above the bass, so the scale index
//! voiced is `(bass + d - 2) mod 7`. Shape `"135"` over bass 5 voices degrees
//! 5, 7 and 2.
//!
//! Pitches come out bass first, then in shape-string order. Upper voices are not
//! sorted or de-duplicated.

use serde::Serialize;

use crate::chord::ResolvedChord;
use crate::error::ChordError;
use crate::math::fit_range;
use crate::scale::{key_offset, ScaleTable};

/// Lowest pitch of the bass register.
pub const BASS_REGISTER: i32 = 29;
/// Lowest pitch of the upper-voice register.
pub const UPPER_REGISTER: i32 = 53;
/// Width of every register band.
pub const REGISTER_WIDTH: i32 = 12;

/// Pitches for one chord.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordPitches {
    pub bass: u8,
    pub upper: Vec<u8>,
}

impl ChordPitches {
    /// All pitches in emission order: bass, then upper voices in shape order.
    pub fn all(&self) -> Vec<u8> {
        let mut notes = Vec::with_capacity(self.upper.len() + 1);
        notes.push(self.bass);
        notes.extend_from_slice(&self.upper);
        notes
    }

    /// Note names for display, e.g. `["C3", "C5", "E5", "G4"]`.
    pub fn names(&self) -> Vec<String> {
        self.all().into_iter().map(pitch_name).collect()
    }
}

/// Map a resolved chord to pitches.
///
/// The chord is validated first; out-of-range degrees are rejected rather than
/// wrapped into a different note.
///
/// # Example
/// ```
/// use chordcraft::{map_pitches, ResolvedChord, Shape, Accidentals};
///
/// let chord = ResolvedChord {
///     bass: 1,
///     shape: Shape::new("135"),
///     accidentals: Accidentals::default(),
///     memo: String::new(),
///     key: 0,
///     bpm: 120,
///     beats: 2.0,
/// };
/// let pitches = map_pitches(&chord).unwrap();
/// assert_eq!(pitches.all(), vec![36, 60, 64, 55]); // C3 | C5 E5 G4
/// ```
pub fn map_pitches(chord: &ResolvedChord) -> Result<ChordPitches, ChordError> {
    chord.validate_degrees()?;

    let scale = ScaleTable::resolve(&chord.accidentals);
    let tonic = key_offset(chord.key);
    let bass = chord.bass as i32;

    let bass_pitch = fit_range(tonic + scale.step(chord.bass as usize - 1), BASS_REGISTER, REGISTER_WIDTH);

    let upper = chord
        .shape
        .degrees()
        .map(|d| {
            let index = fit_range(bass + d as i32 - 2, 0, 7) as usize;
            fit_range(tonic + scale.step(index), UPPER_REGISTER, REGISTER_WIDTH) as u8
        })
        .collect();

    Ok(ChordPitches {
        bass: bass_pitch as u8,
        upper,
    })
}

/// Name a pitch number with sharps and an octave suffix, e.g. 61 → `"C#5"`.
///
/// The octave is `pitch / 12`, one higher than scientific pitch notation
/// (middle C, 60, is `"C5"`). This matches the sampler naming used by playback.
pub fn pitch_name(pitch: u8) -> String {
    const NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
    format!("{}{}", NAMES[(pitch % 12) as usize], pitch / 12)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::{Accidentals, Shape};
    use pretty_assertions::assert_eq;

    fn resolved(key: i8, bass: u8, shape: &str, accd: &[i8]) -> ResolvedChord {
        ResolvedChord {
            bass,
            shape: Shape::new(shape),
            accidentals: Accidentals::new(accd.to_vec()),
            memo: String::new(),
            key,
            bpm: 120,
            beats: 2.0,
        }
    }

    #[test]
    fn test_c_major_triad() {
        let pitches = map_pitches(&resolved(0, 1, "135", &[])).unwrap();
        assert_eq!(pitches.bass, 36);
        assert_eq!(pitches.upper, vec![60, 64, 55]);

        let mut classes: Vec<u8> = pitches.all().iter().map(|p| p % 12).collect();
        classes.sort_unstable();
        classes.dedup();
        assert_eq!(classes, vec![0, 4, 7]);
    }

    #[test]
    fn test_shape_order_is_preserved() {
        let pitches = map_pitches(&resolved(0, 1, "531", &[])).unwrap();
        assert_eq!(pitches.upper, vec![55, 64, 60]);
    }

    #[test]
    fn test_dominant_seventh_in_g() {
        // Key G (1), bass 5 = D, shape 1357 = D F# A C
        let pitches = map_pitches(&resolved(1, 5, "1357", &[])).unwrap();
        assert_eq!(pitches.bass, 38); // D3
        assert_eq!(pitches.upper, vec![62, 54, 57, 60]); // D5 F#4 A4 C5
    }

    #[test]
    fn test_accidentals_alter_pitches() {
        // Minor tonic triad: lowered third
        let pitches = map_pitches(&resolved(0, 1, "135", &[-3])).unwrap();
        assert_eq!(pitches.upper, vec![60, 63, 55]);

        // Flattened leading tone in the bass folds down into the band
        let pitches = map_pitches(&resolved(0, 7, "135", &[-7])).unwrap();
        assert_eq!(pitches.bass, 34); // A#2
    }

    #[test]
    fn test_registers_hold_for_every_chord() {
        let cases: [Vec<i8>; 5] = [vec![], vec![1], vec![-1], vec![7], vec![-4, 5]];
        for key in -6..=5 {
            for bass in 1..=7 {
                for accd in &cases {
                    let pitches = map_pitches(&resolved(key, bass, "1234567", accd)).unwrap();
                    assert!((29..41).contains(&pitches.bass));
                    assert!(pitches.upper.iter().all(|p| (53..65).contains(p)));
                }
            }
        }
    }

    #[test]
    fn test_invalid_chord_is_rejected() {
        assert!(map_pitches(&resolved(0, 8, "135", &[])).is_err());
        assert!(map_pitches(&resolved(0, 1, "139", &[])).is_err());
        assert!(map_pitches(&resolved(0, 1, "133", &[])).is_err());
    }

    #[test]
    fn test_pitch_names() {
        assert_eq!(pitch_name(36), "C3");
        assert_eq!(pitch_name(61), "C#5");
        let pitches = map_pitches(&resolved(0, 1, "135", &[])).unwrap();
        assert_eq!(pitches.names(), vec!["C3", "C5", "E5", "G4"]);
    }
}
