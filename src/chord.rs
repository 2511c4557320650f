//! # Chord Data Model
//!
//! This module defines the chord types every other module consumes.
//!
//! ## Type Hierarchy
//! ```text
//! ChordSequence = Vec<Chord>          (what the user edits / the JSON file stores)
//!   └── Chord
//!         ├── bass: u8                 (scale degree 1-7 of the lowest note)
//!         ├── shape: Shape             (digit string, degrees above the bass)
//!         ├── accidentals: Accidentals (signed degrees, +n raises, -n lowers)
//!         ├── key_override: KeyOverride (Inherit | Value(i8), JSON sentinel 12)
//!         ├── bpm_override: BpmOverride (Inherit | Value(u16), JSON sentinel 0)
//!         ├── beats_override: Option<f64>
//!         └── memo: String
//!
//! ResolvedChord                        (output of the override propagator)
//!   └── same musical fields + concrete key / bpm / beats
//! ```
//!
//! ## Key Concepts
//!
//! ### Shape
//! The character order of a shape is the order the user typed it in and the
//! order pitches are emitted in. Only the *set* of degrees matters musically,
//! so `"135"` and `"153"` voice the same notes.
//!
//! ### Sentinels
//! The JSON format marks "no key change" with `key: 12` and "no tempo change"
//! with `bpm: 0` (or by leaving the field out). In Rust these are the explicit
//! `Inherit` variants; serialization writes the sentinels back so files stay
//! compatible.
//!
//! ### Validation
//! Chords load from JSON even when their digits are out of range. Every consumer
//! calls [`Chord::validate`] / [`ResolvedChord::validate`] first and rejects the
//! chord with [`ChordError::OutOfRange`] rather than wrapping the value.
//!
//! ## Related Modules
//! - `propagate` - turns `Chord`s into `ResolvedChord`s
//! - `pitch` - maps a `ResolvedChord` to pitch numbers
//! - `analysis` - derives display labels from a `ResolvedChord`

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ChordError;

/// JSON value meaning "keep the previous chord's key".
pub const KEY_INHERIT_SENTINEL: i64 = 12;

/// Per-chord key change, counted in fifths from C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyOverride {
    #[default]
    Inherit,
    Value(i8),
}

impl KeyOverride {
    pub fn is_inherit(&self) -> bool {
        matches!(self, KeyOverride::Inherit)
    }

    pub fn value(&self) -> Option<i8> {
        match self {
            KeyOverride::Inherit => None,
            KeyOverride::Value(key) => Some(*key),
        }
    }
}

impl Serialize for KeyOverride {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            KeyOverride::Inherit => serializer.serialize_i64(KEY_INHERIT_SENTINEL),
            KeyOverride::Value(key) => serializer.serialize_i8(*key),
        }
    }
}

impl<'de> Deserialize<'de> for KeyOverride {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<i64> = Option::deserialize(deserializer)?;
        match raw {
            None | Some(KEY_INHERIT_SENTINEL) => Ok(KeyOverride::Inherit),
            Some(key) => i8::try_from(key)
                .map(KeyOverride::Value)
                .map_err(|_| D::Error::custom(format!("key {} is not a circle-of-fifths offset", key))),
        }
    }
}

/// Per-chord tempo change in beats per minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BpmOverride {
    #[default]
    Inherit,
    Value(u16),
}

impl BpmOverride {
    pub fn is_inherit(&self) -> bool {
        matches!(self, BpmOverride::Inherit)
    }

    /// The tempo, if this is a real change. `Value(0)` counts as no change.
    pub fn value(&self) -> Option<u16> {
        match self {
            BpmOverride::Value(bpm) if *bpm > 0 => Some(*bpm),
            _ => None,
        }
    }
}

impl Serialize for BpmOverride {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BpmOverride::Inherit => serializer.serialize_u16(0),
            BpmOverride::Value(bpm) => serializer.serialize_u16(*bpm),
        }
    }
}

impl<'de> Deserialize<'de> for BpmOverride {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Number fields in the editor may produce fractional tempos
        let raw: Option<f64> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(BpmOverride::Inherit),
            Some(bpm) if bpm == 0.0 => Ok(BpmOverride::Inherit),
            Some(bpm) if bpm > 0.0 && bpm <= u16::MAX as f64 => {
                Ok(BpmOverride::Value(bpm.round().max(1.0) as u16))
            }
            Some(bpm) => Err(D::Error::custom(format!("bpm {} is not a positive tempo", bpm))),
        }
    }
}

/// Scale degrees voiced above the bass, as typed (e.g. `"135"`, `"1357"`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Shape(String);

impl Shape {
    pub fn new(digits: impl Into<String>) -> Self {
        Self(digits.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Degrees in entry order. Non-digit characters come out as 0 and fail validation.
    pub fn degrees(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.chars().map(|c| c.to_digit(10).map_or(0, |d| d as u8))
    }

    pub fn contains(&self, degree: u8) -> bool {
        self.degrees().any(|d| d == degree)
    }

    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn validate(&self) -> Result<(), ChordError> {
        let mut seen = [false; 8];
        for c in self.0.chars() {
            let degree = match c.to_digit(10) {
                Some(d @ 1..=7) => d as usize,
                _ => {
                    return Err(ChordError::OutOfRange(format!(
                        "shape \"{}\" contains '{}', expected degrees 1-7",
                        self.0, c
                    )))
                }
            };
            if seen[degree] {
                return Err(ChordError::OutOfRange(format!(
                    "shape \"{}\" repeats degree {}",
                    self.0, degree
                )));
            }
            seen[degree] = true;
        }
        Ok(())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Shape {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Chord-local accidental directives (`+n` raises degree n, `-n` lowers it).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Accidentals(Vec<i8>);

impl<'de> Deserialize<'de> for Accidentals {
    /// Directives beyond `i8` saturate; they still fail [`Accidentals::validate`].
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Vec<i64> = Vec::deserialize(deserializer)?;
        Ok(Self(
            raw.into_iter()
                .map(|a| a.clamp(i8::MIN as i64, i8::MAX as i64) as i8)
                .collect(),
        ))
    }
}

impl Accidentals {
    pub fn new(directives: impl Into<Vec<i8>>) -> Self {
        Self(directives.into())
    }

    pub fn as_slice(&self) -> &[i8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Semitone shift for a 1-based degree: +1, -1 or 0.
    ///
    /// Positive directives win if a (malformed) set holds both signs.
    pub fn shift(&self, degree: u8) -> i32 {
        let degree = degree as i8;
        if self.0.contains(&degree) {
            1
        } else if self.0.contains(&-degree) {
            -1
        } else {
            0
        }
    }

    /// Set the directive for one degree: `sign` > 0 raises, < 0 lowers, 0 clears.
    ///
    /// Any earlier directive for the same degree is replaced.
    pub fn set(&mut self, degree: u8, sign: i8) {
        let degree = degree as i8;
        self.0.retain(|a| a.abs() != degree);
        match sign.signum() {
            1 => self.0.push(degree),
            -1 => self.0.push(-degree),
            _ => {}
        }
    }

    pub fn validate(&self) -> Result<(), ChordError> {
        let mut seen = [false; 8];
        for &a in &self.0 {
            let magnitude = a.unsigned_abs() as usize;
            if !(1..=7).contains(&magnitude) {
                return Err(ChordError::OutOfRange(format!(
                    "accidental {} must name a degree between 1 and 7",
                    a
                )));
            }
            if seen[magnitude] {
                return Err(ChordError::OutOfRange(format!(
                    "degree {} has more than one accidental",
                    magnitude
                )));
            }
            seen[magnitude] = true;
        }
        Ok(())
    }

    /// Editor summary, e.g. `"4＃, 7♭"`: sorted numerically, then labelled.
    pub fn label(&self) -> String {
        let mut sorted = self.0.clone();
        sorted.sort_unstable();
        sorted
            .into_iter()
            .map(accidental_label)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Label a single accidental directive: `3` → `"3＃"`, `-7` → `"7♭"`.
pub fn accidental_label(n: i8) -> String {
    match n.signum() {
        1 => format!("{}＃", n),
        -1 => format!("{}♭", -(n as i16)),
        _ => n.to_string(),
    }
}

/// One slot of a chord sequence, exactly as stored in the song file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub memo: String,
    #[serde(rename = "bpm", default)]
    pub bpm_override: BpmOverride,
    #[serde(rename = "key", default)]
    pub key_override: KeyOverride,
    #[serde(deserialize_with = "saturating_degree")]
    pub bass: u8,
    pub shape: Shape,
    #[serde(rename = "accd", default, skip_serializing_if = "Accidentals::is_empty")]
    pub accidentals: Accidentals,
    #[serde(rename = "beats", default, skip_serializing_if = "Option::is_none")]
    pub beats_override: Option<f64>,
}

/// Read a degree number that may not fit `u8`. Out-of-range values saturate
/// to 0 or 255 so the chord loads and fails validation on its own.
fn saturating_degree<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.clamp(0, u8::MAX as i64) as u8)
}

/// An ordered chord list; position is the only identity a chord has.
pub type ChordSequence = Vec<Chord>;

impl Default for Chord {
    /// Root-position triad on degree 1, two beats, inheriting key and tempo.
    fn default() -> Self {
        Self {
            memo: String::new(),
            bpm_override: BpmOverride::Inherit,
            key_override: KeyOverride::Inherit,
            bass: 1,
            shape: Shape::new("135"),
            accidentals: Accidentals::default(),
            beats_override: Some(2.0),
        }
    }
}

impl Chord {
    /// A chord with the given bass and shape and everything else inherited.
    pub fn new(bass: u8, shape: &str) -> Self {
        Self {
            bass,
            shape: Shape::new(shape),
            beats_override: None,
            ..Self::default()
        }
    }

    pub fn with_key(mut self, key: i8) -> Self {
        self.key_override = KeyOverride::Value(key);
        self
    }

    pub fn with_bpm(mut self, bpm: u16) -> Self {
        self.bpm_override = BpmOverride::Value(bpm);
        self
    }

    pub fn with_beats(mut self, beats: f64) -> Self {
        self.beats_override = Some(beats);
        self
    }

    pub fn with_accidentals(mut self, directives: &[i8]) -> Self {
        self.accidentals = Accidentals::new(directives.to_vec());
        self
    }

    pub fn with_memo(mut self, memo: &str) -> Self {
        self.memo = memo.to_string();
        self
    }

    /// Check the degree invariants: bass, shape and accidentals all within 1-7.
    pub fn validate_degrees(&self) -> Result<(), ChordError> {
        validate_degrees(self.bass, &self.shape, &self.accidentals)
    }

    /// Degree invariants plus a non-negative beat count.
    pub fn validate(&self) -> Result<(), ChordError> {
        self.validate_degrees()?;
        if let Some(beats) = self.beats_override {
            validate_beats(beats)?;
        }
        Ok(())
    }
}

/// A chord with key, tempo and length made explicit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedChord {
    pub bass: u8,
    pub shape: Shape,
    pub accidentals: Accidentals,
    pub memo: String,
    pub key: i8,
    pub bpm: u16,
    pub beats: f64,
}

impl ResolvedChord {
    /// Bass, shape and accidentals within 1-7. Enough for pitch mapping and analysis.
    pub fn validate_degrees(&self) -> Result<(), ChordError> {
        validate_degrees(self.bass, &self.shape, &self.accidentals)
    }

    /// Everything playback needs: valid degrees, a finite length and a nonzero tempo.
    pub fn validate(&self) -> Result<(), ChordError> {
        self.validate_degrees()?;
        validate_beats(self.beats)?;
        if self.bpm == 0 {
            return Err(ChordError::OutOfRange("bpm must be greater than 0".to_string()));
        }
        Ok(())
    }

    /// Sounding length in seconds: `beats * 60 / bpm`.
    pub fn duration_secs(&self) -> f64 {
        self.beats * 60.0 / self.bpm as f64
    }
}

fn validate_degrees(bass: u8, shape: &Shape, accidentals: &Accidentals) -> Result<(), ChordError> {
    if !(1..=7).contains(&bass) {
        return Err(ChordError::OutOfRange(format!(
            "bass must be between 1 and 7, got {}",
            bass
        )));
    }
    shape.validate()?;
    accidentals.validate()
}

fn validate_beats(beats: f64) -> Result<(), ChordError> {
    if !beats.is_finite() || beats < 0.0 {
        return Err(ChordError::OutOfRange(format!(
            "beats must be a non-negative number, got {}",
            beats
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_key_override_sentinel_round_trip() {
        let inherit: KeyOverride = serde_json::from_str("12").unwrap();
        assert_eq!(inherit, KeyOverride::Inherit);
        let null: KeyOverride = serde_json::from_str("null").unwrap();
        assert_eq!(null, KeyOverride::Inherit);
        let flat_key: KeyOverride = serde_json::from_str("-3").unwrap();
        assert_eq!(flat_key, KeyOverride::Value(-3));
        // C is a real key change, not "inherit"
        let c: KeyOverride = serde_json::from_str("0").unwrap();
        assert_eq!(c, KeyOverride::Value(0));

        assert_eq!(serde_json::to_string(&KeyOverride::Inherit).unwrap(), "12");
        assert_eq!(serde_json::to_string(&KeyOverride::Value(5)).unwrap(), "5");
    }

    #[test]
    fn test_bpm_override_sentinel_round_trip() {
        let zero: BpmOverride = serde_json::from_str("0").unwrap();
        assert_eq!(zero, BpmOverride::Inherit);
        let fast: BpmOverride = serde_json::from_str("180").unwrap();
        assert_eq!(fast, BpmOverride::Value(180));
        assert!(serde_json::from_str::<BpmOverride>("-20").is_err());
        assert_eq!(serde_json::to_string(&BpmOverride::Inherit).unwrap(), "0");
    }

    #[test]
    fn test_chord_json_field_names() {
        let chord: Chord =
            serde_json::from_str(r#"{"bass":5,"shape":"1357","accd":[-7],"key":2,"bpm":120,"beats":4,"memo":"V7"}"#)
                .unwrap();
        assert_eq!(chord.bass, 5);
        assert_eq!(chord.shape.as_str(), "1357");
        assert_eq!(chord.accidentals.as_slice(), &[-7]);
        assert_eq!(chord.key_override, KeyOverride::Value(2));
        assert_eq!(chord.bpm_override, BpmOverride::Value(120));
        assert_eq!(chord.beats_override, Some(4.0));
        assert_eq!(chord.memo, "V7");
    }

    #[test]
    fn test_chord_missing_optional_fields() {
        let chord: Chord = serde_json::from_str(r#"{"bass":1,"shape":"135"}"#).unwrap();
        assert_eq!(chord.key_override, KeyOverride::Inherit);
        assert_eq!(chord.bpm_override, BpmOverride::Inherit);
        assert!(chord.accidentals.is_empty());
        assert_eq!(chord.beats_override, None);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(Chord::new(1, "135").validate().is_ok());
        assert!(Chord::new(0, "135").validate().is_err());
        assert!(Chord::new(8, "135").validate().is_err());
        assert!(Chord::new(1, "138").validate().is_err());
        assert!(Chord::new(1, "103").validate().is_err());
        assert!(Chord::new(1, "1x5").validate().is_err());
        assert!(Chord::new(1, "1355").validate().is_err());
        assert!(Chord::new(1, "135").with_accidentals(&[8]).validate().is_err());
        assert!(Chord::new(1, "135").with_accidentals(&[3, -3]).validate().is_err());
        assert!(Chord::new(1, "135").with_accidentals(&[0]).validate().is_err());
        assert!(Chord::new(1, "135").with_beats(-1.0).validate().is_err());
    }

    #[test]
    fn test_wide_degrees_load_then_fail_validation() {
        let chord: Chord = serde_json::from_str(r#"{"bass":-1,"shape":"135"}"#).unwrap();
        assert_eq!(chord.bass, 0);
        assert!(matches!(chord.validate(), Err(ChordError::OutOfRange(_))));

        let chord: Chord = serde_json::from_str(r#"{"bass":1,"shape":"135","accd":[300,-400,4]}"#).unwrap();
        assert_eq!(chord.accidentals.as_slice(), &[127, -128, 4]);
        assert!(matches!(chord.validate(), Err(ChordError::OutOfRange(_))));
    }

    #[test]
    fn test_accidental_set_replaces_directive() {
        let mut accd = Accidentals::new(vec![4, -7]);
        accd.set(4, -1);
        assert_eq!(accd.shift(4), -1);
        accd.set(7, 0);
        assert_eq!(accd.shift(7), 0);
        assert_eq!(accd.as_slice(), &[-4]);
    }

    #[test]
    fn test_accidental_labels() {
        assert_eq!(accidental_label(3), "3＃");
        assert_eq!(accidental_label(-7), "7♭");
        assert_eq!(Accidentals::new(vec![4, -7, -3]).label(), "7♭, 3♭, 4＃");
    }

    #[test]
    fn test_duration_secs() {
        let resolved = ResolvedChord {
            bass: 1,
            shape: Shape::new("135"),
            accidentals: Accidentals::default(),
            memo: String::new(),
            key: 0,
            bpm: 160,
            beats: 2.0,
        };
        assert_eq!(resolved.duration_secs(), 0.75);
    }
}
