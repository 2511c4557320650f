//! Chord wheel diagrams and their video frame timeline.
//!
//! Two concentric circles describe a chord:
//! - the **fifths circle** (12 positions) shows where the chord's seven scale
//!   tones sit, `[0, 2, 4, -1, 1, 3, 5]` shifted by the key and by ±7 for each
//!   accidental;
//! - the **thirds circle** (7 positions) shows the bass and every shape tone,
//!   stepping back three places per degree from `2 * key`.
//!
//! Shape tones carry the same weights the main-function analysis uses; the
//! weight sets how opaque a tone is drawn.

use serde::Serialize;

use crate::analysis::degree_weights;
use crate::chord::ResolvedChord;
use crate::error::ChordError;
use crate::math::fit_range;

/// Scale tones on the fifths circle for key 0, degree order.
pub const WHEEL_SCALE: [i32; 7] = [0, 2, 4, -1, 1, 3, 5];

/// Positions on the fifths circle.
pub const FIFTHS_SLOTS: i32 = 12;
/// Positions on the thirds circle.
pub const THIRDS_SLOTS: i32 = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WheelTone {
    /// Shape digit (relative to the bass).
    pub degree: u8,
    /// Unwrapped position on the thirds circle.
    pub position: i32,
    pub weight: i32,
    /// `(weight + 4) / 12`, from 1/3 for an isolated tone up to 1.
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordWheel {
    /// Unwrapped fifths-circle position of each scale degree (index 0 = degree 1).
    pub scale: [i32; 7],
    pub bass_position: i32,
    pub tones: Vec<WheelTone>,
}

/// Wheel data for one chord.
pub fn chord_wheel(chord: &ResolvedChord) -> Result<ChordWheel, ChordError> {
    chord.validate_degrees()?;

    let key = chord.key as i32;
    let mut scale = [0; 7];
    for (i, slot) in scale.iter_mut().enumerate() {
        *slot = WHEEL_SCALE[i] + key + 7 * chord.accidentals.shift(i as u8 + 1);
    }

    let root = 2 * key;
    let bass = chord.bass as i32;
    let tones = degree_weights(&chord.shape)
        .into_iter()
        .map(|(degree, weight)| WheelTone {
            degree,
            position: root - 3 * (bass - 1 + degree as i32 - 1),
            weight,
            opacity: (weight + 4) as f64 / 12.0,
        })
        .collect();

    Ok(ChordWheel {
        scale,
        bass_position: root - 3 * (bass - 1),
        tones,
    })
}

/// Fraction of a turn for a fifths-circle position.
pub fn fifths_fraction(position: i32) -> f64 {
    fit_range(position, 0, FIFTHS_SLOTS) as f64 / FIFTHS_SLOTS as f64
}

/// Fraction of a turn for a thirds-circle position.
pub fn thirds_fraction(position: i32) -> f64 {
    fit_range(position, 0, THIRDS_SLOTS) as f64 / THIRDS_SLOTS as f64
}

/// Point on a circle of `radius` around `center`, `fraction` of a turn
/// clockwise from twelve o'clock (screen coordinates, y down).
pub fn wheel_point(center: (f64, f64), radius: f64, fraction: f64) -> (f64, f64) {
    let angle = std::f64::consts::TAU * fraction;
    (center.0 + radius * angle.sin(), center.1 - radius * angle.cos())
}

/// Frames each chord occupies in a video at `fps`.
///
/// Frame counts are taken from the running total so rounding never drifts:
/// chord `i` gets `floor(end_i * fps) - frames_so_far`.
///
/// # Example
/// ```
/// use chordcraft::wheel::frame_counts;
/// use chordcraft::{resolve_sequence, Chord, SessionDefaults};
///
/// let chords = resolve_sequence(&[Chord::new(1, "135"), Chord::new(5, "135")], &SessionDefaults::default());
/// // 0.75 s each at 30 fps: 22.5 frames, so 22 then 23
/// assert_eq!(frame_counts(&chords, 30), vec![22, 23]);
/// ```
pub fn frame_counts(chords: &[ResolvedChord], fps: u32) -> Vec<u64> {
    let mut seconds = 0.0;
    let mut frames = 0u64;
    chords
        .iter()
        .map(|chord| {
            seconds += chord.duration_secs();
            let count = ((seconds * fps as f64).floor() as u64).saturating_sub(frames);
            frames += count;
            count
        })
        .collect()
}
