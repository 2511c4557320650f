//! # Harmonic Analyzer
//!
//! Derives the display labels shown next to each chord.
//!
//! ## Sub-modules
//! - `function` - main-function classification (`"1"`, `"5/2"`)
//! - `level` - distance of the accidental set from a diatonic scale (`"-"`, `"γ"`, `"ζ2"`)
//! - `spelling` - enharmonic note names of the shape tones (`"B♭, D, F, A♭"`)
//! - `motion` - bass movement from the previous chord in fifths (`"↑1"`, `"↓3"`)
//!
//! ## Entry Points
//! - [`analyze()`] - labels for one chord, given its predecessor
//! - [`analyze_sequence()`] - labels for a whole resolved sequence, one `Result` per chord
//!
//! ## Failure isolation
//! Every analyzer validates its chord first. In [`analyze_sequence()`] an invalid
//! chord yields an error for its own slot only; the chord after it simply gets no
//! motion label.
//!
//! ## Example
//! ```rust
//! use chordcraft::analysis::analyze_sequence;
//! use chordcraft::{resolve_sequence, Chord, SessionDefaults};
//!
//! let chords = vec![Chord::new(1, "135"), Chord::new(5, "1357").with_key(-3)];
//! let resolved = resolve_sequence(&chords, &SessionDefaults::default());
//! let labels = analyze_sequence(&resolved);
//!
//! let second = labels[1].as_ref().unwrap();
//! assert_eq!(second.main_function, "5");
//! assert_eq!(second.spelling, "Bb, D, F, Ab");
//! ```

mod function;
mod level;
mod motion;
mod spelling;

pub use function::{degree_weights, main_function, MainFunction};
pub use level::{scale_level, ScaleLevel, CIRCLE_POSITIONS, LEVEL_MARKS};
pub use motion::{chord_motion, Motion, LARGE_MOTION};
pub use spelling::{degree_locations, spell_bass, spell_chord, spell_location, FIFTHS_NAMES};

use serde::Serialize;
use tracing::warn;

use crate::chord::ResolvedChord;
use crate::error::ChordError;

/// Everything the editor displays about one chord.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordLabels {
    pub main_function: String,
    pub scale_level: String,
    pub spelling: String,
    pub accidentals: String,
    /// Absent for the first chord, or when the previous chord is invalid.
    pub motion: Option<Motion>,
}

/// Labels for `chord`, with motion measured from `prev` when given.
pub fn analyze(chord: &ResolvedChord, prev: Option<&ResolvedChord>) -> Result<ChordLabels, ChordError> {
    let main = main_function(chord)?;
    let level = scale_level(&chord.accidentals)?;
    let spelling = spell_chord(chord)?.join(", ");
    let motion = prev.and_then(|p| chord_motion(p, chord).ok());

    Ok(ChordLabels {
        main_function: main.to_string(),
        scale_level: level.to_string(),
        spelling,
        accidentals: chord.accidentals.label(),
        motion,
    })
}

/// Labels for every chord in a resolved sequence.
///
/// Errors are tagged with the chord's 1-indexed position.
pub fn analyze_sequence(chords: &[ResolvedChord]) -> Vec<Result<ChordLabels, ChordError>> {
    chords
        .iter()
        .enumerate()
        .map(|(i, chord)| {
            let prev = i.checked_sub(1).map(|p| &chords[p]);
            analyze(chord, prev).map_err(|e| {
                warn!(chord = i + 1, error = %e, "chord rejected by analyzer");
                e.at_chord(i + 1)
            })
        })
        .collect()
}
