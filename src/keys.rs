//! Key names for circle-of-fifths key values.
//!
//! Keys are stored as signed fifths counts from C. The selectable set covers each
//! pitch class once, using flat names for the black keys.

use crate::math::fit_range;

/// The twelve keys offered by the editor, in chromatic order.
pub const KEY_OPTIONS: [(&str, i8); 12] = [
    ("C", 0),
    ("D♭", -5),
    ("D", 2),
    ("E♭", -3),
    ("E", 4),
    ("F", -1),
    ("G♭", -6),
    ("G", 1),
    ("A♭", -4),
    ("A", 3),
    ("B♭", -2),
    ("B", 5),
];

/// Display name for a key value.
///
/// Values outside the selectable range are folded onto the matching pitch class,
/// so `7` (C#) is shown as `"D♭"`.
///
/// # Examples
/// ```
/// use chordcraft::keys::key_label;
///
/// assert_eq!(key_label(0), "C");
/// assert_eq!(key_label(-3), "E♭");
/// assert_eq!(key_label(7), "D♭");
/// ```
pub fn key_label(key: i8) -> &'static str {
    let folded = fit_range(key as i32, -6, 12) as i8;
    KEY_OPTIONS
        .iter()
        .find(|(_, value)| *value == folded)
        .map(|(label, _)| *label)
        .unwrap_or("?")
}

/// Parse a key from a label (`"Eb"`, `"E♭"`, `"F#"`) or a fifths count (`"-3"`).
pub fn parse_key(s: &str) -> Option<i8> {
    let trimmed = s.trim();
    if let Ok(n) = trimmed.parse::<i8>() {
        return Some(n);
    }

    let mut chars = trimmed.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    // Natural letters on the circle of fifths, F = -1 .. B = 5
    let natural: i8 = match letter {
        'F' => -1,
        'C' => 0,
        'G' => 1,
        'D' => 2,
        'A' => 3,
        'E' => 4,
        'B' => 5,
        _ => return None,
    };
    let accidental: i8 = match chars.as_str() {
        "" => 0,
        "#" | "♯" | "＃" => 7,
        "b" | "♭" => -7,
        _ => return None,
    };
    Some(natural + accidental)
}
