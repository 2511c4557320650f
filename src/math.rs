//! Modular arithmetic helpers shared by the scale resolver, pitch mapper and analyzer.

/// Fold `n` into the half-open window `[min, min + width)`.
///
/// Returns the unique `v` with `v ≡ n (mod width)` and `min <= v < min + width`.
/// Negative inputs use true modulo, not truncating remainder.
///
/// Used to wrap keys into the 12-semitone circle, scale indices into the seven
/// degrees, and pitches into their fixed register bands.
///
/// # Examples
/// ```
/// use chordcraft::fit_range;
///
/// assert_eq!(fit_range(14, 0, 12), 2);
/// assert_eq!(fit_range(-1, 0, 7), 6);
/// assert_eq!(fit_range(0, 29, 12), 36); // C folded into the bass band
/// ```
///
/// `width` must be positive.
pub fn fit_range(n: i32, min: i32, width: i32) -> i32 {
    debug_assert!(width > 0, "fit_range width must be positive");
    (n - min).rem_euclid(width) + min
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_range_stays_in_window() {
        for n in -100..100 {
            for (min, width) in [(0, 12), (0, 7), (29, 12), (53, 12), (-5, 12)] {
                let v = fit_range(n, min, width);
                assert!(v >= min && v < min + width, "fit_range({n}, {min}, {width}) = {v}");
                assert_eq!((v - n).rem_euclid(width), 0);
            }
        }
    }

    #[test]
    fn test_fit_range_is_periodic() {
        for n in -50..50 {
            assert_eq!(fit_range(n, 0, 12), fit_range(n + 12, 0, 12));
            assert_eq!(fit_range(n, 0, 7), fit_range(n + 7, 0, 7));
        }
    }

    #[test]
    fn test_fit_range_negative_input() {
        // Truncating remainder would give -1 here
        assert_eq!(fit_range(-1, 0, 12), 11);
        assert_eq!(fit_range(-7, 0, 7), 0);
        assert_eq!(fit_range(-42, 0, 12), 6);
        assert_eq!(fit_range(-12, 29, 12), 36);
    }
}
