//! Pointer angle → segment index.
//!
//! The wheel is split into `n` equal segments. Segment 0 spans `[0, 360/n)`
//! and segments increase counter-clockwise (mathematical angle convention,
//! the same one the presentation layer draws with). The pointer sits at
//! `pointer_offset` degrees; the default 90 puts it at the top of the wheel.

/// Fold any finite angle into `[0, 360)`.
#[inline]
pub fn normalize_degrees(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

/// Index of the segment under the pointer when the wheel is rotated by `angle`.
///
/// Pure and O(1). `n` must be non-zero; the engine guarantees this through
/// catalog validation.
#[inline]
pub fn resolve_index(angle: f64, n: usize, pointer_offset: f64) -> usize {
    debug_assert!(n > 0);
    let adjusted = normalize_degrees(360.0 - angle + pointer_offset);
    let width = 360.0 / n as f64;
    ((adjusted / width).floor() as usize) % n
}

/// Angular span `[start, end)` of segment `index`, in degrees.
pub fn segment_bounds(index: usize, n: usize) -> (f64, f64) {
    let width = 360.0 / n.max(1) as f64;
    (index as f64 * width, (index + 1) as f64 * width)
}
