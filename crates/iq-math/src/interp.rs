//! Region blending and ratio math.

/// Absolute tolerance for exact float trigger comparison.
const F_TOLERANCE: f64 = 1e-9;

/// Linear blend of two calibration values.
///
/// Returns `a` when `ratio = 0.0` and `b` when `ratio = 1.0`. The
/// arithmetic is widened to f64 so that blending large LUT values with
/// small ratios does not lose the fractional part.
///
/// # Example
///
/// ```rust
/// use iq_math::blend_linear;
///
/// assert_eq!(blend_linear(0.0, 10.0, 0.0), 0.0);
/// assert_eq!(blend_linear(0.0, 10.0, 0.5), 5.0);
/// assert_eq!(blend_linear(0.0, 10.0, 1.0), 10.0);
/// ```
#[inline]
pub fn blend_linear(a: f32, b: f32, ratio: f32) -> f32 {
    let a = a as f64;
    let b = b as f64;
    (a + ratio as f64 * (b - a)) as f32
}

/// Nearest-neighbour blend for discrete tuning fields.
///
/// Flag-like values (mode selectors, block sizes) must stay on one of
/// the two region values; the ratio only decides which side wins.
///
/// # Example
///
/// ```rust
/// use iq_math::blend_nearest;
///
/// assert_eq!(blend_nearest(1.0, 3.0, 0.4), 1.0);
/// assert_eq!(blend_nearest(1.0, 3.0, 0.6), 3.0);
/// ```
#[inline]
pub fn blend_nearest(a: f32, b: f32, ratio: f32) -> f32 {
    if ratio < 0.5 { a } else { b }
}

/// Normalized position of `value` within `[start, end]`.
///
/// Clamps to `[0, 1]` outside the interval. A zero-width (or reversed)
/// interval yields 0 rather than dividing by zero.
///
/// # Example
///
/// ```rust
/// use iq_math::interpolation_ratio;
///
/// assert_eq!(interpolation_ratio(150.0, 100.0, 200.0), 0.5);
/// assert_eq!(interpolation_ratio(50.0, 100.0, 200.0), 0.0);
/// assert_eq!(interpolation_ratio(250.0, 100.0, 200.0), 1.0);
/// ```
#[inline]
pub fn interpolation_ratio(value: f64, start: f64, end: f64) -> f32 {
    if end <= start || value < start {
        0.0
    } else if value >= end {
        1.0
    } else {
        ((value - start) / (end - start)) as f32
    }
}

/// Clamps a value to `[min, max]`.
///
/// # Example
///
/// ```rust
/// use iq_math::clampf;
///
/// assert_eq!(clampf(-0.5, 0.0, 1.0), 0.0);
/// assert_eq!(clampf(0.5, 0.0, 1.0), 0.5);
/// assert_eq!(clampf(1.5, 0.0, 1.0), 1.0);
/// ```
#[inline]
pub fn clampf(value: f32, min: f32, max: f32) -> f32 {
    if value <= min {
        min
    } else if value >= max {
        max
    } else {
        value
    }
}

/// Exact float comparison used for trigger-change detection and ratio
/// classification.
///
/// Triggers are copied around verbatim, so two values are either
/// bit-for-bit equal or a genuinely different frame condition; the
/// tolerance only absorbs double rounding.
#[inline]
pub fn feq(a: f32, b: f32) -> bool {
    ((a as f64) - (b as f64)).abs() < F_TOLERANCE
}

/// Float comparison with a caller-supplied tolerance.
#[inline]
pub fn feq_coarse(a: f32, b: f32, tolerance: f32) -> bool {
    (a - b).abs() < tolerance
}

/// Rounds to the nearest integer, halfway away from zero.
///
/// Discrete tuning fields come out of interpolation as floats and are
/// rounded before being written into packed hardware structs.
#[inline]
pub fn round_to_i32(value: f32) -> i32 {
    value.round() as i32
}

/// Rounds up to the next integer.
#[inline]
pub fn ceil_to_i32(value: f32) -> i32 {
    value.ceil() as i32
}

/// Rounds down to the previous integer.
#[inline]
pub fn floor_to_i32(value: f32) -> i32 {
    value.floor() as i32
}
