//! Fixed-point Q-format conversion.
//!
//! The hardware register packers consume interpolated slopes and gains
//! as Qn fixed-point integers; the conversion lives here so the tuning
//! side and the packer side agree on rounding.

/// Converts a float to a Qn fixed-point integer, rounding to nearest.
///
/// # Example
///
/// ```rust
/// use iq_math::float_to_q;
///
/// // 1.0 in Q13
/// assert_eq!(float_to_q(1.0, 13), 8192);
/// assert_eq!(float_to_q(0.5, 13), 4096);
/// ```
#[inline]
pub fn float_to_q(value: f32, q_bits: u32) -> i32 {
    let scaled = value as f64 * f64::from(1u32 << q_bits);
    scaled.round() as i32
}

/// Converts a Qn fixed-point integer back to float.
///
/// # Example
///
/// ```rust
/// use iq_math::q_to_float;
///
/// assert_eq!(q_to_float(8192, 13), 1.0);
/// ```
#[inline]
pub fn q_to_float(value: i32, q_bits: u32) -> f32 {
    (value as f64 / f64::from(1u32 << q_bits)) as f32
}
