//! Ratio classification for pairwise node blending.

use iq_math::feq;

use crate::error::{TreeError, TreeResult};

/// How two child payloads combine into their parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlendMode {
    /// Take the first operand unchanged.
    CopyFirst,
    /// Take the second operand unchanged.
    CopySecond,
    /// Linear mix with the given ratio in `(0, 1)`.
    Mix(f32),
}

/// Classifies an interpolation ratio into a [`BlendMode`].
///
/// Ratios within tolerance of 0 or 1 collapse to a straight copy so
/// that boundary lookups never pay for a full blend. Anything outside
/// `[0, 1]` (including NaN) is rejected.
///
/// ```
/// use iq_tree::{classify_ratio, BlendMode};
///
/// assert_eq!(classify_ratio(0.0).unwrap(), BlendMode::CopyFirst);
/// assert_eq!(classify_ratio(0.25).unwrap(), BlendMode::Mix(0.25));
/// assert!(classify_ratio(1.5).is_err());
/// ```
pub fn classify_ratio(ratio: f32) -> TreeResult<BlendMode> {
    if ratio > 0.0 && ratio < 1.0 {
        Ok(BlendMode::Mix(ratio))
    } else if feq(ratio, 0.0) {
        Ok(BlendMode::CopyFirst)
    } else if feq(ratio, 1.0) {
        Ok(BlendMode::CopySecond)
    } else {
        Err(TreeError::InvalidRatio(ratio))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_ratios_copy() {
        assert_eq!(classify_ratio(0.0).unwrap(), BlendMode::CopyFirst);
        assert_eq!(classify_ratio(1.0).unwrap(), BlendMode::CopySecond);
        // Just below zero, within tolerance.
        assert_eq!(classify_ratio(-1e-12).unwrap(), BlendMode::CopyFirst);
    }

    #[test]
    fn interior_ratio_mixes() {
        assert_eq!(classify_ratio(0.5).unwrap(), BlendMode::Mix(0.5));
        // The open-interval check wins over the boundary tolerance.
        assert_eq!(classify_ratio(1e-12).unwrap(), BlendMode::Mix(1e-12));
    }

    #[test]
    fn out_of_range_rejected() {
        assert!(classify_ratio(-0.5).is_err());
        assert!(classify_ratio(2.0).is_err());
        assert!(classify_ratio(f32::NAN).is_err());
    }
}
