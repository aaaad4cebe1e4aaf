//! Core error types.

use thiserror::Error;

/// Result type for core validation operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while validating tuning primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Region bounds are reversed or not finite.
    #[error("invalid trigger region: [{start}, {end}]")]
    InvalidRegion {
        /// Region start value.
        start: f32,
        /// Region end value.
        end: f32,
    },

    /// Consecutive regions overlap or are out of order.
    #[error("region set not ascending: previous end {end} after next start {start}")]
    UnorderedRegions {
        /// End bound of the earlier region.
        end: f32,
        /// Start bound of the later region.
        start: f32,
    },
}
