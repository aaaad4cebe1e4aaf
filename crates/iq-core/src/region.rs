//! Trigger regions and region-lookup results.

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// One calibration bucket along a single trigger axis.
///
/// A region is defined by inclusive `[start, end]` bounds on a scalar
/// trigger value (lux index, gain, CCT, ...). Regions are read from the
/// tuning blob and never change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TriggerRegion {
    /// Region start value.
    pub start: f32,
    /// Region end value.
    pub end: f32,
}

impl TriggerRegion {
    /// Creates a region from its bounds.
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// Checks that the bounds are ordered and finite.
    pub fn validate(&self) -> CoreResult<()> {
        if !self.start.is_finite() || !self.end.is_finite() || self.start > self.end {
            return Err(CoreError::InvalidRegion {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

/// Checks that a region set is well formed: each region valid, and the
/// set ascending without overlap.
pub fn validate_regions(regions: &[TriggerRegion]) -> CoreResult<()> {
    for region in regions {
        region.validate()?;
    }
    for pair in regions.windows(2) {
        if pair[1].start < pair[0].end {
            return Err(CoreError::UnorderedRegions {
                end: pair[0].end,
                start: pair[1].start,
            });
        }
    }
    Ok(())
}

/// Result of locating a trigger value within an ordered region set.
///
/// `start_index == end_index` means the value fell inside (or was
/// clamped to) a single region and no blending is needed; otherwise the
/// value fell in the gap between two regions and
/// `ratio` gives the normalized position within that gap.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InterpolationOutput {
    /// Index of the first bracketing region.
    pub start_index: usize,
    /// Index of the second bracketing region.
    pub end_index: usize,
    /// Blend ratio in `[0, 1]`; 0 whenever the indices coincide.
    pub ratio: f32,
}

impl InterpolationOutput {
    /// Lookup result that selects a single region with no blending.
    pub fn degenerate(index: usize) -> Self {
        Self {
            start_index: index,
            end_index: index,
            ratio: 0.0,
        }
    }

    /// True when only one region was selected.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.start_index == self.end_index
    }
}
