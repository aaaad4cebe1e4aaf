//! Trigger region lookup.

use iq_core::{InterpolationOutput, TriggerRegion};
use iq_math::interpolation_ratio;

/// Locates the region pair bracketing `trigger` in an ordered region list.
///
/// Regions are assumed ascending and non-overlapping. Triggers below the
/// first region or above the last clamp to a degenerate result at that
/// boundary; a trigger inside a region is degenerate at that region; a
/// trigger in the gap between two regions yields both indices and a
/// ratio proportional to the position within the gap. There is no error
/// case, an empty list degrades to index 0.
pub fn locate_region(regions: &[TriggerRegion], trigger: f32) -> InterpolationOutput {
    let last = match regions.len().checked_sub(1) {
        Some(last) => last,
        None => return InterpolationOutput::degenerate(0),
    };

    for (index, region) in regions.iter().enumerate() {
        if index == last && trigger > region.end {
            return InterpolationOutput::degenerate(last);
        }
        if trigger > region.end {
            let next = regions[index + 1];
            if trigger < next.start {
                return InterpolationOutput {
                    start_index: index,
                    end_index: index + 1,
                    ratio: interpolation_ratio(
                        f64::from(trigger),
                        f64::from(region.end),
                        f64::from(next.start),
                    ),
                };
            }
        } else {
            return InterpolationOutput::degenerate(index);
        }
    }

    InterpolationOutput::degenerate(0)
}
