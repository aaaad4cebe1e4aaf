//! Per-level child search and the flash policy.

use iq_core::{InterpolationOutput, TriggerRegion};
use iq_math::interpolation_ratio;
use tracing::debug;

use crate::MAX_CHILD_NODES;

/// One candidate child produced by a level search.
///
/// `data` carries the module-specific tag the next level searches on;
/// `region` is set once the search reaches the payload depth.
#[derive(Debug)]
pub struct ChildEntry<'a, D, T> {
    /// Module-specific node tag for the next search level.
    pub data: D,
    /// Calibration payload, populated only at leaf depth.
    pub region: Option<&'a T>,
}

/// Result of searching one tree level below a single parent node.
#[derive(Debug)]
pub struct ChildSelection<'a, D, T> {
    count: usize,
    weights: [f32; crate::MAX_INTERPOLATION_ITEMS],
    entries: [Option<ChildEntry<'a, D, T>>; MAX_CHILD_NODES],
}

impl<'a, D, T> ChildSelection<'a, D, T> {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self {
            count: 0,
            weights: [0.0; crate::MAX_INTERPOLATION_ITEMS],
            entries: [None, None, None],
        }
    }

    /// Appends a child entry. Entries past the capacity are dropped.
    pub fn push(&mut self, entry: ChildEntry<'a, D, T>) {
        if self.count < MAX_CHILD_NODES {
            self.entries[self.count] = Some(entry);
            self.count += 1;
        }
    }

    /// Sets one of the pairwise blend weights.
    pub fn set_weight(&mut self, slot: usize, weight: f32) {
        if slot < self.weights.len() {
            self.weights[slot] = weight;
        }
    }

    /// Number of children selected.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Pairwise blend weights, first applies to the outermost pair.
    pub fn weights(&self) -> [f32; crate::MAX_INTERPOLATION_ITEMS] {
        self.weights
    }

    /// Selected entry at `slot`, if any.
    pub fn entry(&self, slot: usize) -> Option<&ChildEntry<'a, D, T>> {
        self.entries.get(slot).and_then(Option::as_ref)
    }
}

impl<'a, D, T> Default for ChildSelection<'a, D, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Level search routine: maps a parent node tag and the frame triggers
/// to the set of children the walk should descend into.
pub type SearchChildNode<'a, D, T, L> = fn(&D, &L) -> ChildSelection<'a, D, T>;

/// One entry of a module's per-level operation table.
pub struct NodeOperation<'a, D, T, L> {
    /// Search routine for this level.
    pub search: SearchChildNode<'a, D, T, L>,
    /// Maximum children the routine can produce.
    pub max_children: usize,
}

/// Shared body of every two-way level search.
///
/// Looks up `trigger` in `regions`, stores the gap ratio as the first
/// blend weight and emits one entry per bracketing region. An empty
/// region list produces an empty selection, which ends the branch.
pub fn select_regions<'a, D, T>(
    regions: &[TriggerRegion],
    trigger: f32,
    mut entry: impl FnMut(usize) -> ChildEntry<'a, D, T>,
) -> ChildSelection<'a, D, T> {
    let mut selection = ChildSelection::new();
    if regions.is_empty() {
        return selection;
    }

    let out = locate(regions, trigger);
    selection.set_weight(0, out.ratio);
    selection.push(entry(out.start_index));
    if out.end_index != out.start_index {
        selection.push(entry(out.end_index));
    }
    selection
}

fn locate(regions: &[TriggerRegion], trigger: f32) -> InterpolationOutput {
    crate::lookup::locate_region(regions, trigger)
}

/// Flash child selection policy.
///
/// Unlike the plain axis searches this one never interpolates between
/// flash states from the region list alone; it compares the trigger
/// against a single sensitivity region owned by the calibration data
/// and may add a third child blended asymmetrically into the result.
#[derive(Debug, Clone, Copy)]
pub struct LedPolicy {
    /// Number of LEDs on the sensor module.
    pub num_led: u16,
    /// Flash sensitivity trigger for the current frame.
    pub trigger: f32,
    /// Dual LED mix ratio for the first entry.
    pub first_entry_ratio: f32,
    /// Sensitivity region the trigger is compared against.
    pub sensitivity: TriggerRegion,
}

impl LedPolicy {
    /// Resolves the flash lookup for a list of `region_count` regions.
    ///
    /// Returns the bracketing output plus the dual LED ratio that
    /// drives the optional third child. Index 0 is the LED-off tuning;
    /// unknown LED counts fall back to it.
    pub fn select(&self, region_count: usize) -> (InterpolationOutput, f32) {
        if self.num_led == 0 || region_count <= 1 {
            return (InterpolationOutput::degenerate(0), 0.0);
        }

        let mut ratio_led2 = 0.0;
        let mut out = match self.num_led {
            1 | 2 => {
                if self.trigger >= self.sensitivity.end {
                    InterpolationOutput::degenerate(1)
                } else if self.trigger <= self.sensitivity.start {
                    InterpolationOutput::degenerate(0)
                } else {
                    InterpolationOutput {
                        start_index: 0,
                        end_index: 1,
                        ratio: interpolation_ratio(
                            f64::from(self.trigger),
                            f64::from(self.sensitivity.start),
                            f64::from(self.sensitivity.end),
                        ),
                    }
                }
            }
            other => {
                debug!(num_led = other, "unsupported LED count, using LED-off tuning");
                InterpolationOutput::degenerate(0)
            }
        };

        if self.num_led == 2 {
            ratio_led2 = self.first_entry_ratio;
        }

        let last = region_count - 1;
        out.start_index = out.start_index.min(last);
        out.end_index = out.end_index.min(last);
        (out, ratio_led2)
    }

    /// Builds the flash child selection.
    ///
    /// With two LEDs and at least three calibrated regions, region 2
    /// joins as a third child weighted by `1 - first_entry_ratio`.
    pub fn select_children<'a, D, T>(
        &self,
        region_count: usize,
        mut entry: impl FnMut(usize) -> ChildEntry<'a, D, T>,
    ) -> ChildSelection<'a, D, T> {
        let mut selection = ChildSelection::new();
        if region_count == 0 {
            return selection;
        }

        let (out, ratio_led2) = self.select(region_count);
        selection.set_weight(0, out.ratio);
        selection.push(entry(out.start_index));
        if out.end_index != out.start_index {
            selection.push(entry(out.end_index));
        }
        if ratio_led2 != 0.0 && region_count >= 3 {
            selection.push(entry(2));
            let slot = selection.count() - 2;
            selection.set_weight(slot, 1.0 - ratio_led2);
        }
        selection
    }
}
