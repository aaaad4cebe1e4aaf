//! Linearization34: black-level linearization LUT interpolation.
//!
//! The chromatix hierarchy is DRC gain > HDR-AEC > LED > AEC > CCT,
//! six tree levels deep including the root. Leaves carry four color
//! channels of 8 knee points and 9 base levels each; blending two
//! leaves re-derives each base level by piecewise-linear segment
//! search rather than mixing base levels index by index.

use iq_core::{
    AecTriggerPoints, ControlMethod, HdrAecTriggerPoints, IspTriggerData, TriggerRegion,
};
use iq_math::{blend_linear, clampf, feq, float_to_q};
use iq_tree::{
    classify_ratio, select_regions, BlendMode, ChildEntry, ChildSelection, LedPolicy,
    NodeOperation, TreeResult, TuningTree, MAX_NUM_REGION,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ModuleResult;

/// Knee points per color channel LUT.
pub const NUM_KNEE_POINTS: usize = 8;

/// Base levels per color channel LUT, one more than the knee points.
pub const NUM_BASE_LEVELS: usize = NUM_KNEE_POINTS + 1;

/// Full-scale LUT output for 14-bit pipelines.
pub const MAX_LUT_VALUE: f32 = 16383.0;

/// Q factor for packed per-segment slopes.
pub const DELTA_Q_BITS: u32 = 11;

// Tree shape: 1 + 2 + 4 + 12 + 24 + 48 nodes over six levels, with the
// LED level fanning out three ways.
const MAX_NODES: usize = 91;
const MAX_NON_LEAF_NODES: usize = 43;
const INTERPOLATION_LEVELS: usize = 6;

/// One region's linearization LUTs, four color channels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Linearization34Region {
    /// Red channel knee points.
    pub r_lut_p: [f32; NUM_KNEE_POINTS],
    /// Red channel base levels.
    pub r_lut_base: [f32; NUM_BASE_LEVELS],
    /// Green-red channel knee points.
    pub gr_lut_p: [f32; NUM_KNEE_POINTS],
    /// Green-red channel base levels.
    pub gr_lut_base: [f32; NUM_BASE_LEVELS],
    /// Green-blue channel knee points.
    pub gb_lut_p: [f32; NUM_KNEE_POINTS],
    /// Green-blue channel base levels.
    pub gb_lut_base: [f32; NUM_BASE_LEVELS],
    /// Blue channel knee points.
    pub b_lut_p: [f32; NUM_KNEE_POINTS],
    /// Blue channel base levels.
    pub b_lut_base: [f32; NUM_BASE_LEVELS],
}

/// CCT leaf: trigger region plus the channel LUTs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Linearization34CctData {
    /// Color temperature region this entry covers.
    pub cct_trigger: TriggerRegion,
    /// Leaf tuning payload.
    pub rgn_data: Linearization34Region,
}

/// AEC level: trigger points plus CCT entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Linearization34AecData {
    /// Lux-or-gain trigger points, resolved per the control method.
    pub aec_trigger: AecTriggerPoints,
    /// CCT entries under this AEC region.
    pub cct_data: Vec<Linearization34CctData>,
}

/// LED index level. Entry 0 is the LED-off tuning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Linearization34LedData {
    /// AEC entries under this LED index.
    pub aec_data: Vec<Linearization34AecData>,
}

/// HDR-AEC level: composite trigger points plus LED entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Linearization34HdrAecData {
    /// Exposure-time, sensitivity or gain-ratio trigger points.
    pub hdr_aec_trigger: HdrAecTriggerPoints,
    /// LED entries under this HDR-AEC region.
    pub led_idx_data: Vec<Linearization34LedData>,
}

/// DRC gain level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Linearization34DrcGainData {
    /// DRC gain region this entry covers.
    pub drc_gain_trigger: TriggerRegion,
    /// HDR-AEC entries under this DRC region.
    pub hdr_aec_data: Vec<Linearization34HdrAecData>,
}

/// Root of the region hierarchy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Linearization34Core {
    /// Top-level DRC gain entries.
    pub drc_gain_data: Vec<Linearization34DrcGainData>,
}

/// Sensor-private tuning shared by all regions.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Linearization34PrivateInfo {
    /// Flash sensitivity region the LED level compares against.
    pub led_sensitivity_trigger: TriggerRegion,
}

/// Complete Linearization34 chromatix blob.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Linearization34Chromatix {
    /// Which scalar each composite trigger level reads.
    pub control_method: ControlMethod,
    /// Sensor-private tuning.
    pub private_information: Linearization34PrivateInfo,
    /// Region hierarchy.
    pub core: Linearization34Core,
}

/// Per-frame input: trigger scalars plus the chromatix to interpolate.
#[derive(Debug, Clone, Copy)]
pub struct Linearization34Input<'a> {
    /// Tuning blob loaded at stream configuration.
    pub chromatix: &'a Linearization34Chromatix,
    /// AEC lux index.
    pub lux_index: f32,
    /// AEC real gain.
    pub real_gain: f32,
    /// DRC gain.
    pub drc_gain: f32,
    /// AEC exposure sensitivity ratio.
    pub aec_sensitivity: f32,
    /// AEC exposure time ratio.
    pub exposure_time: f32,
    /// AEC exposure-gain ratio.
    pub exposure_gain_ratio: f32,
    /// AWB color temperature.
    pub cct: f32,
    /// LED sensitivity trigger.
    pub led_trigger: f32,
    /// Dual-LED first entry ratio.
    pub led_first_entry_ratio: f32,
    /// Number of LEDs fired.
    pub num_led: u16,
}

impl Linearization34Input<'_> {
    /// Pulls the current frame's triggers out of the snapshot.
    ///
    /// Returns true when anything changed, meaning the cached
    /// interpolation result is stale and must be recomputed. The LED
    /// sensitivity compares exactly; it is forwarded bit for bit. A
    /// change dumps the new trigger condition at trace level.
    pub fn update_trigger(&mut self, data: &IspTriggerData) -> bool {
        let changed = !feq(self.lux_index, data.aec_lux_index)
            || !feq(self.real_gain, data.aec_gain)
            || !feq(self.drc_gain, data.drc_gain)
            || !feq(self.aec_sensitivity, data.aec_sensitivity)
            || !feq(self.exposure_time, data.aec_exposure_time)
            || !feq(self.exposure_gain_ratio, data.aec_exposure_gain_ratio)
            || !feq(self.cct, data.awb_color_temperature)
            || !feq(self.led_first_entry_ratio, data.led_first_entry_ratio)
            || self.led_trigger != data.led_sensitivity;

        if changed {
            data.trace_dump();
            self.lux_index = data.aec_lux_index;
            self.real_gain = data.aec_gain;
            self.drc_gain = data.drc_gain;
            self.aec_sensitivity = data.aec_sensitivity;
            self.exposure_time = data.aec_exposure_time;
            self.exposure_gain_ratio = data.aec_exposure_gain_ratio;
            self.cct = data.awb_color_temperature;
            self.led_trigger = data.led_sensitivity;
            self.led_first_entry_ratio = data.led_first_entry_ratio;
            self.num_led = data.num_led;
        }

        changed
    }
}

// Trigger values resolved once per frame and shared by every search.
struct Lin34TriggerList {
    control: ControlMethod,
    trigger_drc_gain: f32,
    trigger_hdr_aec: f32,
    trigger_led: f32,
    num_led: u16,
    led_first_entry_ratio: f32,
    trigger_aec: f32,
    trigger_cct: f32,
    led_sensitivity_trigger: TriggerRegion,
}

#[derive(Debug, Clone, Copy)]
enum Lin34NodeData<'a> {
    Core(&'a Linearization34Core),
    DrcGain(&'a Linearization34DrcGainData),
    HdrAec(&'a Linearization34HdrAecData),
    Led(&'a Linearization34LedData),
    Aec(&'a Linearization34AecData),
    Cct,
}

type Lin34Selection<'a> = ChildSelection<'a, Lin34NodeData<'a>, Linearization34Region>;

fn gather_regions<T>(
    items: &[T],
    mut trigger: impl FnMut(&T) -> TriggerRegion,
) -> ([TriggerRegion; MAX_NUM_REGION], usize) {
    let mut regions = [TriggerRegion::default(); MAX_NUM_REGION];
    let count = items.len().min(MAX_NUM_REGION);
    for (slot, item) in regions.iter_mut().zip(items) {
        *slot = trigger(item);
    }
    (regions, count)
}

fn search_drc_gain<'a>(data: &Lin34NodeData<'a>, triggers: &Lin34TriggerList) -> Lin34Selection<'a> {
    let Lin34NodeData::Core(core) = *data else {
        return ChildSelection::new();
    };
    let (regions, count) = gather_regions(&core.drc_gain_data, |d| d.drc_gain_trigger);
    select_regions(&regions[..count], triggers.trigger_drc_gain, |index| ChildEntry {
        data: Lin34NodeData::DrcGain(&core.drc_gain_data[index]),
        region: None,
    })
}

fn search_hdr_aec<'a>(data: &Lin34NodeData<'a>, triggers: &Lin34TriggerList) -> Lin34Selection<'a> {
    let Lin34NodeData::DrcGain(node) = *data else {
        return ChildSelection::new();
    };
    let control = triggers.control.aec_hdr_control;
    let (regions, count) = gather_regions(&node.hdr_aec_data, |d| d.hdr_aec_trigger.region(control));
    select_regions(&regions[..count], triggers.trigger_hdr_aec, |index| ChildEntry {
        data: Lin34NodeData::HdrAec(&node.hdr_aec_data[index]),
        region: None,
    })
}

fn search_led<'a>(data: &Lin34NodeData<'a>, triggers: &Lin34TriggerList) -> Lin34Selection<'a> {
    let Lin34NodeData::HdrAec(node) = *data else {
        return ChildSelection::new();
    };
    let policy = LedPolicy {
        num_led: triggers.num_led,
        trigger: triggers.trigger_led,
        first_entry_ratio: triggers.led_first_entry_ratio,
        sensitivity: triggers.led_sensitivity_trigger,
    };
    policy.select_children(node.led_idx_data.len(), |index| ChildEntry {
        data: Lin34NodeData::Led(&node.led_idx_data[index]),
        region: None,
    })
}

fn search_aec<'a>(data: &Lin34NodeData<'a>, triggers: &Lin34TriggerList) -> Lin34Selection<'a> {
    let Lin34NodeData::Led(node) = *data else {
        return ChildSelection::new();
    };
    let control = triggers.control.aec_exp_control;
    let (regions, count) = gather_regions(&node.aec_data, |d| d.aec_trigger.region(control));
    select_regions(&regions[..count], triggers.trigger_aec, |index| ChildEntry {
        data: Lin34NodeData::Aec(&node.aec_data[index]),
        region: None,
    })
}

fn search_cct<'a>(data: &Lin34NodeData<'a>, triggers: &Lin34TriggerList) -> Lin34Selection<'a> {
    let Lin34NodeData::Aec(node) = *data else {
        return ChildSelection::new();
    };
    let (regions, count) = gather_regions(&node.cct_data, |d| d.cct_trigger);
    select_regions(&regions[..count], triggers.trigger_cct, |index| ChildEntry {
        data: Lin34NodeData::Cct,
        region: Some(&node.cct_data[index].rgn_data),
    })
}

/// Interpolates the chromatix down to one region for the frame's
/// trigger condition.
pub fn run_interpolation(input: &Linearization34Input<'_>) -> ModuleResult<Linearization34Region> {
    let chromatix = input.chromatix;

    let triggers = Lin34TriggerList {
        control: chromatix.control_method,
        trigger_drc_gain: input.drc_gain,
        trigger_hdr_aec: chromatix.control_method.aec_hdr_control.trigger_value(
            input.exposure_time,
            input.aec_sensitivity,
            input.exposure_gain_ratio,
        ),
        trigger_led: input.led_trigger,
        num_led: input.num_led,
        led_first_entry_ratio: input.led_first_entry_ratio,
        trigger_aec: chromatix
            .control_method
            .aec_exp_control
            .trigger_value(input.lux_index, input.real_gain),
        trigger_cct: input.cct,
        led_sensitivity_trigger: chromatix.private_information.led_sensitivity_trigger,
    };

    debug!(
        drc_gain = triggers.trigger_drc_gain,
        hdr_aec = triggers.trigger_hdr_aec,
        aec = triggers.trigger_aec,
        cct = triggers.trigger_cct,
        num_led = triggers.num_led,
        "linearization34 interpolation"
    );

    let ops = [
        NodeOperation { search: search_drc_gain, max_children: 2 },
        NodeOperation { search: search_hdr_aec, max_children: 2 },
        NodeOperation { search: search_led, max_children: 3 },
        NodeOperation { search: search_aec, max_children: 2 },
        NodeOperation { search: search_cct, max_children: 2 },
    ];

    let mut tree: TuningTree<'_, Lin34NodeData<'_>, Linearization34Region> =
        TuningTree::new(MAX_NODES, MAX_NON_LEAF_NODES, Lin34NodeData::Core(&chromatix.core));
    tree.build(INTERPOLATION_LEVELS, &ops, &triggers)?;
    tree.interpolate(INTERPOLATION_LEVELS, do_interpolation)?;
    Ok(*tree.result()?)
}

/// Blends two leaf regions into `out` according to the ratio.
fn do_interpolation(
    a: &Linearization34Region,
    b: &Linearization34Region,
    ratio: f32,
    out: &mut Linearization34Region,
) -> TreeResult<()> {
    if std::ptr::eq(a, b) {
        *out = *a;
        return Ok(());
    }
    match classify_ratio(ratio)? {
        BlendMode::CopyFirst => *out = *a,
        BlendMode::CopySecond => *out = *b,
        BlendMode::Mix(ratio) => interpolate_data(a, b, ratio, out),
    }
    Ok(())
}

fn interpolate_data(
    a: &Linearization34Region,
    b: &Linearization34Region,
    ratio: f32,
    out: &mut Linearization34Region,
) {
    segment_interpolate(
        &a.r_lut_p, &a.r_lut_base, &b.r_lut_p, &b.r_lut_base,
        ratio, MAX_LUT_VALUE, &mut out.r_lut_p, &mut out.r_lut_base,
    );
    segment_interpolate(
        &a.gr_lut_p, &a.gr_lut_base, &b.gr_lut_p, &b.gr_lut_base,
        ratio, MAX_LUT_VALUE, &mut out.gr_lut_p, &mut out.gr_lut_base,
    );
    segment_interpolate(
        &a.gb_lut_p, &a.gb_lut_base, &b.gb_lut_p, &b.gb_lut_base,
        ratio, MAX_LUT_VALUE, &mut out.gb_lut_p, &mut out.gb_lut_base,
    );
    segment_interpolate(
        &a.b_lut_p, &a.b_lut_base, &b.b_lut_p, &b.b_lut_base,
        ratio, MAX_LUT_VALUE, &mut out.b_lut_p, &mut out.b_lut_base,
    );
}

/// Blends two knee/base LUTs by segment search.
///
/// Each output knee is the linear mix of the two input knees; the base
/// level at that knee is re-derived by evaluating both input curves at
/// the mixed position and blending the results. The interpolated first
/// base level must land exactly on the first knee position; anything
/// else is a degenerate boundary and collapses to 0.
pub fn segment_interpolate(
    p1: &[f32; NUM_KNEE_POINTS],
    base1: &[f32; NUM_BASE_LEVELS],
    p2: &[f32; NUM_KNEE_POINTS],
    base2: &[f32; NUM_BASE_LEVELS],
    ratio: f32,
    max_value: f32,
    out_p: &mut [f32; NUM_KNEE_POINTS],
    out_base: &mut [f32; NUM_BASE_LEVELS],
) {
    out_base[0] = 0.0;
    for i in 0..NUM_KNEE_POINTS {
        let x0 = blend_linear(p1[i], p2[i], ratio);
        let y1 = interp_seg(p1, base1, x0, max_value);
        let y2 = interp_seg(p2, base2, x0, max_value);
        out_p[i] = x0;
        out_base[i + 1] = clampf(blend_linear(y1, y2, ratio), 0.0, max_value);
    }
    if out_p[0] != out_base[1] {
        out_base[1] = 0.0;
    }
}

/// Evaluates a knee/base curve at `x0` by piecewise-linear search.
///
/// Below the first knee the curve runs from the origin; at or above the
/// last knee it runs up to `max_value`. A zero-width segment evaluates
/// to `max_value`.
fn interp_seg(
    p: &[f32; NUM_KNEE_POINTS],
    base: &[f32; NUM_BASE_LEVELS],
    x0: f32,
    max_value: f32,
) -> f32 {
    let (xi, xnext, yi, ynext);

    if x0 < p[0] {
        xi = 0.0;
        xnext = p[0];
        yi = base[0];
        ynext = base[1];
    } else if x0 >= p[NUM_KNEE_POINTS - 1] {
        xi = p[NUM_KNEE_POINTS - 1];
        xnext = max_value;
        yi = base[NUM_BASE_LEVELS - 1];
        ynext = max_value;
    } else {
        let mut seg = NUM_KNEE_POINTS - 1;
        for i in 0..NUM_KNEE_POINTS - 1 {
            if x0 >= p[i] && x0 < p[i + 1] {
                seg = i + 1;
                break;
            }
        }
        xi = p[seg - 1];
        xnext = p[seg];
        yi = base[seg];
        ynext = base[seg + 1];
    }

    if xnext != xi {
        yi + (x0 - xi) * (ynext - yi) / (xnext - xi)
    } else {
        max_value
    }
}

/// Converts a knee/base LUT into per-segment slopes for the register
/// packer.
///
/// Segment 0 runs from the origin to the first knee; the final segment
/// runs from the last knee up to [`MAX_LUT_VALUE`]. Coincident knee
/// points produce a unity slope instead of dividing by zero. With
/// `pedestal_enable` the first knee is treated as a black pedestal:
/// it is zeroed and subtracted from the remaining knees before the
/// slopes are taken.
pub fn calculate_delta(
    lut_p: &[f32; NUM_KNEE_POINTS],
    lut_base: &[f32; NUM_BASE_LEVELS],
    delta: &mut [f32; NUM_BASE_LEVELS],
    pedestal_enable: bool,
) {
    let mut knees = *lut_p;
    if pedestal_enable {
        let pedestal = knees[0];
        knees[0] = 0.0;
        for knee in knees.iter_mut().skip(1) {
            *knee -= pedestal;
        }
    }

    delta[0] = if knees[0] != 0.0 {
        (lut_base[1] - lut_base[0]) / knees[0]
    } else {
        1.0
    };
    for i in 1..NUM_KNEE_POINTS {
        let dx = knees[i] - knees[i - 1];
        delta[i] = if dx != 0.0 {
            (lut_base[i + 1] - lut_base[i]) / dx
        } else {
            1.0
        };
    }
    let dx = MAX_LUT_VALUE - knees[NUM_KNEE_POINTS - 1];
    delta[NUM_BASE_LEVELS - 1] = if dx != 0.0 {
        (MAX_LUT_VALUE - lut_base[NUM_BASE_LEVELS - 1]) / dx
    } else {
        1.0
    };
}

/// Packs per-segment slopes into the Q-format the hardware expects.
pub fn delta_to_q(delta: &[f32; NUM_BASE_LEVELS]) -> [i32; NUM_BASE_LEVELS] {
    let mut packed = [0i32; NUM_BASE_LEVELS];
    for (q, value) in packed.iter_mut().zip(delta) {
        *q = float_to_q(*value, DELTA_Q_BITS);
    }
    packed
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    // Identity curve: value equals position, base[i + 1] sits on p[i].
    fn identity_lut() -> ([f32; NUM_KNEE_POINTS], [f32; NUM_BASE_LEVELS]) {
        let p = [100.0, 200.0, 300.0, 400.0, 500.0, 600.0, 700.0, 800.0];
        let base = [0.0, 100.0, 200.0, 300.0, 400.0, 500.0, 600.0, 700.0, 800.0];
        (p, base)
    }

    fn region_from(p: [f32; NUM_KNEE_POINTS], base: [f32; NUM_BASE_LEVELS]) -> Linearization34Region {
        Linearization34Region {
            r_lut_p: p,
            r_lut_base: base,
            gr_lut_p: p,
            gr_lut_base: base,
            gb_lut_p: p,
            gb_lut_base: base,
            b_lut_p: p,
            b_lut_base: base,
        }
    }

    #[test]
    fn segment_interpolate_identical_inputs_is_identity() {
        let (p, base) = identity_lut();
        let mut out_p = [0.0; NUM_KNEE_POINTS];
        let mut out_base = [0.0; NUM_BASE_LEVELS];
        for ratio in [0.1, 0.5, 0.9] {
            segment_interpolate(&p, &base, &p, &base, ratio, MAX_LUT_VALUE, &mut out_p, &mut out_base);
            assert_eq!(out_p, p);
            assert_eq!(out_base, base);
        }
    }

    #[test]
    fn segment_interpolate_blends_base_levels() {
        let (p, base_a) = identity_lut();
        // Same knee positions, steeper curve past the first knee.
        let base_b = [0.0, 100.0, 300.0, 500.0, 700.0, 900.0, 1100.0, 1300.0, 1500.0];
        let mut out_p = [0.0; NUM_KNEE_POINTS];
        let mut out_base = [0.0; NUM_BASE_LEVELS];
        segment_interpolate(&p, &base_a, &p, &base_b, 0.5, MAX_LUT_VALUE, &mut out_p, &mut out_base);
        assert_eq!(out_p, p);
        let expected = [0.0, 100.0, 250.0, 400.0, 550.0, 700.0, 850.0, 1000.0, 1150.0];
        for (got, want) in out_base.iter().zip(&expected) {
            assert_relative_eq!(*got, *want, epsilon = 1e-3);
        }
    }

    #[test]
    fn segment_interpolate_zeroes_inconsistent_first_base() {
        let (p, base_a) = identity_lut();
        // First base level off the first knee in one input only.
        let mut base_b = base_a;
        base_b[1] = 150.0;
        let mut out_p = [0.0; NUM_KNEE_POINTS];
        let mut out_base = [0.0; NUM_BASE_LEVELS];
        segment_interpolate(&p, &base_a, &p, &base_b, 0.5, MAX_LUT_VALUE, &mut out_p, &mut out_base);
        assert_eq!(out_base[1], 0.0);
    }

    #[test]
    fn interp_seg_edge_policies() {
        let (p, base) = identity_lut();
        // Below the first knee: segment from the origin.
        assert_relative_eq!(interp_seg(&p, &base, 50.0, MAX_LUT_VALUE), 50.0);
        // At or above the last knee: segment up to the max value.
        let above = interp_seg(&p, &base, 800.0, MAX_LUT_VALUE);
        assert_relative_eq!(above, 800.0);
        // Last knee at full scale makes the final segment zero width;
        // fall back to the max value instead of dividing by zero.
        let flat_p = [MAX_LUT_VALUE; NUM_KNEE_POINTS];
        let out = interp_seg(&flat_p, &base, MAX_LUT_VALUE, MAX_LUT_VALUE);
        assert_eq!(out, MAX_LUT_VALUE);
    }

    #[test]
    fn do_interpolation_ratio_state_machine() {
        let (p, base) = identity_lut();
        let a = region_from(p, base);
        let mut b = a;
        b.r_lut_base[2] = 250.0;
        let mut out = Linearization34Region::default();

        do_interpolation(&a, &b, 0.0, &mut out).unwrap();
        assert_eq!(out, a);
        do_interpolation(&a, &b, 1.0, &mut out).unwrap();
        assert_eq!(out, b);
        // Pointer identity copies regardless of the ratio.
        do_interpolation(&a, &a, 42.0, &mut out).unwrap();
        assert_eq!(out, a);
        // Out-of-range ratio is the engine's only hard failure.
        assert!(do_interpolation(&a, &b, 1.5, &mut out).is_err());
        assert!(do_interpolation(&a, &b, f32::NAN, &mut out).is_err());
    }

    #[test]
    fn calculate_delta_matches_direct_slopes() {
        let (p, base) = identity_lut();
        let mut delta = [0.0; NUM_BASE_LEVELS];
        calculate_delta(&p, &base, &mut delta, false);

        assert_relative_eq!(delta[0], (base[1] - base[0]) / p[0]);
        for i in 1..NUM_KNEE_POINTS {
            assert_relative_eq!(delta[i], (base[i + 1] - base[i]) / (p[i] - p[i - 1]));
        }
        assert_relative_eq!(
            delta[NUM_BASE_LEVELS - 1],
            (MAX_LUT_VALUE - base[NUM_BASE_LEVELS - 1]) / (MAX_LUT_VALUE - p[NUM_KNEE_POINTS - 1])
        );
    }

    #[test]
    fn calculate_delta_guards_coincident_knees() {
        let p = [100.0; NUM_KNEE_POINTS];
        let base = [0.0; NUM_BASE_LEVELS];
        let mut delta = [0.0; NUM_BASE_LEVELS];
        calculate_delta(&p, &base, &mut delta, false);
        for slope in delta.iter().take(NUM_KNEE_POINTS).skip(1) {
            assert_eq!(*slope, 1.0);
        }
    }

    #[test]
    fn calculate_delta_pedestal_shift() {
        let (p, base) = identity_lut();
        let mut delta = [0.0; NUM_BASE_LEVELS];
        calculate_delta(&p, &base, &mut delta, true);
        // First knee zeroed: segment 0 has no width, unity fallback.
        assert_eq!(delta[0], 1.0);
        // Remaining knees shift left by the pedestal; slopes unchanged.
        assert_relative_eq!(delta[1], (base[2] - base[1]) / ((p[1] - p[0]) - 0.0));
    }

    #[test]
    fn delta_to_q_packs_unity_slope() {
        let delta = [1.0; NUM_BASE_LEVELS];
        let packed = delta_to_q(&delta);
        assert_eq!(packed[0], 1 << DELTA_Q_BITS);
    }

    fn leaf(region: Linearization34Region) -> Linearization34CctData {
        Linearization34CctData {
            cct_trigger: TriggerRegion::new(0.0, 10000.0),
            rgn_data: region,
        }
    }

    fn single_chain(region: Linearization34Region) -> Vec<Linearization34HdrAecData> {
        vec![Linearization34HdrAecData {
            hdr_aec_trigger: HdrAecTriggerPoints {
                exp_time_start: 0.0,
                exp_time_end: 100.0,
                ..Default::default()
            },
            led_idx_data: vec![Linearization34LedData {
                aec_data: vec![Linearization34AecData {
                    aec_trigger: AecTriggerPoints {
                        lux_idx_start: 0.0,
                        lux_idx_end: 1000.0,
                        ..Default::default()
                    },
                    cct_data: vec![leaf(region)],
                }],
            }],
        }]
    }

    fn two_region_chromatix(
        a: Linearization34Region,
        b: Linearization34Region,
    ) -> Linearization34Chromatix {
        Linearization34Chromatix {
            control_method: ControlMethod::default(),
            private_information: Linearization34PrivateInfo::default(),
            core: Linearization34Core {
                drc_gain_data: vec![
                    Linearization34DrcGainData {
                        drc_gain_trigger: TriggerRegion::new(1.0, 2.0),
                        hdr_aec_data: single_chain(a),
                    },
                    Linearization34DrcGainData {
                        drc_gain_trigger: TriggerRegion::new(4.0, 5.0),
                        hdr_aec_data: single_chain(b),
                    },
                ],
            },
        }
    }

    fn input_for<'a>(
        chromatix: &'a Linearization34Chromatix,
        drc_gain: f32,
    ) -> Linearization34Input<'a> {
        Linearization34Input {
            chromatix,
            lux_index: 100.0,
            real_gain: 1.0,
            drc_gain,
            aec_sensitivity: 1.0,
            exposure_time: 10.0,
            exposure_gain_ratio: 1.0,
            cct: 5000.0,
            led_trigger: 0.0,
            led_first_entry_ratio: 0.0,
            num_led: 0,
        }
    }

    #[test]
    fn run_interpolation_degenerate_returns_region_verbatim() {
        let (p, base) = identity_lut();
        let a = region_from(p, base);
        let mut b = a;
        b.r_lut_base = [0.0, 100.0, 300.0, 500.0, 700.0, 900.0, 1100.0, 1300.0, 1500.0];
        let chromatix = two_region_chromatix(a, b);

        let out = run_interpolation(&input_for(&chromatix, 1.5)).unwrap();
        assert_eq!(out, a);
        let out = run_interpolation(&input_for(&chromatix, 4.5)).unwrap();
        assert_eq!(out, b);
    }

    #[test]
    fn run_interpolation_blends_between_drc_regions() {
        let (p, base) = identity_lut();
        let a = region_from(p, base);
        let mut b = a;
        b.r_lut_base = [0.0, 100.0, 300.0, 500.0, 700.0, 900.0, 1100.0, 1300.0, 1500.0];
        let chromatix = two_region_chromatix(a, b);

        // Halfway through the gap between the two DRC regions.
        let out = run_interpolation(&input_for(&chromatix, 3.0)).unwrap();
        let expected = [0.0, 100.0, 250.0, 400.0, 550.0, 700.0, 850.0, 1000.0, 1150.0];
        for (got, want) in out.r_lut_base.iter().zip(&expected) {
            assert_relative_eq!(*got, *want, epsilon = 1e-3);
        }
        // The untouched channels blend two identical curves.
        assert_eq!(out.gr_lut_base, base);
    }

    #[test]
    fn led_off_search_is_single_child() {
        let (p, base) = identity_lut();
        let chromatix = two_region_chromatix(region_from(p, base), region_from(p, base));
        let node = &chromatix.core.drc_gain_data[0].hdr_aec_data[0];
        let triggers = Lin34TriggerList {
            control: ControlMethod::default(),
            trigger_drc_gain: 0.0,
            trigger_hdr_aec: 0.0,
            trigger_led: 500.0,
            num_led: 0,
            led_first_entry_ratio: 0.3,
            trigger_aec: 0.0,
            trigger_cct: 0.0,
            led_sensitivity_trigger: TriggerRegion::new(100.0, 300.0),
        };
        let selection = search_led(&Lin34NodeData::HdrAec(node), &triggers);
        assert_eq!(selection.count(), 1);
        assert_eq!(selection.weights()[0], 0.0);
    }

    #[test]
    fn update_trigger_detects_change() {
        let chromatix = Linearization34Chromatix::default();
        let mut input = input_for(&chromatix, 1.0);
        let mut data = IspTriggerData {
            aec_lux_index: 100.0,
            aec_gain: 1.0,
            drc_gain: 1.0,
            aec_sensitivity: 1.0,
            aec_exposure_time: 10.0,
            aec_exposure_gain_ratio: 1.0,
            awb_color_temperature: 5000.0,
            ..Default::default()
        };
        assert!(!input.update_trigger(&data));
        data.drc_gain = 2.0;
        assert!(input.update_trigger(&data));
        assert_eq!(input.drc_gain, 2.0);
    }
}
