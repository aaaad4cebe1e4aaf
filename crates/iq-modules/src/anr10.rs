//! ANR10: adaptive noise reduction tuning interpolation and mapping.
//!
//! Deepest hierarchy of the IQ modules: lens position > lens zoom >
//! post scale > pre scale > DRC gain > HDR-AEC > AEC > CCT, nine tree
//! levels including the root. Leaves carry the tuning for all four
//! pyramid passes at once; the blend re-aligns passes by their pass
//! trigger before mixing, and flag-like fields snap to the nearer
//! input instead of blending.
//!
//! The mapping half converts an interpolated leaf plus per-pass
//! reserve data into the packed per-pass structs the firmware
//! consumes, including the reduced-pass index rule.

use iq_core::{
    dynamic_enable, AecTriggerPoints, ControlMethod, ControlVar, HdrAecTriggerPoints,
    HystDirection, IspTriggerData, TriggerCouplet, TriggerRegion,
};
use iq_math::{blend_linear, blend_nearest, ceil_to_i32, feq, floor_to_i32, round_to_i32};
use iq_tree::{
    classify_ratio, select_regions, BlendMode, ChildEntry, ChildSelection, NodeOperation,
    TreeResult, TuningTree, MAX_NUM_REGION,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{ModuleError, ModuleResult};

/// Pyramid passes the hardware supports.
pub const MAX_NUM_PASSES: usize = 4;

/// Entries in the per-pass luma threshold LUT.
pub const NUM_THRESHOLD_LUT: usize = 17;

// Tree shape: binary fan-out below the root over eight trigger axes.
const MAX_NODES: usize = 511;
const MAX_NON_LEAF_NODES: usize = 255;
const INTERPOLATION_LEVELS: usize = 9;

/// Noise reduction pyramid pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PassType {
    /// Full resolution.
    #[default]
    Full = 0,
    /// 1/4 downscale.
    Dc4 = 1,
    /// 1/16 downscale.
    Dc16 = 2,
    /// 1/64 downscale.
    Dc64 = 3,
}

/// Combined luma/chroma filter tuning.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LumaChromaFilterConfig {
    /// Averaging block size for threshold LUT control; discrete.
    pub threshold_lut_control_avg_block_size: f32,
}

/// Luma filter tuning.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LumaFilterConfig {
    /// Minimum isotropic filter size.
    pub filter_isotropic_min_filter_size: f32,
    /// Manual derivative flags; discrete bitmask.
    pub filter_manual_derivatives_flags: f32,
    /// Minimum isotropic size for DC indication.
    pub dcind_isotropic_min_size: f32,
    /// Manual derivative flags for DC indication; discrete bitmask.
    pub dcind_manual_derivatives_flags: f32,
    /// Second derivative influence radius for filtering.
    pub second_derivative_max_influence_radius_filtering: f32,
    /// Second derivative influence radius for DC indication.
    pub second_derivative_max_influence_radius_dc_indication: f32,
}

/// Chroma filter tuning.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChromaFilterConfig {
    /// Minimum isotropic filter size.
    pub filter_isotropic_min_filter_size: f32,
    /// Manual derivative flags; discrete bitmask.
    pub filter_manual_derivatives_flags: f32,
    /// Minimum isotropic size for DC indication.
    pub dcind_isotropic_min_size: f32,
    /// Manual derivative flags for DC indication; discrete bitmask.
    pub dcind_manual_derivatives_flags: f32,
}

/// Luma edge kernel tuning.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LumaFilterKernel {
    /// Edge kernel size.
    pub edge_kernel_size: f32,
    /// Automatic kernel definition granularity.
    pub automatic_definition_granularity: f32,
    /// Manual 1x1 center coefficient.
    pub manual_edge_kernel_1x1_center_coefficient: f32,
    /// Manual 3x3 horizontal/vertical shift.
    pub manual_edge_kernel_3x3_horver_shift: f32,
    /// Manual 3x3 diagonal shift.
    pub manual_edge_kernel_3x3_diag_shift: f32,
    /// Manual 5x5 horizontal/vertical shift.
    pub manual_edge_kernel_5x5_horver_shift: f32,
    /// Manual 5x5 diagonal shift.
    pub manual_edge_kernel_5x5_diag_shift: f32,
    /// Manual 5x5 complement shift.
    pub manual_edge_kernel_5x5_complement_shift: f32,
}

/// Per-luma-level noise threshold LUT.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LumaFilterThreshold {
    /// Y noise threshold per luma level.
    pub y_threshold_per_y: [f32; NUM_THRESHOLD_LUT],
}

/// One pass's interpolatable tuning.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Anr10RegionData {
    /// Shared luma/chroma filter tuning.
    pub luma_chroma_filter_config: LumaChromaFilterConfig,
    /// Luma filter tuning.
    pub luma_filter_config: LumaFilterConfig,
    /// Chroma filter tuning.
    pub chroma_filter_config: ChromaFilterConfig,
    /// Luma edge kernel tuning.
    pub luma_filter_kernel: LumaFilterKernel,
    /// Luma threshold LUT.
    pub luma_filter_threshold: LumaFilterThreshold,
}

/// One pass entry of a CCT leaf.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Anr10PassData {
    /// Which pyramid pass this entry tunes.
    pub pass_trigger: PassType,
    /// Pass tuning payload.
    pub rgn_data: Anr10RegionData,
}

/// Interpolation payload: all four passes of one CCT region.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Anr10CctRegion {
    /// Per-pass tuning, not necessarily in pass order.
    pub pass_data: [Anr10PassData; MAX_NUM_PASSES],
}

/// CCT leaf level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Anr10CctData {
    /// Color temperature region this entry covers.
    pub cct_trigger: TriggerRegion,
    /// Leaf tuning payload.
    pub cct_data: Anr10CctRegion,
}

/// AEC level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Anr10AecData {
    /// Lux-or-gain trigger points, resolved per the control method.
    pub aec_trigger: AecTriggerPoints,
    /// CCT entries under this AEC region.
    pub cct_data: Vec<Anr10CctData>,
}

/// HDR-AEC level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Anr10HdrAecData {
    /// Composite HDR-AEC trigger points.
    pub hdr_aec_trigger: HdrAecTriggerPoints,
    /// AEC entries under this HDR-AEC region.
    pub aec_data: Vec<Anr10AecData>,
}

/// DRC gain level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Anr10DrcGainData {
    /// DRC gain region this entry covers.
    pub drc_gain_trigger: TriggerRegion,
    /// HDR-AEC entries under this DRC region.
    pub hdr_aec_data: Vec<Anr10HdrAecData>,
}

/// Pre-scale ratio level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Anr10PreScaleRatioData {
    /// Pre-scale ratio region this entry covers.
    pub pre_scale_ratio_trigger: TriggerRegion,
    /// DRC entries under this region.
    pub drc_gain_data: Vec<Anr10DrcGainData>,
}

/// Post-scale ratio level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Anr10PostScaleRatioData {
    /// Post-scale ratio region this entry covers.
    pub post_scale_ratio_trigger: TriggerRegion,
    /// Pre-scale entries under this region.
    pub pre_scale_ratio_data: Vec<Anr10PreScaleRatioData>,
}

/// Lens zoom level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Anr10LensZoomData {
    /// Lens zoom region this entry covers.
    pub lens_zoom_trigger: TriggerRegion,
    /// Post-scale entries under this region.
    pub post_scale_ratio_data: Vec<Anr10PostScaleRatioData>,
}

/// Lens position level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Anr10LensPositionData {
    /// Lens focus position region this entry covers.
    pub lens_position_trigger: TriggerRegion,
    /// Lens zoom entries under this region.
    pub lens_zoom_data: Vec<Anr10LensZoomData>,
}

/// Root of the region hierarchy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Anr10Core {
    /// Top-level lens position entries.
    pub lens_position_data: Vec<Anr10LensPositionData>,
}

/// Runtime enable section with hysteresis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Anr10EnableSection {
    /// Whether the dynamic-enable trigger is active at all.
    pub dynamic_enable_trigger_enabled: bool,
    /// Trigger variable the hysteresis reads.
    pub control_var: ControlVar,
    /// Hysteresis direction.
    pub hyst_direction: HystDirection,
    /// Start/end threshold couplet.
    pub hyst_trigger: TriggerCouplet,
}

impl Anr10EnableSection {
    /// Evaluates the module enable for this frame.
    pub fn dynamic_enable_flag(&self, triggers: &IspTriggerData, previous: bool) -> bool {
        dynamic_enable(
            self.dynamic_enable_trigger_enabled,
            self.control_var,
            self.hyst_direction,
            &self.hyst_trigger,
            triggers,
            previous,
        )
    }
}

impl Default for Anr10EnableSection {
    fn default() -> Self {
        Self {
            dynamic_enable_trigger_enabled: false,
            control_var: ControlVar::LuxIndex,
            hyst_direction: HystDirection::Upward,
            hyst_trigger: TriggerCouplet::default(),
        }
    }
}

/// Complete ANR10 chromatix blob.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Anr10Chromatix {
    /// Which scalar each composite trigger level reads.
    pub control_method: ControlMethod,
    /// Runtime enable section.
    pub enable_section: Anr10EnableSection,
    /// Region hierarchy.
    pub core: Anr10Core,
}

/// Per-frame input: trigger scalars plus the chromatix to interpolate.
#[derive(Debug, Clone, Copy)]
pub struct Anr10Input<'a> {
    /// Tuning blob loaded at stream configuration.
    pub chromatix: &'a Anr10Chromatix,
    /// AEC lux index.
    pub lux_index: f32,
    /// AEC real gain.
    pub real_gain: f32,
    /// AEC exposure sensitivity ratio.
    pub aec_sensitivity: f32,
    /// AEC exposure time ratio.
    pub exposure_time: f32,
    /// AEC exposure-gain ratio.
    pub exposure_gain_ratio: f32,
    /// DRC gain.
    pub drc_gain: f32,
    /// AWB color temperature.
    pub cct: f32,
    /// Lens focus position.
    pub lens_position: f32,
    /// Lens zoom ratio.
    pub lens_zoom: f32,
    /// Post-IPE scale ratio.
    pub post_scale_ratio: f32,
    /// Pre-IPE scale ratio.
    pub pre_scale_ratio: f32,
}

impl Anr10Input<'_> {
    /// Pulls the current frame's triggers out of the snapshot and
    /// reports whether the cached interpolation result went stale. A
    /// change dumps the new trigger condition at trace level.
    pub fn update_trigger(&mut self, data: &IspTriggerData) -> bool {
        let changed = !feq(self.lux_index, data.aec_lux_index)
            || !feq(self.real_gain, data.aec_gain)
            || !feq(self.aec_sensitivity, data.aec_sensitivity)
            || !feq(self.exposure_time, data.aec_exposure_time)
            || !feq(self.exposure_gain_ratio, data.aec_exposure_gain_ratio)
            || !feq(self.cct, data.awb_color_temperature)
            || !feq(self.lens_position, data.lens_position)
            || !feq(self.lens_zoom, data.lens_zoom)
            || !feq(self.post_scale_ratio, data.post_scale_ratio)
            || !feq(self.pre_scale_ratio, data.pre_scale_ratio)
            || !feq(self.drc_gain, data.drc_gain);

        if changed {
            data.trace_dump();
            self.lux_index = data.aec_lux_index;
            self.real_gain = data.aec_gain;
            self.aec_sensitivity = data.aec_sensitivity;
            self.exposure_time = data.aec_exposure_time;
            self.exposure_gain_ratio = data.aec_exposure_gain_ratio;
            self.cct = data.awb_color_temperature;
            self.lens_position = data.lens_position;
            self.lens_zoom = data.lens_zoom;
            self.post_scale_ratio = data.post_scale_ratio;
            self.pre_scale_ratio = data.pre_scale_ratio;
            self.drc_gain = data.drc_gain;
        }

        changed
    }
}

struct Anr10TriggerList {
    control: ControlMethod,
    trigger_lens_position: f32,
    trigger_lens_zoom: f32,
    trigger_post_scale_ratio: f32,
    trigger_pre_scale_ratio: f32,
    trigger_drc_gain: f32,
    trigger_hdr_aec: f32,
    trigger_aec: f32,
    trigger_cct: f32,
}

#[derive(Debug, Clone, Copy)]
enum Anr10NodeData<'a> {
    Core(&'a Anr10Core),
    LensPosition(&'a Anr10LensPositionData),
    LensZoom(&'a Anr10LensZoomData),
    PostScaleRatio(&'a Anr10PostScaleRatioData),
    PreScaleRatio(&'a Anr10PreScaleRatioData),
    DrcGain(&'a Anr10DrcGainData),
    HdrAec(&'a Anr10HdrAecData),
    Aec(&'a Anr10AecData),
    Cct,
}

type Anr10Selection<'a> = ChildSelection<'a, Anr10NodeData<'a>, Anr10CctRegion>;

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

fn search_lens_position<'a>(data: &Anr10NodeData<'a>, triggers: &Anr10TriggerList) -> Anr10Selection<'a> {
    let Anr10NodeData::Core(core) = *data else {
        return ChildSelection::new();
    };
    let (regions, count) = gather_regions(&core.lens_position_data, |d| d.lens_position_trigger);
    select_regions(&regions[..count], triggers.trigger_lens_position, |index| ChildEntry {
        data: Anr10NodeData::LensPosition(&core.lens_position_data[index]),
        region: None,
    })
}

fn search_lens_zoom<'a>(data: &Anr10NodeData<'a>, triggers: &Anr10TriggerList) -> Anr10Selection<'a> {
    let Anr10NodeData::LensPosition(node) = *data else {
        return ChildSelection::new();
    };
    let (regions, count) = gather_regions(&node.lens_zoom_data, |d| d.lens_zoom_trigger);
    select_regions(&regions[..count], triggers.trigger_lens_zoom, |index| ChildEntry {
        data: Anr10NodeData::LensZoom(&node.lens_zoom_data[index]),
        region: None,
    })
}

fn search_post_scale_ratio<'a>(data: &Anr10NodeData<'a>, triggers: &Anr10TriggerList) -> Anr10Selection<'a> {
    let Anr10NodeData::LensZoom(node) = *data else {
        return ChildSelection::new();
    };
    let (regions, count) = gather_regions(&node.post_scale_ratio_data, |d| d.post_scale_ratio_trigger);
    select_regions(&regions[..count], triggers.trigger_post_scale_ratio, |index| ChildEntry {
        data: Anr10NodeData::PostScaleRatio(&node.post_scale_ratio_data[index]),
        region: None,
    })
}

fn search_pre_scale_ratio<'a>(data: &Anr10NodeData<'a>, triggers: &Anr10TriggerList) -> Anr10Selection<'a> {
    let Anr10NodeData::PostScaleRatio(node) = *data else {
        return ChildSelection::new();
    };
    let (regions, count) = gather_regions(&node.pre_scale_ratio_data, |d| d.pre_scale_ratio_trigger);
    select_regions(&regions[..count], triggers.trigger_pre_scale_ratio, |index| ChildEntry {
        data: Anr10NodeData::PreScaleRatio(&node.pre_scale_ratio_data[index]),
        region: None,
    })
}

fn search_drc_gain<'a>(data: &Anr10NodeData<'a>, triggers: &Anr10TriggerList) -> Anr10Selection<'a> {
    let Anr10NodeData::PreScaleRatio(node) = *data else {
        return ChildSelection::new();
    };
    let (regions, count) = gather_regions(&node.drc_gain_data, |d| d.drc_gain_trigger);
    select_regions(&regions[..count], triggers.trigger_drc_gain, |index| ChildEntry {
        data: Anr10NodeData::DrcGain(&node.drc_gain_data[index]),
        region: None,
    })
}

fn search_hdr_aec<'a>(data: &Anr10NodeData<'a>, triggers: &Anr10TriggerList) -> Anr10Selection<'a> {
    let Anr10NodeData::DrcGain(node) = *data else {
        return ChildSelection::new();
    };
    let control = triggers.control.aec_hdr_control;
    let (regions, count) = gather_regions(&node.hdr_aec_data, |d| d.hdr_aec_trigger.region(control));
    select_regions(&regions[..count], triggers.trigger_hdr_aec, |index| ChildEntry {
        data: Anr10NodeData::HdrAec(&node.hdr_aec_data[index]),
        region: None,
    })
}

fn search_aec<'a>(data: &Anr10NodeData<'a>, triggers: &Anr10TriggerList) -> Anr10Selection<'a> {
    let Anr10NodeData::HdrAec(node) = *data else {
        return ChildSelection::new();
    };
    let control = triggers.control.aec_exp_control;
    let (regions, count) = gather_regions(&node.aec_data, |d| d.aec_trigger.region(control));
    select_regions(&regions[..count], triggers.trigger_aec, |index| ChildEntry {
        data: Anr10NodeData::Aec(&node.aec_data[index]),
        region: None,
    })
}

fn search_cct<'a>(data: &Anr10NodeData<'a>, triggers: &Anr10TriggerList) -> Anr10Selection<'a> {
    let Anr10NodeData::Aec(node) = *data else {
        return ChildSelection::new();
    };
    let (regions, count) = gather_regions(&node.cct_data, |d| d.cct_trigger);
    select_regions(&regions[..count], triggers.trigger_cct, |index| ChildEntry {
        data: Anr10NodeData::Cct,
        region: Some(&node.cct_data[index].cct_data),
    })
}

/// Interpolates the chromatix down to one all-pass region for the
/// frame's trigger condition.
pub fn run_interpolation(input: &Anr10Input<'_>) -> ModuleResult<Anr10CctRegion> {
    let chromatix = input.chromatix;

    let triggers = Anr10TriggerList {
        control: chromatix.control_method,
        trigger_lens_position: input.lens_position,
        trigger_lens_zoom: input.lens_zoom,
        trigger_post_scale_ratio: input.post_scale_ratio,
        trigger_pre_scale_ratio: input.pre_scale_ratio,
        trigger_drc_gain: input.drc_gain,
        trigger_hdr_aec: chromatix.control_method.aec_hdr_control.trigger_value(
            input.exposure_time,
            input.aec_sensitivity,
            input.exposure_gain_ratio,
        ),
        trigger_aec: chromatix
            .control_method
            .aec_exp_control
            .trigger_value(input.lux_index, input.real_gain),
        trigger_cct: input.cct,
    };

    debug!(
        lens_position = triggers.trigger_lens_position,
        lens_zoom = triggers.trigger_lens_zoom,
        post_scale = triggers.trigger_post_scale_ratio,
        pre_scale = triggers.trigger_pre_scale_ratio,
        drc_gain = triggers.trigger_drc_gain,
        hdr_aec = triggers.trigger_hdr_aec,
        aec = triggers.trigger_aec,
        cct = triggers.trigger_cct,
        "anr10 interpolation"
    );

    let ops = [
        NodeOperation { search: search_lens_position, max_children: 2 },
        NodeOperation { search: search_lens_zoom, max_children: 2 },
        NodeOperation { search: search_post_scale_ratio, max_children: 2 },
        NodeOperation { search: search_pre_scale_ratio, max_children: 2 },
        NodeOperation { search: search_drc_gain, max_children: 2 },
        NodeOperation { search: search_hdr_aec, max_children: 2 },
        NodeOperation { search: search_aec, max_children: 2 },
        NodeOperation { search: search_cct, max_children: 2 },
    ];

    let mut tree: TuningTree<'_, Anr10NodeData<'_>, Anr10CctRegion> =
        TuningTree::new(MAX_NODES, MAX_NON_LEAF_NODES, Anr10NodeData::Core(&chromatix.core));
    tree.build(INTERPOLATION_LEVELS, &ops, &triggers)?;
    tree.interpolate(INTERPOLATION_LEVELS, do_interpolation)?;
    Ok(*tree.result()?)
}

/// Blends two leaf regions into `out` according to the ratio.
fn do_interpolation(
    a: &Anr10CctRegion,
    b: &Anr10CctRegion,
    ratio: f32,
    out: &mut Anr10CctRegion,
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

/// Mixes two all-pass regions pass by pass.
///
/// The two inputs may store their passes in different orders, so each
/// side is indexed through a pass-trigger permutation first; the output
/// is always in pass order.
fn interpolate_data(a: &Anr10CctRegion, b: &Anr10CctRegion, ratio: f32, out: &mut Anr10CctRegion) {
    let mut index_a = [0usize; MAX_NUM_PASSES];
    let mut index_b = [0usize; MAX_NUM_PASSES];
    for (count, (pass_a, pass_b)) in a.pass_data.iter().zip(&b.pass_data).enumerate() {
        index_a[pass_a.pass_trigger as usize] = count;
        index_b[pass_b.pass_trigger as usize] = count;
    }

    for pass in 0..MAX_NUM_PASSES {
        let rgn_a = &a.pass_data[index_a[pass]];
        let rgn_b = &b.pass_data[index_b[pass]];
        let out_pass = &mut out.pass_data[pass];
        out_pass.pass_trigger = rgn_a.pass_trigger;
        blend_pass(&rgn_a.rgn_data, &rgn_b.rgn_data, ratio, &mut out_pass.rgn_data);
    }
}

fn blend_pass(a: &Anr10RegionData, b: &Anr10RegionData, ratio: f32, out: &mut Anr10RegionData) {
    out.luma_chroma_filter_config.threshold_lut_control_avg_block_size = blend_nearest(
        a.luma_chroma_filter_config.threshold_lut_control_avg_block_size,
        b.luma_chroma_filter_config.threshold_lut_control_avg_block_size,
        ratio,
    );

    let (la, lb, lo) = (&a.luma_filter_config, &b.luma_filter_config, &mut out.luma_filter_config);
    lo.filter_isotropic_min_filter_size =
        blend_linear(la.filter_isotropic_min_filter_size, lb.filter_isotropic_min_filter_size, ratio);
    lo.filter_manual_derivatives_flags =
        blend_nearest(la.filter_manual_derivatives_flags, lb.filter_manual_derivatives_flags, ratio);
    lo.dcind_isotropic_min_size =
        blend_linear(la.dcind_isotropic_min_size, lb.dcind_isotropic_min_size, ratio);
    lo.dcind_manual_derivatives_flags =
        blend_nearest(la.dcind_manual_derivatives_flags, lb.dcind_manual_derivatives_flags, ratio);
    lo.second_derivative_max_influence_radius_filtering = blend_linear(
        la.second_derivative_max_influence_radius_filtering,
        lb.second_derivative_max_influence_radius_filtering,
        ratio,
    );
    lo.second_derivative_max_influence_radius_dc_indication = blend_linear(
        la.second_derivative_max_influence_radius_dc_indication,
        lb.second_derivative_max_influence_radius_dc_indication,
        ratio,
    );

    let (ca, cb, co) = (&a.chroma_filter_config, &b.chroma_filter_config, &mut out.chroma_filter_config);
    co.filter_isotropic_min_filter_size =
        blend_linear(ca.filter_isotropic_min_filter_size, cb.filter_isotropic_min_filter_size, ratio);
    co.filter_manual_derivatives_flags =
        blend_nearest(ca.filter_manual_derivatives_flags, cb.filter_manual_derivatives_flags, ratio);
    co.dcind_isotropic_min_size =
        blend_linear(ca.dcind_isotropic_min_size, cb.dcind_isotropic_min_size, ratio);
    co.dcind_manual_derivatives_flags =
        blend_nearest(ca.dcind_manual_derivatives_flags, cb.dcind_manual_derivatives_flags, ratio);

    let (ka, kb, ko) = (&a.luma_filter_kernel, &b.luma_filter_kernel, &mut out.luma_filter_kernel);
    ko.edge_kernel_size = blend_linear(ka.edge_kernel_size, kb.edge_kernel_size, ratio);
    ko.automatic_definition_granularity =
        blend_linear(ka.automatic_definition_granularity, kb.automatic_definition_granularity, ratio);
    ko.manual_edge_kernel_1x1_center_coefficient = blend_linear(
        ka.manual_edge_kernel_1x1_center_coefficient,
        kb.manual_edge_kernel_1x1_center_coefficient,
        ratio,
    );
    ko.manual_edge_kernel_3x3_horver_shift =
        blend_linear(ka.manual_edge_kernel_3x3_horver_shift, kb.manual_edge_kernel_3x3_horver_shift, ratio);
    ko.manual_edge_kernel_3x3_diag_shift =
        blend_linear(ka.manual_edge_kernel_3x3_diag_shift, kb.manual_edge_kernel_3x3_diag_shift, ratio);
    ko.manual_edge_kernel_5x5_horver_shift =
        blend_linear(ka.manual_edge_kernel_5x5_horver_shift, kb.manual_edge_kernel_5x5_horver_shift, ratio);
    ko.manual_edge_kernel_5x5_diag_shift =
        blend_linear(ka.manual_edge_kernel_5x5_diag_shift, kb.manual_edge_kernel_5x5_diag_shift, ratio);
    ko.manual_edge_kernel_5x5_complement_shift = blend_linear(
        ka.manual_edge_kernel_5x5_complement_shift,
        kb.manual_edge_kernel_5x5_complement_shift,
        ratio,
    );

    for (slot, (ta, tb)) in out
        .luma_filter_threshold
        .y_threshold_per_y
        .iter_mut()
        .zip(
            a.luma_filter_threshold
                .y_threshold_per_y
                .iter()
                .zip(&b.luma_filter_threshold.y_threshold_per_y),
        )
    {
        *slot = blend_linear(*ta, *tb, ratio);
    }
}

// ---------------------------------------------------------------------------
// Mapping into the packed per-pass firmware structs.
// ---------------------------------------------------------------------------

/// Non-interpolated per-pass tuning copied through verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Anr10PassReserve {
    /// Per-pass enable bits.
    pub top: ReserveTop,
    /// Power control feature bits.
    pub power_control: ReservePowerControl,
    /// Discrete luma filter modes.
    pub luma_filter_config: ReserveLumaFilterConfig,
    /// Discrete chroma filter modes.
    pub chroma_filter_config: ReserveChromaFilterConfig,
    /// Discrete kernel modes.
    pub luma_filter_kernel: ReserveLumaFilterKernel,
}

/// Per-pass enable bits.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReserveTop {
    /// Luma noise reduction enable for this pass.
    pub enable_luma_noise_reduction_pass: u16,
    /// Chroma noise reduction enable for this pass.
    pub enable_chroma_noise_reduction_pass: u16,
}

/// Power control feature bits.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReservePowerControl {
    /// Chroma filter extension enable.
    pub enable_chroma_filter_extension: u16,
    /// Luma smoothing and peak treatment enable.
    pub enable_luma_smoothing_treatment_and_peak_treatment: u16,
    /// Chroma smoothing and peak treatment enable.
    pub enable_chroma_smoothing_treatment_and_peak_treatment: u16,
}

/// Discrete luma filter modes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReserveLumaFilterConfig {
    /// Filter decision mode selector.
    pub filter_decision_mode: i32,
    /// External derivative feed for filtering.
    pub filter_enable_external_derivatives: u16,
    /// DC indication decision mode selector.
    pub dcind_decision_mode: i32,
    /// External derivative feed for DC indication.
    pub dcind_enable_external_derivatives: u16,
}

/// Discrete chroma filter modes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReserveChromaFilterConfig {
    /// Filter decision mode selector.
    pub filter_decision_mode: i32,
    /// DC indication decision mode selector.
    pub dcind_decision_mode: i32,
}

/// Discrete kernel modes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReserveLumaFilterKernel {
    /// Kernel definition mode selector.
    pub kernel_definition_mode: i32,
}

/// Per-pass reserve table, indexed like the interpolated pass data.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Anr10ReserveData {
    /// Reserve tuning per pyramid pass.
    pub pass_reserve_data: [Anr10PassReserve; MAX_NUM_PASSES],
}

/// Packed per-pass struct handed to the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnrChromatix {
    /// Module and pass enables.
    pub top: AnrTop,
    /// Power control feature bits.
    pub power_control: AnrPowerControl,
    /// Shared luma/chroma filter fields.
    pub luma_chroma_filter_config: AnrLumaChromaFilterConfig,
    /// Luma filter fields.
    pub luma_filter_config: AnrLumaFilterConfig,
    /// Chroma filter fields.
    pub chroma_filter_config: AnrChromaFilterConfig,
    /// Kernel fields.
    pub luma_filter_kernel: AnrLumaFilterKernel,
    /// Threshold LUT, rounded to register precision.
    pub luma_filter_threshold: AnrLumaFilterThreshold,
}

/// Module and pass enables.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnrTop {
    /// Module-wide luma enable, OR of every active pass.
    pub enable_luma_noise_reduction: u16,
    /// Module-wide chroma enable, OR of every active pass.
    pub enable_chroma_noise_reduction: u16,
    /// This pass's luma enable.
    pub enable_luma_noise_reduction_pass: u16,
    /// This pass's chroma enable.
    pub enable_chroma_noise_reduction_pass: u16,
}

/// Power control feature bits.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnrPowerControl {
    /// Chroma filter extension enable.
    pub enable_chroma_filter_extension: u16,
    /// Luma smoothing and peak treatment enable.
    pub enable_luma_smoothing_treatment_and_peak_treatment: u16,
    /// Chroma smoothing and peak treatment enable.
    pub enable_chroma_smoothing_treatment_and_peak_treatment: u16,
}

/// Shared luma/chroma filter fields.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnrLumaChromaFilterConfig {
    /// Averaging block size, rounded.
    pub threshold_lut_control_avg_block_size: i32,
}

/// Luma filter fields.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnrLumaFilterConfig {
    /// Filter decision mode selector.
    pub filter_decision_mode: i32,
    /// Minimum isotropic filter size, rounded up.
    pub filter_isotropic_min_filter_size: i32,
    /// External derivative feed for filtering.
    pub filter_enable_external_derivatives: u16,
    /// Manual derivative flags, rounded.
    pub filter_manual_derivatives_flags: i32,
    /// DC indication decision mode selector.
    pub dcind_decision_mode: i32,
    /// Minimum isotropic DC indication size, rounded up.
    pub dcind_isotropic_min_size: i32,
    /// External derivative feed for DC indication.
    pub dcind_enable_external_derivatives: u16,
    /// Manual DC indication derivative flags, rounded.
    pub dcind_manual_derivatives_flags: i32,
    /// Second derivative filtering radius, rounded.
    pub second_derivative_max_influence_radius_filtering: i32,
    /// Second derivative DC indication radius, rounded.
    pub second_derivative_max_influence_radius_dc_indication: i32,
}

/// Chroma filter fields.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnrChromaFilterConfig {
    /// Filter decision mode selector.
    pub filter_decision_mode: i32,
    /// Minimum isotropic filter size, rounded up.
    pub filter_isotropic_min_filter_size: i32,
    /// Manual derivative flags, rounded.
    pub filter_manual_derivatives_flags: i32,
    /// DC indication decision mode selector.
    pub dcind_decision_mode: i32,
    /// Minimum isotropic DC indication size, rounded up.
    pub dcind_isotropic_min_size: i32,
    /// Manual DC indication derivative flags, rounded.
    pub dcind_manual_derivatives_flags: i32,
}

/// Kernel fields.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnrLumaFilterKernel {
    /// Kernel definition mode selector.
    pub kernel_definition_mode: i32,
    /// Edge kernel size, rounded up.
    pub edge_kernel_size: i32,
    /// Kernel definition granularity, rounded down.
    pub automatic_definition_granularity: i32,
    /// Manual 1x1 center coefficient, rounded up.
    pub manual_edge_kernel_1x1_center_coefficient: i32,
    /// Manual 3x3 horizontal/vertical shift, rounded up.
    pub manual_edge_kernel_3x3_horver_shift: i32,
    /// Manual 3x3 diagonal shift, rounded up.
    pub manual_edge_kernel_3x3_diag_shift: i32,
    /// Manual 5x5 horizontal/vertical shift, rounded up.
    pub manual_edge_kernel_5x5_horver_shift: i32,
    /// Manual 5x5 diagonal shift, rounded up.
    pub manual_edge_kernel_5x5_diag_shift: i32,
    /// Manual 5x5 complement shift, rounded up.
    pub manual_edge_kernel_5x5_complement_shift: i32,
}

/// Threshold LUT in register precision.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnrLumaFilterThreshold {
    /// Y noise threshold per luma level, rounded.
    pub y_threshold_per_y: [i32; NUM_THRESHOLD_LUT],
}

/// Pass configuration of the current use case.
#[derive(Debug, Clone, Copy)]
pub struct Anr10PassConfig {
    /// Passes the use case actually runs.
    pub num_passes: usize,
    /// Passes the chromatix table supports for this use case.
    pub max_supported_passes: usize,
}

/// Maps a run-time pass index to its chromatix table index.
///
/// When fewer passes run than the table supports, pass 0 keeps the
/// full-resolution tuning and the remaining passes take tuning from the
/// tail of the table, so the coarsest pyramid levels keep their own
/// settings.
pub fn chromatix_pass_index(config: &Anr10PassConfig, pass: usize) -> usize {
    if config.num_passes < config.max_supported_passes {
        if pass == 0 {
            0
        } else {
            config.max_supported_passes - config.num_passes + pass
        }
    } else {
        pass
    }
}

/// Converts an interpolated all-pass region plus the reserve table into
/// packed per-pass firmware structs.
///
/// `out` receives one entry per active pass. The module-wide enables
/// are the OR of every active pass's enable bit, so a module stays on
/// if any pyramid level needs it.
pub fn calculate_setting(
    config: &Anr10PassConfig,
    data: &Anr10CctRegion,
    reserve: &Anr10ReserveData,
    out: &mut [AnrChromatix],
) -> ModuleResult<()> {
    if config.num_passes > MAX_NUM_PASSES
        || config.max_supported_passes > MAX_NUM_PASSES
        || config.num_passes > config.max_supported_passes
        || out.len() < config.num_passes
    {
        return Err(ModuleError::InvalidPassConfig {
            num_passes: config.num_passes,
            max_supported: config.max_supported_passes,
        });
    }

    let mut luma_enable: u16 = 0;
    let mut chroma_enable: u16 = 0;
    for pass in 0..config.num_passes {
        let reserve_pass = &reserve.pass_reserve_data[chromatix_pass_index(config, pass)];
        luma_enable |= reserve_pass.top.enable_luma_noise_reduction_pass & 1;
        chroma_enable |= reserve_pass.top.enable_chroma_noise_reduction_pass & 1;
    }

    for pass in 0..config.num_passes {
        let table_index = chromatix_pass_index(config, pass);
        trace!(pass, table_index, "anr10 pass mapping");
        let reserve_pass = &reserve.pass_reserve_data[table_index];
        let region = &data.pass_data[table_index].rgn_data;
        let packed = &mut out[pass];
        *packed = AnrChromatix::default();

        packed.top.enable_luma_noise_reduction = luma_enable;
        packed.top.enable_chroma_noise_reduction = chroma_enable;
        packed.top.enable_luma_noise_reduction_pass = reserve_pass.top.enable_luma_noise_reduction_pass;
        packed.top.enable_chroma_noise_reduction_pass =
            reserve_pass.top.enable_chroma_noise_reduction_pass;

        packed.power_control.enable_chroma_filter_extension =
            reserve_pass.power_control.enable_chroma_filter_extension;
        packed.power_control.enable_luma_smoothing_treatment_and_peak_treatment =
            reserve_pass.power_control.enable_luma_smoothing_treatment_and_peak_treatment;
        packed.power_control.enable_chroma_smoothing_treatment_and_peak_treatment =
            reserve_pass.power_control.enable_chroma_smoothing_treatment_and_peak_treatment;

        packed.luma_chroma_filter_config.threshold_lut_control_avg_block_size =
            round_to_i32(region.luma_chroma_filter_config.threshold_lut_control_avg_block_size);

        let lf = &mut packed.luma_filter_config;
        lf.filter_decision_mode = reserve_pass.luma_filter_config.filter_decision_mode;
        lf.filter_isotropic_min_filter_size =
            ceil_to_i32(region.luma_filter_config.filter_isotropic_min_filter_size);
        lf.filter_enable_external_derivatives =
            reserve_pass.luma_filter_config.filter_enable_external_derivatives;
        lf.filter_manual_derivatives_flags =
            round_to_i32(region.luma_filter_config.filter_manual_derivatives_flags);
        lf.dcind_decision_mode = reserve_pass.luma_filter_config.dcind_decision_mode;
        lf.dcind_isotropic_min_size = ceil_to_i32(region.luma_filter_config.dcind_isotropic_min_size);
        lf.dcind_enable_external_derivatives =
            reserve_pass.luma_filter_config.dcind_enable_external_derivatives;
        lf.dcind_manual_derivatives_flags =
            round_to_i32(region.luma_filter_config.dcind_manual_derivatives_flags);
        lf.second_derivative_max_influence_radius_filtering =
            round_to_i32(region.luma_filter_config.second_derivative_max_influence_radius_filtering);
        lf.second_derivative_max_influence_radius_dc_indication = round_to_i32(
            region
                .luma_filter_config
                .second_derivative_max_influence_radius_dc_indication,
        );

        let cf = &mut packed.chroma_filter_config;
        cf.filter_decision_mode = reserve_pass.chroma_filter_config.filter_decision_mode;
        cf.filter_isotropic_min_filter_size =
            ceil_to_i32(region.chroma_filter_config.filter_isotropic_min_filter_size);
        cf.filter_manual_derivatives_flags =
            round_to_i32(region.chroma_filter_config.filter_manual_derivatives_flags);
        cf.dcind_decision_mode = reserve_pass.chroma_filter_config.dcind_decision_mode;
        cf.dcind_isotropic_min_size = ceil_to_i32(region.chroma_filter_config.dcind_isotropic_min_size);
        cf.dcind_manual_derivatives_flags =
            round_to_i32(region.chroma_filter_config.dcind_manual_derivatives_flags);

        let kernel = &mut packed.luma_filter_kernel;
        kernel.kernel_definition_mode = reserve_pass.luma_filter_kernel.kernel_definition_mode;
        kernel.edge_kernel_size = ceil_to_i32(region.luma_filter_kernel.edge_kernel_size);
        kernel.automatic_definition_granularity =
            floor_to_i32(region.luma_filter_kernel.automatic_definition_granularity);
        kernel.manual_edge_kernel_1x1_center_coefficient =
            ceil_to_i32(region.luma_filter_kernel.manual_edge_kernel_1x1_center_coefficient);
        kernel.manual_edge_kernel_3x3_horver_shift =
            ceil_to_i32(region.luma_filter_kernel.manual_edge_kernel_3x3_horver_shift);
        kernel.manual_edge_kernel_3x3_diag_shift =
            ceil_to_i32(region.luma_filter_kernel.manual_edge_kernel_3x3_diag_shift);
        kernel.manual_edge_kernel_5x5_horver_shift =
            ceil_to_i32(region.luma_filter_kernel.manual_edge_kernel_5x5_horver_shift);
        kernel.manual_edge_kernel_5x5_diag_shift =
            ceil_to_i32(region.luma_filter_kernel.manual_edge_kernel_5x5_diag_shift);
        kernel.manual_edge_kernel_5x5_complement_shift =
            ceil_to_i32(region.luma_filter_kernel.manual_edge_kernel_5x5_complement_shift);

        for (slot, value) in packed
            .luma_filter_threshold
            .y_threshold_per_y
            .iter_mut()
            .zip(&region.luma_filter_threshold.y_threshold_per_y)
        {
            *slot = round_to_i32(*value);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn region_with_size(size: f32) -> Anr10RegionData {
        let mut region = Anr10RegionData::default();
        region.luma_filter_config.filter_isotropic_min_filter_size = size;
        region.luma_filter_config.filter_manual_derivatives_flags = size;
        region.luma_filter_threshold.y_threshold_per_y = [size; NUM_THRESHOLD_LUT];
        region
    }

    fn cct_region(base: f32) -> Anr10CctRegion {
        let mut out = Anr10CctRegion::default();
        for (i, pass) in out.pass_data.iter_mut().enumerate() {
            pass.pass_trigger = match i {
                0 => PassType::Full,
                1 => PassType::Dc4,
                2 => PassType::Dc16,
                _ => PassType::Dc64,
            };
            pass.rgn_data = region_with_size(base + i as f32 * 10.0);
        }
        out
    }

    #[test]
    fn blend_realigns_pass_order() {
        let a = cct_region(10.0);
        // Same payload but stored with the passes reversed.
        let mut b = cct_region(20.0);
        b.pass_data.reverse();

        let mut out = Anr10CctRegion::default();
        do_interpolation(&a, &b, 0.5, &mut out).unwrap();

        for (pass, entry) in out.pass_data.iter().enumerate() {
            assert_eq!(entry.pass_trigger as usize, pass);
            // a pass value: 10 + pass*10, b pass value: 20 + pass*10.
            let want = (10.0 + pass as f32 * 10.0 + 20.0 + pass as f32 * 10.0) / 2.0;
            assert_relative_eq!(
                entry.rgn_data.luma_filter_config.filter_isotropic_min_filter_size,
                want,
                epsilon = 1e-5
            );
        }
    }

    #[test]
    fn flag_fields_snap_to_nearest() {
        let a = cct_region(1.0);
        let b = cct_region(6.0);
        let mut out = Anr10CctRegion::default();

        do_interpolation(&a, &b, 0.25, &mut out).unwrap();
        assert_eq!(out.pass_data[0].rgn_data.luma_filter_config.filter_manual_derivatives_flags, 1.0);
        do_interpolation(&a, &b, 0.75, &mut out).unwrap();
        assert_eq!(out.pass_data[0].rgn_data.luma_filter_config.filter_manual_derivatives_flags, 6.0);
    }

    #[test]
    fn ratio_state_machine() {
        let a = cct_region(1.0);
        let b = cct_region(2.0);
        let mut out = Anr10CctRegion::default();

        do_interpolation(&a, &b, 0.0, &mut out).unwrap();
        assert_eq!(out, a);
        do_interpolation(&a, &b, 1.0, &mut out).unwrap();
        assert_eq!(out, b);
        do_interpolation(&a, &a, -7.0, &mut out).unwrap();
        assert_eq!(out, a);
        assert!(do_interpolation(&a, &b, 2.0, &mut out).is_err());
    }

    #[test]
    fn reduced_pass_index_rule() {
        let config = Anr10PassConfig { num_passes: 2, max_supported_passes: 4 };
        assert_eq!(chromatix_pass_index(&config, 0), 0);
        assert_eq!(chromatix_pass_index(&config, 1), 3);

        let full = Anr10PassConfig { num_passes: 4, max_supported_passes: 4 };
        for pass in 0..4 {
            assert_eq!(chromatix_pass_index(&full, pass), pass);
        }
    }

    #[test]
    fn setting_maps_reduced_passes() {
        let data = cct_region(2.5);
        let mut reserve = Anr10ReserveData::default();
        for (i, pass) in reserve.pass_reserve_data.iter_mut().enumerate() {
            pass.luma_filter_kernel.kernel_definition_mode = i as i32;
        }
        reserve.pass_reserve_data[0].top.enable_luma_noise_reduction_pass = 1;

        let config = Anr10PassConfig { num_passes: 2, max_supported_passes: 4 };
        let mut out = [AnrChromatix::default(); 2];
        calculate_setting(&config, &data, &reserve, &mut out).unwrap();

        // Pass 0 keeps full-resolution tuning, pass 1 takes table entry 3.
        assert_eq!(out[0].luma_filter_kernel.kernel_definition_mode, 0);
        assert_eq!(out[1].luma_filter_kernel.kernel_definition_mode, 3);
        // Module-wide enable is the OR across active passes.
        assert_eq!(out[0].top.enable_luma_noise_reduction, 1);
        assert_eq!(out[1].top.enable_luma_noise_reduction, 1);
        assert_eq!(out[1].top.enable_luma_noise_reduction_pass, 0);
        // 2.5 rounds up for the ceiling fields.
        assert_eq!(out[0].luma_filter_config.filter_isotropic_min_filter_size, 3);
    }

    #[test]
    fn setting_rejects_bad_pass_config() {
        let data = Anr10CctRegion::default();
        let reserve = Anr10ReserveData::default();
        let mut out = [AnrChromatix::default(); 2];

        let too_many = Anr10PassConfig { num_passes: 5, max_supported_passes: 4 };
        assert!(calculate_setting(&too_many, &data, &reserve, &mut out).is_err());

        let short_out = Anr10PassConfig { num_passes: 3, max_supported_passes: 4 };
        assert!(calculate_setting(&short_out, &data, &reserve, &mut out).is_err());
    }

    fn leaf(region: Anr10CctRegion) -> Anr10CctData {
        Anr10CctData {
            cct_trigger: TriggerRegion::new(0.0, 10000.0),
            cct_data: region,
        }
    }

    fn single_chain(region: Anr10CctRegion) -> Vec<Anr10LensZoomData> {
        vec![Anr10LensZoomData {
            lens_zoom_trigger: TriggerRegion::new(0.0, 10.0),
            post_scale_ratio_data: vec![Anr10PostScaleRatioData {
                post_scale_ratio_trigger: TriggerRegion::new(0.0, 10.0),
                pre_scale_ratio_data: vec![Anr10PreScaleRatioData {
                    pre_scale_ratio_trigger: TriggerRegion::new(0.0, 10.0),
                    drc_gain_data: vec![Anr10DrcGainData {
                        drc_gain_trigger: TriggerRegion::new(0.0, 16.0),
                        hdr_aec_data: vec![Anr10HdrAecData {
                            hdr_aec_trigger: HdrAecTriggerPoints {
                                exp_time_start: 0.0,
                                exp_time_end: 100.0,
                                ..Default::default()
                            },
                            aec_data: vec![Anr10AecData {
                                aec_trigger: AecTriggerPoints {
                                    lux_idx_start: 0.0,
                                    lux_idx_end: 1000.0,
                                    ..Default::default()
                                },
                                cct_data: vec![leaf(region)],
                            }],
                        }],
                    }],
                }],
            }],
        }]
    }

    fn two_region_chromatix(a: Anr10CctRegion, b: Anr10CctRegion) -> Anr10Chromatix {
        Anr10Chromatix {
            control_method: ControlMethod::default(),
            enable_section: Anr10EnableSection::default(),
            core: Anr10Core {
                lens_position_data: vec![
                    Anr10LensPositionData {
                        lens_position_trigger: TriggerRegion::new(0.0, 100.0),
                        lens_zoom_data: single_chain(a),
                    },
                    Anr10LensPositionData {
                        lens_position_trigger: TriggerRegion::new(300.0, 400.0),
                        lens_zoom_data: single_chain(b),
                    },
                ],
            },
        }
    }

    fn input_for<'a>(chromatix: &'a Anr10Chromatix, lens_position: f32) -> Anr10Input<'a> {
        Anr10Input {
            chromatix,
            lux_index: 100.0,
            real_gain: 1.0,
            aec_sensitivity: 1.0,
            exposure_time: 10.0,
            exposure_gain_ratio: 1.0,
            drc_gain: 1.0,
            cct: 5000.0,
            lens_position,
            lens_zoom: 1.0,
            post_scale_ratio: 1.0,
            pre_scale_ratio: 1.0,
        }
    }

    #[test]
    fn run_interpolation_blends_between_lens_regions() {
        let a = cct_region(10.0);
        let b = cct_region(30.0);
        let chromatix = two_region_chromatix(a, b);

        // Inside region 0: verbatim copy.
        let out = run_interpolation(&input_for(&chromatix, 50.0)).unwrap();
        assert_eq!(out, a);

        // Halfway through the gap between lens position regions.
        let out = run_interpolation(&input_for(&chromatix, 200.0)).unwrap();
        assert_relative_eq!(
            out.pass_data[0]
                .rgn_data
                .luma_filter_config
                .filter_isotropic_min_filter_size,
            20.0,
            epsilon = 1e-5
        );
    }

    #[test]
    fn dynamic_enable_hysteresis_band() {
        let section = Anr10EnableSection {
            dynamic_enable_trigger_enabled: true,
            control_var: ControlVar::LuxIndex,
            hyst_direction: HystDirection::Upward,
            hyst_trigger: TriggerCouplet {
                start1: 100.0,
                end1: 200.0,
                ..Default::default()
            },
        };
        let mut triggers = IspTriggerData::default();

        triggers.aec_lux_index = 250.0;
        assert!(section.dynamic_enable_flag(&triggers, false));
        triggers.aec_lux_index = 50.0;
        assert!(!section.dynamic_enable_flag(&triggers, true));
        // Inside the band the previous state sticks.
        triggers.aec_lux_index = 150.0;
        assert!(section.dynamic_enable_flag(&triggers, true));
        assert!(!section.dynamic_enable_flag(&triggers, false));
    }

    #[test]
    fn update_trigger_detects_change() {
        let chromatix = Anr10Chromatix::default();
        let mut input = input_for(&chromatix, 10.0);
        let mut data = IspTriggerData {
            aec_lux_index: 100.0,
            aec_gain: 1.0,
            aec_sensitivity: 1.0,
            aec_exposure_time: 10.0,
            aec_exposure_gain_ratio: 1.0,
            awb_color_temperature: 5000.0,
            drc_gain: 1.0,
            lens_position: 10.0,
            lens_zoom: 1.0,
            post_scale_ratio: 1.0,
            pre_scale_ratio: 1.0,
            ..Default::default()
        };
        assert!(!input.update_trigger(&data));
        data.lens_zoom = 2.0;
        assert!(input.update_trigger(&data));
        assert_eq!(input.lens_zoom, 2.0);
    }
}
