//! Per-frame trigger snapshot.

use tracing::trace;

/// Trigger values published for one frame by the 3A consumers.
///
/// Modules copy what they need out of this snapshot into their own
/// trigger lists before walking the interpolation tree; the snapshot
/// itself is read-only during IQ computation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IspTriggerData {
    /// AEC exposure time ratio (short/long).
    pub aec_exposure_time: f32,
    /// AEC exposure-gain ratio.
    pub aec_exposure_gain_ratio: f32,
    /// AEC exposure sensitivity ratio.
    pub aec_sensitivity: f32,
    /// AEC real gain.
    pub aec_gain: f32,
    /// AEC lux index.
    pub aec_lux_index: f32,
    /// AWB correlated color temperature.
    pub awb_color_temperature: f32,
    /// DRC gain for the current frame.
    pub drc_gain: f32,
    /// Lens focus position.
    pub lens_position: f32,
    /// Lens zoom ratio.
    pub lens_zoom: f32,
    /// Total scale ratio of the use case.
    pub total_scale_ratio: f32,
    /// Post-IPE scale ratio.
    pub post_scale_ratio: f32,
    /// Pre-IPE scale ratio.
    pub pre_scale_ratio: f32,
    /// LED sensitivity trigger.
    pub led_sensitivity: f32,
    /// Dual-LED first entry ratio.
    pub led_first_entry_ratio: f32,
    /// Number of LEDs fired for this frame.
    pub num_led: u16,
}

impl IspTriggerData {
    /// Emits the full trigger condition at trace level.
    pub fn trace_dump(&self) {
        trace!(
            aec_exposure_time = self.aec_exposure_time,
            aec_exposure_gain_ratio = self.aec_exposure_gain_ratio,
            aec_sensitivity = self.aec_sensitivity,
            aec_gain = self.aec_gain,
            aec_lux_index = self.aec_lux_index,
            awb_color_temperature = self.awb_color_temperature,
            drc_gain = self.drc_gain,
            lens_position = self.lens_position,
            lens_zoom = self.lens_zoom,
            total_scale_ratio = self.total_scale_ratio,
            post_scale_ratio = self.post_scale_ratio,
            pre_scale_ratio = self.pre_scale_ratio,
            led_sensitivity = self.led_sensitivity,
            led_first_entry_ratio = self.led_first_entry_ratio,
            num_led = self.num_led,
            "trigger condition"
        );
    }
}
