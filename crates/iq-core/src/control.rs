//! Trigger control methods.
//!
//! The chromatix `control_method` block decides which raw sensor
//! quantity drives the AEC and HDR-AEC composite triggers, and region
//! bounds for those axes are stored once per possible control. Both the
//! trigger value and the region bounds must therefore be selected
//! through the active control at interpolation time.

use serde::{Deserialize, Serialize};

use crate::TriggerRegion;

/// Control variable for the AEC trigger axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AecControl {
    /// Trigger on AEC lux index.
    #[default]
    LuxIndex,
    /// Trigger on AEC real gain.
    Gain,
}

impl AecControl {
    /// Selects the AEC trigger value for this control method.
    #[inline]
    pub fn trigger_value(self, lux_index: f32, real_gain: f32) -> f32 {
        match self {
            AecControl::LuxIndex => lux_index,
            AecControl::Gain => real_gain,
        }
    }
}

/// Control variable for the HDR-AEC trigger axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HdrAecControl {
    /// Trigger on the exposure-time ratio.
    #[default]
    ExpTimeRatio,
    /// Trigger on the AEC exposure-sensitivity ratio.
    AecSensitivityRatio,
    /// Trigger on the exposure-gain ratio.
    ExpGainRatio,
}

impl HdrAecControl {
    /// Selects the HDR-AEC trigger value for this control method.
    #[inline]
    pub fn trigger_value(self, exposure_time: f32, aec_sensitivity: f32, exposure_gain_ratio: f32) -> f32 {
        match self {
            HdrAecControl::ExpTimeRatio => exposure_time,
            HdrAecControl::AecSensitivityRatio => aec_sensitivity,
            HdrAecControl::ExpGainRatio => exposure_gain_ratio,
        }
    }
}

/// Per-module trigger control configuration from the chromatix header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControlMethod {
    /// Control variable for the AEC axis.
    pub aec_exp_control: AecControl,
    /// Control variable for the HDR-AEC axis.
    pub aec_hdr_control: HdrAecControl,
}

/// AEC region bounds, stored per control method.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AecTriggerPoints {
    /// Region start when triggering on lux index.
    pub lux_idx_start: f32,
    /// Region end when triggering on lux index.
    pub lux_idx_end: f32,
    /// Region start when triggering on gain.
    pub gain_start: f32,
    /// Region end when triggering on gain.
    pub gain_end: f32,
}

impl AecTriggerPoints {
    /// Extracts the region bounds for the active control method.
    pub fn region(&self, control: AecControl) -> TriggerRegion {
        match control {
            AecControl::LuxIndex => TriggerRegion::new(self.lux_idx_start, self.lux_idx_end),
            AecControl::Gain => TriggerRegion::new(self.gain_start, self.gain_end),
        }
    }
}

/// HDR-AEC region bounds, stored per control method.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HdrAecTriggerPoints {
    /// Region start when triggering on exposure-time ratio.
    pub exp_time_start: f32,
    /// Region end when triggering on exposure-time ratio.
    pub exp_time_end: f32,
    /// Region start when triggering on AEC sensitivity ratio.
    pub aec_sensitivity_start: f32,
    /// Region end when triggering on AEC sensitivity ratio.
    pub aec_sensitivity_end: f32,
    /// Region start when triggering on exposure-gain ratio.
    pub exp_gain_start: f32,
    /// Region end when triggering on exposure-gain ratio.
    pub exp_gain_end: f32,
}

impl HdrAecTriggerPoints {
    /// Extracts the region bounds for the active control method.
    pub fn region(&self, control: HdrAecControl) -> TriggerRegion {
        match control {
            HdrAecControl::ExpTimeRatio => TriggerRegion::new(self.exp_time_start, self.exp_time_end),
            HdrAecControl::AecSensitivityRatio => {
                TriggerRegion::new(self.aec_sensitivity_start, self.aec_sensitivity_end)
            }
            HdrAecControl::ExpGainRatio => TriggerRegion::new(self.exp_gain_start, self.exp_gain_end),
        }
    }
}
