//! Hysteresis-based dynamic module enable.
//!
//! Some IQ modules are switched on and off at runtime by a trigger
//! variable crossing a start/end couplet, with hysteresis so the module
//! does not flicker near the threshold. Gain and exposure-time controls
//! read the couplet's second value pair; every other control reads the
//! first.

use serde::{Deserialize, Serialize};

use crate::IspTriggerData;

/// Trigger variable driving a dynamic-enable decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlVar {
    /// Lens zoom ratio.
    LensZoom,
    /// AEC lux index.
    LuxIndex,
    /// AEC real gain.
    Gain,
    /// DRC gain.
    DrcGain,
    /// Exposure time ratio.
    ExpTimeRatio,
    /// AEC exposure-sensitivity ratio.
    AecSensitivityRatio,
    /// AWB color temperature.
    Cct,
    /// Lens focus position.
    LensPosition,
    /// Total scale ratio.
    TotalScaleRatio,
    /// Post scale ratio.
    PostScaleRatio,
    /// Pre scale ratio.
    PreScaleRatio,
}

impl ControlVar {
    /// Reads this control variable out of the frame trigger snapshot.
    pub fn value(self, triggers: &IspTriggerData) -> f32 {
        match self {
            ControlVar::LensZoom => triggers.lens_zoom,
            ControlVar::LuxIndex => triggers.aec_lux_index,
            ControlVar::Gain => triggers.aec_gain,
            ControlVar::DrcGain => triggers.drc_gain,
            ControlVar::ExpTimeRatio => triggers.aec_exposure_time,
            ControlVar::AecSensitivityRatio => triggers.aec_sensitivity,
            ControlVar::Cct => triggers.awb_color_temperature,
            ControlVar::LensPosition => triggers.lens_position,
            ControlVar::TotalScaleRatio => triggers.total_scale_ratio,
            ControlVar::PostScaleRatio => triggers.post_scale_ratio,
            ControlVar::PreScaleRatio => triggers.pre_scale_ratio,
        }
    }
}

/// Hysteresis direction for a dynamic-enable trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HystDirection {
    /// Module enables as the trigger rises past the couplet.
    Upward,
    /// Module enables as the trigger falls below the couplet.
    Downward,
}

/// Start/end threshold couplet from the chromatix.
///
/// The second pair applies to gain and exposure-time controls.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TriggerCouplet {
    /// First pair start threshold.
    pub start1: f32,
    /// First pair end threshold.
    pub end1: f32,
    /// Second pair start threshold.
    pub start2: f32,
    /// Second pair end threshold.
    pub end2: f32,
}

/// Evaluates a dynamic-enable trigger with hysteresis.
///
/// `previous` is the enable state carried over from the last frame; it
/// is returned unchanged while the trigger sits inside the hysteresis
/// band. When the trigger itself is disabled the module is always
/// enabled.
pub fn dynamic_enable(
    trigger_enabled: bool,
    control: ControlVar,
    mode: HystDirection,
    couplet: &TriggerCouplet,
    triggers: &IspTriggerData,
    previous: bool,
) -> bool {
    if !trigger_enabled {
        return true;
    }

    let value = control.value(triggers);

    let (start, end) = match control {
        ControlVar::Gain | ControlVar::ExpTimeRatio => (couplet.start2, couplet.end2),
        _ => (couplet.start1, couplet.end1),
    };

    match mode {
        HystDirection::Upward => {
            if value >= end {
                true
            } else if value < start {
                false
            } else {
                previous
            }
        }
        HystDirection::Downward => {
            if value > end {
                false
            } else if value <= start {
                true
            } else {
                previous
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn couplet() -> TriggerCouplet {
        TriggerCouplet {
            start1: 100.0,
            end1: 200.0,
            start2: 2.0,
            end2: 4.0,
        }
    }

    #[test]
    fn test_upward_crossing() {
        let mut triggers = IspTriggerData::default();

        triggers.aec_lux_index = 250.0;
        assert!(dynamic_enable(
            true,
            ControlVar::LuxIndex,
            HystDirection::Upward,
            &couplet(),
            &triggers,
            false
        ));

        triggers.aec_lux_index = 50.0;
        assert!(!dynamic_enable(
            true,
            ControlVar::LuxIndex,
            HystDirection::Upward,
            &couplet(),
            &triggers,
            true
        ));
    }

    #[test]
    fn test_hysteresis_band_keeps_previous() {
        let mut triggers = IspTriggerData::default();
        triggers.aec_lux_index = 150.0;

        for previous in [false, true] {
            assert_eq!(
                dynamic_enable(
                    true,
                    ControlVar::LuxIndex,
                    HystDirection::Upward,
                    &couplet(),
                    &triggers,
                    previous
                ),
                previous
            );
        }
    }

    #[test]
    fn test_gain_reads_second_pair() {
        let mut triggers = IspTriggerData::default();
        triggers.aec_gain = 5.0;
        assert!(dynamic_enable(
            true,
            ControlVar::Gain,
            HystDirection::Upward,
            &couplet(),
            &triggers,
            false
        ));
    }

    #[test]
    fn test_disabled_trigger_always_on() {
        let triggers = IspTriggerData::default();
        assert!(dynamic_enable(
            false,
            ControlVar::LuxIndex,
            HystDirection::Upward,
            &couplet(),
            &triggers,
            false
        ));
    }

    #[test]
    fn test_downward_crossing() {
        let mut triggers = IspTriggerData::default();

        triggers.awb_color_temperature = 250.0;
        assert!(!dynamic_enable(
            true,
            ControlVar::Cct,
            HystDirection::Downward,
            &couplet(),
            &triggers,
            true
        ));

        triggers.awb_color_temperature = 50.0;
        assert!(dynamic_enable(
            true,
            ControlVar::Cct,
            HystDirection::Downward,
            &couplet(),
            &triggers,
            false
        ));
    }
}
