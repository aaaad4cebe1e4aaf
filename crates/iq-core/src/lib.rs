//! # iq-core
//!
//! Core types for camera IQ (image-quality) tuning interpolation.
//!
//! Every IQ hardware block selects its tuning parameters by walking a
//! tree of calibration regions keyed by *triggers* — scalar shooting
//! conditions such as lux index, sensor gain, color temperature or DRC
//! gain. This crate holds the primitives that tree shares across
//! modules:
//!
//! - [`TriggerRegion`] - one calibration bucket along a trigger axis
//! - [`InterpolationOutput`] - result of locating a trigger in a region set
//! - [`ControlMethod`] / [`AecControl`] / [`HdrAecControl`] - which raw
//!   sensor quantity drives the composite AEC and HDR-AEC triggers
//! - [`IspTriggerData`] - the per-frame trigger snapshot published by the
//!   3A stats consumers
//! - [`dynamic_enable`] - hysteresis-based module enable decision
//!
//! # Usage
//!
//! ```rust
//! use iq_core::{AecControl, AecTriggerPoints, TriggerRegion};
//!
//! let points = AecTriggerPoints {
//!     lux_idx_start: 100.0,
//!     lux_idx_end: 200.0,
//!     gain_start: 2.0,
//!     gain_end: 4.0,
//! };
//!
//! // The chromatix stores bounds for both control methods; the active
//! // one is chosen at runtime.
//! let region = points.region(AecControl::LuxIndex);
//! assert_eq!(region, TriggerRegion { start: 100.0, end: 200.0 });
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] - Error handling
//! - [`serde`] - Tuning-data serialization
//! - [`tracing`] - Trigger snapshot tracing
//!
//! # Used By
//!
//! - `iq-tree` - Generic interpolation tree
//! - `iq-modules` - Per-module tuning schemas

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod control;
mod error;
mod hysteresis;
mod region;
mod trigger;

pub use control::{AecControl, AecTriggerPoints, ControlMethod, HdrAecControl, HdrAecTriggerPoints};
pub use error::{CoreError, CoreResult};
pub use hysteresis::{dynamic_enable, ControlVar, HystDirection, TriggerCouplet};
pub use region::{validate_regions, InterpolationOutput, TriggerRegion};
pub use trigger::IspTriggerData;
