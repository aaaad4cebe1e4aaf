//! # iq-modules
//!
//! IQ module instantiations of the tuning interpolation tree.
//!
//! Each module pairs a chromatix region hierarchy with the generic
//! machinery from [`iq_tree`]: a tagged node-data enum, one thin search
//! function per tree level, a leaf blend, and a `run_interpolation`
//! entry point that resolves the hierarchy down to one parameter set
//! for the frame's trigger condition.
//!
//! - [`linearization34`] - black-level linearization: five trigger
//!   levels including the LED axis, piecewise-linear knee/base LUT
//!   segment interpolation, and slope packing for the hardware.
//! - [`anr10`] - adaptive noise reduction: eight trigger levels, leaf
//!   payloads covering all four pyramid passes, pass re-alignment
//!   during blending, and mapping into the packed per-pass firmware
//!   structs including the reduced-pass index rule.
//!
//! # Usage
//!
//! ```
//! use iq_modules::linearization34::{Linearization34Chromatix, Linearization34Input};
//!
//! let chromatix = Linearization34Chromatix::default();
//! let input = Linearization34Input {
//!     chromatix: &chromatix,
//!     lux_index: 120.0,
//!     real_gain: 2.0,
//!     drc_gain: 1.0,
//!     aec_sensitivity: 1.0,
//!     exposure_time: 1.0,
//!     exposure_gain_ratio: 1.0,
//!     cct: 5000.0,
//!     led_trigger: 0.0,
//!     led_first_entry_ratio: 0.0,
//!     num_led: 0,
//! };
//! // An empty hierarchy still resolves, to the default region.
//! let region = iq_modules::linearization34::run_interpolation(&input).unwrap();
//! assert_eq!(region.r_lut_base[0], 0.0);
//! ```
//!
//! # Dependencies
//!
//! - [`iq_core`] - Trigger snapshot, regions, control methods
//! - [`iq_math`] - Blend and rounding helpers, fixed-point packing
//! - [`iq_tree`] - The interpolation tree itself
//! - [`serde`] - Chromatix (de)serialization
//! - [`thiserror`] - Error handling
//! - [`tracing`] - Per-frame diagnostics

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod anr10;
pub mod linearization34;

use thiserror::Error;

/// Errors produced by module interpolation and mapping.
#[derive(Error, Debug)]
pub enum ModuleError {
    /// The tree walk itself failed.
    #[error(transparent)]
    Tree(#[from] iq_tree::TreeError),

    /// The use case's pass configuration cannot be mapped.
    #[error("pass config {num_passes}/{max_supported} outside supported range")]
    InvalidPassConfig {
        /// Passes the use case wants to run.
        num_passes: usize,
        /// Passes the chromatix supports.
        max_supported: usize,
    },
}

/// Convenience alias for module results.
pub type ModuleResult<T> = Result<T, ModuleError>;
