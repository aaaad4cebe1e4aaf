//! # iq-math
//!
//! Numeric helpers for IQ tuning-data interpolation.
//!
//! The interpolation engine blends per-region calibration values with
//! piecewise-linear math and hands the results to fixed-point register
//! packers. This crate provides those primitives:
//!
//! - [`blend_linear`] / [`blend_nearest`] - per-field region blending
//! - [`interpolation_ratio`] - normalized position within a region gap
//! - [`clampf`], [`feq`], [`feq_coarse`] - clamping and float equality
//! - [`float_to_q`] / [`q_to_float`] - fixed-point Q-format conversion
//!
//! # Usage
//!
//! ```rust
//! use iq_math::{blend_linear, interpolation_ratio};
//!
//! let ratio = interpolation_ratio(150.0, 100.0, 200.0);
//! assert_eq!(ratio, 0.5);
//! assert_eq!(blend_linear(10.0, 20.0, ratio), 15.0);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod fixed;
mod interp;

pub use fixed::{float_to_q, q_to_float};
pub use interp::{
    blend_linear, blend_nearest, ceil_to_i32, clampf, feq, feq_coarse, floor_to_i32,
    interpolation_ratio, round_to_i32,
};
