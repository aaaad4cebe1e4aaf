//! Integration tests for the IQ interpolation crates.
//!
//! End-to-end scenarios that cross crate boundaries: a frame trigger
//! snapshot flowing through `update_trigger`, tree interpolation, and
//! register mapping, plus chromatix serialization round trips.
