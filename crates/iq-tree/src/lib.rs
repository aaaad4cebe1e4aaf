//! # iq-tree
//!
//! Generic N-ary interpolation tree over trigger-keyed tuning regions.
//!
//! Every IQ module resolves its per-frame tuning parameters the same
//! way: a fixed-shape tree is built over the module's chromatix region
//! hierarchy (DRC gain, HDR-AEC, LED, AEC, CCT, ...), each level
//! attaching the one or two regions that bracket that axis's trigger
//! value, and the leaf tuning data is then blended bottom-up into a
//! single resolved parameter set. This crate owns the parts of that
//! machinery that are identical across modules:
//!
//! - [`locate_region`] - find the bracketing region pair for a trigger
//! - [`TuningTree`] - fixed-capacity per-frame node arena
//! - [`NodeOperation`] - per-level child search table entry
//! - [`select_regions`] - the shared per-axis child selection routine
//! - [`LedPolicy`] - the LED axis's special-case selection
//! - [`classify_ratio`] - the ratio state machine shared by every
//!   module's blend function
//!
//! Modules supply their chromatix types, a tagged node-data enum, one
//! thin search function per level, and the leaf blend.
//!
//! # Resource model
//!
//! A tree lives for exactly one `run_interpolation` call. Capacities
//! are compile-time constants per module (tree shape never varies at
//! runtime); the arena is allocated in one shot and never grows. No
//! state is shared between calls, so concurrent interpolation of
//! different modules needs no locking.
//!
//! # Dependencies
//!
//! - [`iq_core`] - Trigger regions and lookup results
//! - [`iq_math`] - Ratio math
//! - [`thiserror`] - Error handling
//! - [`tracing`] - Search diagnostics
//!
//! # Used By
//!
//! - `iq-modules` - Linearization34 and ANR10 instantiations

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod blend;
mod error;
mod lookup;
mod search;
mod tree;

pub use blend::{classify_ratio, BlendMode};
pub use error::{TreeError, TreeResult};
pub use lookup::locate_region;
pub use search::{select_regions, ChildEntry, ChildSelection, LedPolicy, NodeOperation, SearchChildNode};
pub use tree::TuningTree;

/// Maximum children one parent node can attach (LED's 3-way blend).
pub const MAX_CHILD_NODES: usize = 3;

/// Maximum interpolation weights per node.
pub const MAX_INTERPOLATION_ITEMS: usize = MAX_CHILD_NODES - 1;

/// Maximum regions along one trigger axis in any chromatix table.
pub const MAX_NUM_REGION: usize = 20;
