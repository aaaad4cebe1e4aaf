//! Tree error types.

use thiserror::Error;

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

/// Errors that can occur while building or walking a tuning tree.
#[derive(Debug, Error)]
pub enum TreeError {
    /// Interpolation ratio is NaN or outside `[0, 1]`.
    ///
    /// The only hard error inside the engine; everything else degrades
    /// to a defined fallback value.
    #[error("interpolation ratio {0} outside [0, 1]")]
    InvalidRatio(f32),

    /// A node's data slot was read before anything resolved into it.
    #[error("node data slot unresolved during tree walk")]
    UnresolvedData,

    /// A level search produced more children than the node pool holds.
    #[error("node pool exhausted at {got} nodes (capacity {capacity})")]
    NodePoolExhausted {
        /// Nodes the build tried to allocate.
        got: usize,
        /// Fixed pool capacity.
        capacity: usize,
    },
}
