//! # Core Error Types
//!
//! The kernel itself cannot fail. These errors cover construction of the
//! collider set and the particle store.

use thiserror::Error;

/// Errors raised by the simulation core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A collider snapshot does not fit in the configured slots.
    #[error("too many colliders: capacity {capacity}, got {requested}")]
    TooManyColliders {
        /// Configured number of collider slots.
        capacity: usize,
        /// Number of colliders supplied.
        requested: usize,
    },

    /// A store was created without particles.
    #[error("particle store must hold at least one particle")]
    EmptyStore,

    /// `advance` was called while another tick was still being computed.
    #[error("a tick is already in flight")]
    TickInFlight,

    /// A read handle kept the back buffer locked; the tick was not run.
    #[error("back buffer is still locked by a reader")]
    BufferBusy,

    /// A construction parameter is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
