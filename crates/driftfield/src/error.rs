//! # Host Error Types
//!
//! Everything that can go wrong while setting up or feeding a simulation.
//! Failures surface once at construction; a running tick cannot fail except
//! by misuse (overlapping ticks, oversized collider snapshots).

use driftfield_core::CoreError;
use thiserror::Error;

/// Errors raised by the host layer.
#[derive(Error, Debug)]
pub enum DriftfieldError {
    /// Propagated from the simulation core.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The configuration file is not valid TOML or has the wrong shape.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Reading a configuration file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for host operations.
pub type Result<T> = std::result::Result<T, DriftfieldError>;
