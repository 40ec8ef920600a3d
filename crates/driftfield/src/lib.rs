//! # Driftfield
//!
//! Host layer around the particle kernel: configuration, initial
//! population, host clock and the per-tick driver.
//!
//! ## Modules
//!
//! - `config`: TOML configuration and validation
//! - `clock`: host time and signed delta
//! - `spawn`: deterministic initial population
//! - `simulation`: tick orchestration and statistics
//!
//! ## Example
//!
//! ```rust,ignore
//! use driftfield::{Simulation, SimulationConfig};
//!
//! let mut sim = Simulation::new(SimulationConfig::from_toml_file("driftfield.toml")?)?;
//! loop {
//!     let stats = sim.advance(now_seconds(), &hand_capsules())?;
//!     upload(sim.read_handle().as_bytes(), &sim.uniforms());
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod clock;
pub mod config;
pub mod error;
pub mod simulation;
pub mod spawn;

pub use driftfield_core as core;

pub use clock::TickClock;
pub use config::{OriginLayout, PopulationConfig, SimulationConfig, SpawnConfig, TuningConfig};
pub use error::{DriftfieldError, Result};
pub use simulation::{Simulation, TickStats, TickStatsAccumulator, TickUniforms};
pub use spawn::populate;
