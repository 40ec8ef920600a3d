//! # Driftfield Core
//!
//! Per-particle simulation kernel for large particle fields pushed around by
//! a handful of moving capsule colliders inside a fixed box.
//!
//! ## Architecture Rules
//!
//! 1. **Pure per-particle step** - next state depends only on the particle's
//!    own previous state, the collider snapshot and the constants
//! 2. **No shared RNG** - every particle threads its own seed
//! 3. **Double-buffered ticks** - read one buffer, write the other, publish
//!
//! ## Example
//!
//! ```rust,ignore
//! use driftfield_core::{ColliderSet, DoubleBufferedStore, Particle, StepParams, Tuning};
//!
//! let particles = origins.iter().zip(seeds).map(|(o, s)| Particle::spawn(*o, s, 0.02)).collect();
//! let store = DoubleBufferedStore::new(particles)?;
//! let params = StepParams::new(Tuning::default(), 0.02);
//!
//! let report = store.advance(&colliders, &params)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod collider;
pub mod error;
pub mod kernel;
pub mod math;
pub mod particle;
pub mod prng;
pub mod respawn;
pub mod store;
pub mod tuning;

pub use collider::{CapsuleAxis, Collider, ColliderSet};
pub use error::{CoreError, CoreResult};
pub use kernel::{simulate, Motion};
pub use math::Vec3;
pub use particle::{Particle, FLAG_IDLE, FLAG_INTERACTED};
pub use prng::SeedStream;
pub use respawn::{step, StepOutcome, StepParams};
pub use store::{DoubleBufferedStore, StoreReadHandle, TickReport, BACK_BUFFER_WAIT};
pub use tuning::{Bounds, Tuning, DEFAULT_MAX_COLLIDERS};
