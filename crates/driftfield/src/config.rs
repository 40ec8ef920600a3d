//! # Simulation Configuration
//!
//! Loaded once at startup from TOML. Every section is optional; missing
//! values fall back to the reference tuning.
//!
//! ```toml
//! [simulation]
//! particle_count = 200000
//! max_colliders = 8
//! vel_random_scaling = 0.02
//! seed = 42
//!
//! [spawn]
//! layout = "scatter"
//! fill = 0.9
//!
//! [tuning]
//! half_extents = [5.2, 2.0, 2.56]
//! drag = 0.95
//! homing_strength = 0.0005
//! collision_kick = 0.1
//! swirl_strength = 0.0007
//! reset_rate_interacted = 0.998
//! reset_rate_idle = 0.97
//! ```

use std::path::Path;

use driftfield_core::{tuning, Bounds, StepParams, Tuning, DEFAULT_MAX_COLLIDERS};
use serde::{Deserialize, Serialize};

use crate::error::{DriftfieldError, Result};

/// Default number of particles.
pub const DEFAULT_PARTICLE_COUNT: usize = 100_000;
/// Default width of the respawn velocity range.
pub const DEFAULT_VEL_RANDOM_SCALING: f32 = 0.02;
/// Default master seed for the initial population.
pub const DEFAULT_SEED: u64 = 0x5EED;

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Population and collider capacity.
    pub simulation: PopulationConfig,
    /// Initial origin layout.
    pub spawn: SpawnConfig,
    /// Kernel constants.
    pub tuning: TuningConfig,
}

/// Population parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Number of particles (fixed for the lifetime of the simulation).
    pub particle_count: usize,
    /// Number of collider slots.
    pub max_colliders: usize,
    /// Width of the respawn velocity range.
    pub vel_random_scaling: f32,
    /// Master seed for origins and per-particle seeds.
    pub seed: u64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            max_colliders: DEFAULT_MAX_COLLIDERS,
            vel_random_scaling: DEFAULT_VEL_RANDOM_SCALING,
            seed: DEFAULT_SEED,
        }
    }
}

/// How origins are placed at startup.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginLayout {
    /// Uniformly inside the box, shrunk by `fill`.
    Scatter,
    /// Regular grid on the plane `z = 0`, shrunk by `fill`.
    Sheet,
}

/// Origin placement parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Layout of the origins.
    pub layout: OriginLayout,
    /// Fraction of the box the origins may occupy, in `(0, 1]`.
    pub fill: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            layout: OriginLayout::Scatter,
            fill: 1.0,
        }
    }
}

/// Serializable mirror of [`Tuning`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    /// Box half-extents (x, y, z).
    pub half_extents: [f32; 3],
    /// Drag for flagged particles.
    pub drag: f32,
    /// Pull toward the origin for flagged particles.
    pub homing_strength: f32,
    /// Share of a collision push added to velocity.
    pub collision_kick: f32,
    /// Tangential force-field strength.
    pub swirl_strength: f32,
    /// Respawn threshold for flagged particles.
    pub reset_rate_interacted: f32,
    /// Respawn threshold for idle particles.
    pub reset_rate_idle: f32,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            half_extents: [
                tuning::BOUNDS_HALF_X,
                tuning::BOUNDS_HALF_Y,
                tuning::BOUNDS_HALF_Z,
            ],
            drag: tuning::DRAG,
            homing_strength: tuning::HOMING_STRENGTH,
            collision_kick: tuning::COLLISION_KICK,
            swirl_strength: tuning::SWIRL_STRENGTH,
            reset_rate_interacted: tuning::RESET_RATE_INTERACTED,
            reset_rate_idle: tuning::RESET_RATE_IDLE,
        }
    }
}

impl From<&TuningConfig> for Tuning {
    fn from(c: &TuningConfig) -> Self {
        Self {
            bounds: Bounds {
                half_extents: c.half_extents,
            },
            drag: c.drag,
            homing_strength: c.homing_strength,
            collision_kick: c.collision_kick,
            swirl_strength: c.swirl_strength,
            reset_rate_interacted: c.reset_rate_interacted,
            reset_rate_idle: c.reset_rate_idle,
        }
    }
}

impl SimulationConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Fails on malformed TOML or out-of-range values.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or its contents are invalid.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Kernel constants.
    #[must_use]
    pub fn tuning(&self) -> Tuning {
        Tuning::from(&self.tuning)
    }

    /// Per-tick parameters derived from this configuration.
    #[must_use]
    pub fn step_params(&self) -> StepParams {
        StepParams::new(self.tuning(), self.simulation.vel_random_scaling)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns `DriftfieldError::InvalidConfig` naming the first bad value.
    pub fn validate(&self) -> Result<()> {
        let sim = &self.simulation;
        if sim.particle_count == 0 {
            return Err(invalid("simulation.particle_count must be greater than zero"));
        }
        if sim.max_colliders == 0 {
            return Err(invalid("simulation.max_colliders must be greater than zero"));
        }
        if !sim.vel_random_scaling.is_finite() || sim.vel_random_scaling < 0.0 {
            return Err(invalid("simulation.vel_random_scaling must be finite and >= 0"));
        }
        if !(self.spawn.fill > 0.0 && self.spawn.fill <= 1.0) {
            return Err(invalid("spawn.fill must be in (0, 1]"));
        }

        let t = &self.tuning;
        if t.half_extents.iter().any(|h| !h.is_finite() || *h <= 0.0) {
            return Err(invalid("tuning.half_extents must be finite and > 0"));
        }
        let factors = [
            ("drag", t.drag),
            ("homing_strength", t.homing_strength),
            ("collision_kick", t.collision_kick),
            ("swirl_strength", t.swirl_strength),
        ];
        for (name, value) in factors {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(&format!("tuning.{name} must be finite and >= 0")));
            }
        }
        for (name, value) in [
            ("reset_rate_interacted", t.reset_rate_interacted),
            ("reset_rate_idle", t.reset_rate_idle),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(&format!("tuning.{name} must be in [0, 1]")));
            }
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> DriftfieldError {
    DriftfieldError::InvalidConfig(msg.to_string())
}
