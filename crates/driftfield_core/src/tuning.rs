//! # Tuning Constants
//!
//! Every magic number of the update rule lives here under a name. The
//! defaults are the reference values; changing them changes the look of the
//! simulation, not its structure.

/// Boundary half-extent on X.
pub const BOUNDS_HALF_X: f32 = 5.2;
/// Boundary half-extent on Y.
pub const BOUNDS_HALF_Y: f32 = 2.0;
/// Boundary half-extent on Z.
pub const BOUNDS_HALF_Z: f32 = 2.56;

/// Velocity multiplier applied to flagged particles each tick.
pub const DRAG: f32 = 0.95;
/// Strength of the pull back toward the origin for flagged particles.
pub const HOMING_STRENGTH: f32 = 0.0005;
/// Fraction of a collision push added to velocity.
pub const COLLISION_KICK: f32 = 0.1;
/// Tangential velocity added inside a collider's force-field band.
pub const SWIRL_STRENGTH: f32 = 0.0007;
/// Respawn threshold for particles that have interacted.
pub const RESET_RATE_INTERACTED: f32 = 0.998;
/// Respawn threshold for idle particles.
pub const RESET_RATE_IDLE: f32 = 0.97;

/// Default number of collider slots.
pub const DEFAULT_MAX_COLLIDERS: usize = 8;

/// Axis-aligned box centered on the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// Half-extents (x, y, z). The box spans `[-h, h]` on each axis.
    pub half_extents: [f32; 3],
}

impl Bounds {
    /// Creates a box from half-extents.
    #[must_use]
    pub const fn new(half_x: f32, half_y: f32, half_z: f32) -> Self {
        Self {
            half_extents: [half_x, half_y, half_z],
        }
    }

    /// Whether a point lies inside or on the box.
    #[must_use]
    pub fn contains(&self, p: [f32; 3]) -> bool {
        p.iter()
            .zip(self.half_extents.iter())
            .all(|(&c, &h)| (-h..=h).contains(&c))
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(BOUNDS_HALF_X, BOUNDS_HALF_Y, BOUNDS_HALF_Z)
    }
}

/// All tuning parameters of the kernel and respawn policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tuning {
    /// Reflection box.
    pub bounds: Bounds,
    /// See [`DRAG`].
    pub drag: f32,
    /// See [`HOMING_STRENGTH`].
    pub homing_strength: f32,
    /// See [`COLLISION_KICK`].
    pub collision_kick: f32,
    /// See [`SWIRL_STRENGTH`].
    pub swirl_strength: f32,
    /// See [`RESET_RATE_INTERACTED`].
    pub reset_rate_interacted: f32,
    /// See [`RESET_RATE_IDLE`].
    pub reset_rate_idle: f32,
}

impl Tuning {
    /// Respawn threshold for a particle with the given interaction flag.
    #[inline]
    #[must_use]
    pub fn reset_rate(&self, interacted: bool) -> f32 {
        if interacted {
            self.reset_rate_interacted
        } else {
            self.reset_rate_idle
        }
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            bounds: Bounds::default(),
            drag: DRAG,
            homing_strength: HOMING_STRENGTH,
            collision_kick: COLLISION_KICK,
            swirl_strength: SWIRL_STRENGTH,
            reset_rate_interacted: RESET_RATE_INTERACTED,
            reset_rate_idle: RESET_RATE_IDLE,
        }
    }
}
