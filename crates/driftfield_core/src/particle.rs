//! # Particle Record
//!
//! One particle is four 16-byte rows, laid out for direct upload:
//!
//! ```text
//! ┌──────────────┬────────────────────────────────┐
//! │ position     │ x, y, z, interaction flag      │
//! │ velocity     │ x, y, z, 0                     │
//! │ origin       │ x, y, z, (unused)              │
//! │ seed         │ random_seed, pad, pad, pad     │
//! └──────────────┴────────────────────────────────┘
//! ```

use bytemuck::{Pod, Zeroable};

use crate::math::Vec3;
use crate::prng::SeedStream;

/// Flag value of a particle that has not collided since its last respawn.
pub const FLAG_IDLE: f32 = 0.0;
/// Flag value of a particle that has collided and is being pulled home.
pub const FLAG_INTERACTED: f32 = 1.0;

/// A single simulated particle.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Particle {
    /// Position (xyz) + interaction flag (w, 0 or 1).
    pub position: [f32; 4],
    /// Velocity (xyz), w always 0.
    pub velocity: [f32; 4],
    /// Anchor point the particle respawns at and is pulled back to.
    pub origin: [f32; 4],
    /// Private PRNG state.
    pub random_seed: u32,
    /// Padding to a 16-byte multiple.
    pub _padding: [u32; 3],
}

impl Particle {
    /// Size of a particle in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Spawns a particle at `origin` with an idle flag.
    ///
    /// The initial velocity comes from the particle's own stream, drawn the
    /// same way a respawn draws it (x, then y, then z), so a fresh particle
    /// is indistinguishable from a respawned one.
    #[must_use]
    pub fn spawn(origin: [f32; 3], seed: u32, vel_random_scaling: f32) -> Self {
        let mut particle = Self {
            position: [origin[0], origin[1], origin[2], FLAG_IDLE],
            velocity: [0.0; 4],
            origin: [origin[0], origin[1], origin[2], 0.0],
            random_seed: seed,
            _padding: [0; 3],
        };
        let mut stream = SeedStream::new(&mut particle.random_seed);
        particle.velocity = random_velocity(&mut stream, vel_random_scaling);
        particle
    }

    /// Whether the particle has collided since its last respawn.
    #[inline]
    #[must_use]
    pub fn is_interacted(&self) -> bool {
        self.position[3] == FLAG_INTERACTED
    }

    /// Position without the flag.
    #[inline]
    #[must_use]
    pub const fn position_xyz(&self) -> Vec3 {
        Vec3::from_xyz(self.position)
    }

    /// Velocity without the padding lane.
    #[inline]
    #[must_use]
    pub const fn velocity_xyz(&self) -> Vec3 {
        Vec3::from_xyz(self.velocity)
    }

    /// Anchor point.
    #[inline]
    #[must_use]
    pub const fn origin_xyz(&self) -> Vec3 {
        Vec3::from_xyz(self.origin)
    }

    /// Whether position and velocity are finite.
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.iter().chain(self.velocity.iter()).all(|c| c.is_finite())
    }
}

/// Three centered draws in x, y, z order, packed with `w = 0`.
#[inline]
pub fn random_velocity(stream: &mut SeedStream<'_>, scale: f32) -> [f32; 4] {
    let x = stream.next_centered(scale);
    let y = stream.next_centered(scale);
    let z = stream.next_centered(scale);
    [x, y, z, 0.0]
}
