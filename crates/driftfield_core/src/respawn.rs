//! # Respawn Policy
//!
//! Top-level per-particle step. One draw decides whether the particle is
//! reset to its origin or handed to the update kernel:
//!
//! ```text
//! reset_rate = flagged ? 0.998 : 0.97
//! roll > reset_rate  →  position = origin, flag = 0, velocity = 3 draws
//! otherwise          →  kernel
//! ```
//!
//! Idle particles turn over at roughly 3% per tick; particles that have been
//! pushed around linger (~0.2%) so their way home stays visible.

use crate::collider::Collider;
use crate::kernel::simulate;
use crate::particle::{random_velocity, Particle, FLAG_IDLE};
use crate::prng::SeedStream;
use crate::tuning::Tuning;

/// Parameters shared by every particle for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepParams {
    /// Kernel and respawn constants.
    pub tuning: Tuning,
    /// Width of the respawn velocity range (each axis in `[-s/2, s/2]`).
    pub vel_random_scaling: f32,
}

impl StepParams {
    /// Creates step parameters.
    #[must_use]
    pub const fn new(tuning: Tuning, vel_random_scaling: f32) -> Self {
        Self {
            tuning,
            vel_random_scaling,
        }
    }
}

/// What happened to a particle during one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Reset to its origin with a fresh velocity.
    Respawned,
    /// Advanced by the update kernel.
    Simulated,
}

/// Advances one particle by one tick.
///
/// Draw order: respawn roll, then (on reset only) velocity x, y, z.
#[must_use]
pub fn step(prev: &Particle, colliders: &[Collider], params: &StepParams) -> (Particle, StepOutcome) {
    let mut next = *prev;
    let mut stream = SeedStream::new(&mut next.random_seed);

    let reset_rate = params.tuning.reset_rate(prev.is_interacted());
    if stream.next_f32() > reset_rate {
        next.position = prev.origin_xyz().with_w(FLAG_IDLE);
        next.velocity = random_velocity(&mut stream, params.vel_random_scaling);
        return (next, StepOutcome::Respawned);
    }

    let motion = simulate(prev, colliders, &params.tuning);
    next.position = motion.position;
    next.velocity = motion.velocity;
    (next, StepOutcome::Simulated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prng;

    fn params() -> StepParams {
        StepParams::new(Tuning::default(), 0.02)
    }

    /// Finds a seed whose first draw lands on the requested side of `rate`.
    fn seed_where(rate: f32, above: bool) -> u32 {
        (0u32..)
            .find(|&s| (prng::next(s).0 > rate) == above)
            .unwrap()
    }

    #[test]
    fn test_reset_draws_four_values() {
        let seed = seed_where(0.97, true);
        let mut p = Particle::spawn([0.5, 0.5, 0.5], 0, 0.02);
        p.random_seed = seed;
        p.position = [1.0, 1.0, 1.0, 0.0];

        let (next, outcome) = step(&p, &[], &params());
        assert_eq!(outcome, StepOutcome::Respawned);
        assert_eq!(next.position, [0.5, 0.5, 0.5, 0.0]);
        assert_eq!(next.origin, p.origin);

        let (_, s1) = prng::next(seed);
        let (vx, s2) = prng::next(s1);
        let (vy, s3) = prng::next(s2);
        let (vz, s4) = prng::next(s3);
        assert_eq!(next.random_seed, s4);
        assert_eq!(
            next.velocity,
            [(vx - 0.5) * 0.02, (vy - 0.5) * 0.02, (vz - 0.5) * 0.02, 0.0]
        );
    }

    #[test]
    fn test_simulate_draws_one_value() {
        let seed = seed_where(0.97, false);
        let mut p = Particle::spawn([0.0; 3], 0, 0.02);
        p.random_seed = seed;

        let (next, outcome) = step(&p, &[], &params());
        assert_eq!(outcome, StepOutcome::Simulated);
        assert_eq!(next.random_seed, prng::next(seed).1);
        assert_eq!(next.origin, p.origin);
    }

    #[test]
    fn test_respawn_clears_flag() {
        let seed = seed_where(0.998, true);
        let mut p = Particle::spawn([0.0; 3], 0, 0.02);
        p.random_seed = seed;
        p.position = [0.3, 0.3, 0.3, 1.0];

        let (next, outcome) = step(&p, &[], &params());
        assert_eq!(outcome, StepOutcome::Respawned);
        assert!(!next.is_interacted());
    }

    #[test]
    fn test_flagged_threshold_is_higher() {
        // A roll between the two thresholds respawns idle particles only.
        let seed = (0u32..)
            .find(|&s| {
                let v = prng::next(s).0;
                v > 0.97 && v <= 0.998
            })
            .unwrap();

        let mut idle = Particle::spawn([0.0; 3], 0, 0.02);
        idle.random_seed = seed;
        let mut flagged = idle;
        flagged.position[3] = 1.0;

        assert_eq!(step(&idle, &[], &params()).1, StepOutcome::Respawned);
        assert_eq!(step(&flagged, &[], &params()).1, StepOutcome::Simulated);
    }
}
