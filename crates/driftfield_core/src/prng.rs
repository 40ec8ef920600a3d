//! # Per-Particle Pseudorandom Stream
//!
//! Linear congruential generator with the classic MSVC constants.
//!
//! ```text
//! seed' = seed * 214013 + 2531011   (mod 2^32)
//! value = ((seed' >> 16) & 0x7FFF) / 32767
//! ```
//!
//! There is no global generator. Every particle carries its own seed and the
//! stream is threaded through each tick, so particles can be updated on any
//! number of lanes without synchronization and runs are reproducible.
//!
//! Draw order inside one tick is part of the contract:
//!
//! 1. respawn decision
//! 2. on reset only: velocity x, then y, then z

/// LCG multiplier.
pub const LCG_MULTIPLIER: u32 = 214_013;
/// LCG increment.
pub const LCG_INCREMENT: u32 = 2_531_011;
/// Mask for the 15 output bits (bits 16..=30 of the new seed).
pub const OUTPUT_MASK: u32 = 0x7FFF;
/// Divisor mapping the 15 output bits to a float.
pub const OUTPUT_SCALE: f32 = 32767.0;

/// Advances `seed` once and returns `(value, new_seed)`.
///
/// `value` lies in `[0, 1]`; the upper bound is reached only when all
/// fifteen output bits are set.
#[inline]
#[must_use]
pub fn next(seed: u32) -> (f32, u32) {
    let new_seed = seed.wrapping_mul(LCG_MULTIPLIER).wrapping_add(LCG_INCREMENT);
    let bits = (new_seed >> 16) & OUTPUT_MASK;
    (bits as f32 / OUTPUT_SCALE, new_seed)
}

/// Mutable view over one particle's seed.
///
/// Wraps the seed for the duration of a step and counts draws so tests can
/// pin the draw order.
#[derive(Debug)]
pub struct SeedStream<'a> {
    seed: &'a mut u32,
    draws: u32,
}

impl<'a> SeedStream<'a> {
    /// Borrows a particle's seed.
    #[inline]
    pub fn new(seed: &'a mut u32) -> Self {
        Self { seed, draws: 0 }
    }

    /// Draws the next value and advances the seed in place.
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        let (value, new_seed) = next(*self.seed);
        *self.seed = new_seed;
        self.draws += 1;
        value
    }

    /// Draws a value mapped to `[-0.5, 0.5] * scale`.
    #[inline]
    pub fn next_centered(&mut self, scale: f32) -> f32 {
        (self.next_f32() - 0.5) * scale
    }

    /// Number of values drawn through this view.
    #[inline]
    #[must_use]
    pub fn draws(&self) -> u32 {
        self.draws
    }

    /// Current seed value.
    #[inline]
    #[must_use]
    pub fn seed(&self) -> u32 {
        *self.seed
    }
}
