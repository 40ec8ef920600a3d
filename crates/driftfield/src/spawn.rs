//! # Initial Population
//!
//! Builds the starting particles from a master seed. Origins and per-particle
//! seeds come from a `ChaCha8Rng`, so one `u64` reproduces the whole field on
//! every platform. After this point each particle only uses its own LCG.

use driftfield_core::{Bounds, Particle};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::{OriginLayout, SimulationConfig};

/// Scatters `count` origins over the box and spawns a particle at each.
#[must_use]
pub fn populate(config: &SimulationConfig) -> Vec<Particle> {
    let sim = &config.simulation;
    let bounds = config.tuning().bounds;
    let mut rng = ChaCha8Rng::seed_from_u64(sim.seed);

    let origins = match config.spawn.layout {
        OriginLayout::Scatter => scatter(&mut rng, &bounds, config.spawn.fill, sim.particle_count),
        OriginLayout::Sheet => sheet(&bounds, config.spawn.fill, sim.particle_count),
    };

    origins
        .into_iter()
        .map(|origin| Particle::spawn(origin, rng.next_u32(), sim.vel_random_scaling))
        .collect()
}

/// Uniform origins inside the box scaled by `fill`.
fn scatter(rng: &mut ChaCha8Rng, bounds: &Bounds, fill: f32, count: usize) -> Vec<[f32; 3]> {
    let [hx, hy, hz] = bounds.half_extents.map(|h| h * fill);
    (0..count)
        .map(|_| {
            [
                rng.gen_range(-hx..=hx),
                rng.gen_range(-hy..=hy),
                rng.gen_range(-hz..=hz),
            ]
        })
        .collect()
}

/// Row-major grid on `z = 0`, as square as the box aspect allows.
fn sheet(bounds: &Bounds, fill: f32, count: usize) -> Vec<[f32; 3]> {
    let [hx, hy, _] = bounds.half_extents.map(|h| h * fill);
    let aspect = hx / hy;
    let columns = ((count as f32 * aspect).sqrt().ceil() as usize).clamp(1, count.max(1));
    let rows = count.div_ceil(columns).max(1);

    let axis = |i: usize, n: usize, half: f32| {
        if n == 1 {
            0.0
        } else {
            -half + 2.0 * half * i as f32 / (n - 1) as f32
        }
    };

    (0..count)
        .map(|i| [axis(i % columns, columns, hx), axis(i / columns, rows, hy), 0.0])
        .collect()
}
