//! # Driftfield Headless Runner
//!
//! Runs the particle field without a renderer, driving it with five
//! capsules that sweep through the box like the fingers of a hand.
//!
//! ```bash
//! # Defaults: built-in config, 600 ticks
//! ./driftfield_headless
//!
//! # Custom config and tick count, per-tick logs
//! RUST_LOG=debug ./driftfield_headless driftfield.toml 3600
//! ```

use std::process::ExitCode;

use driftfield::core::Collider;
use driftfield::{DriftfieldError, Simulation, SimulationConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Host time advanced per tick.
const TICK_SECONDS: f32 = 1.0 / 60.0;

/// Ticks run when none are given.
const DEFAULT_TICKS: u64 = 600;

/// Fingers per hand.
const FINGERS: usize = 5;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "driftfield_headless failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), DriftfieldError> {
    let mut args = std::env::args().skip(1);

    let config = match args.next() {
        Some(path) => {
            info!(path = %path, "loading configuration");
            SimulationConfig::from_toml_file(&path)?
        }
        None => SimulationConfig::default(),
    };
    let ticks = match args.next() {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|e| DriftfieldError::InvalidConfig(format!("tick count {raw:?}: {e}")))?,
        None => DEFAULT_TICKS,
    };

    println!("═══════════════════════════════════════════════════════════════════");
    println!("                    DRIFTFIELD HEADLESS v{}", env!("CARGO_PKG_VERSION"));
    println!("═══════════════════════════════════════════════════════════════════");
    println!("  Particles:  {}", config.simulation.particle_count);
    println!("  Colliders:  {} of {} slots", FINGERS, config.simulation.max_colliders);
    println!("  Ticks:      {ticks}");
    println!();

    let mut sim = Simulation::new(config)?;
    let mut hand = Vec::with_capacity(FINGERS);

    for i in 0..ticks {
        let time = (i + 1) as f32 * TICK_SECONDS;
        hand_pose(time, &mut hand);
        let stats = sim.advance(time, &hand)?;

        if stats.report.tick % 60 == 0 {
            info!(
                tick = stats.report.tick,
                interacted = stats.report.interacted,
                respawned = stats.report.respawned,
                "progress"
            );
        }
    }

    let front = sim.read_handle();
    let non_finite = front.iter().filter(|p| !p.is_finite()).count();
    drop(front);

    sim.stats().print_summary();
    if non_finite > 0 {
        error!(non_finite, "particles left the finite range");
    }
    info!(ticks = sim.tick_count(), "run complete");
    Ok(())
}

/// Five capsules fanned out from a palm that orbits the box center.
fn hand_pose(time: f32, hand: &mut Vec<Collider>) {
    hand.clear();
    let palm = [2.5 * (time * 0.7).sin(), -1.2 + 0.4 * (time * 1.3).sin(), 0.8 * (time * 0.5).cos()];
    for finger in 0..FINGERS {
        let spread = (finger as f32 - 2.0) * 0.35;
        let curl = 0.2 * (time * 2.0 + finger as f32).sin();
        let base = [palm[0] + spread, palm[1], palm[2]];
        let tip = [palm[0] + spread * 1.4, palm[1] + 0.9 - curl, palm[2] + curl];
        hand.push(Collider::new(base, 0.14, tip, 0.1));
    }
}
