//! # End-to-End Simulation Runs
//!
//! Drives a full `Simulation` from TOML through many ticks:
//!
//! 1. **Reproducibility**: same config, same bytes after N ticks
//! 2. **Interaction**: a capsule through the field flags particles
//! 3. **Concurrent readers**: a reader thread never sees a torn buffer
//!
//! Run with: cargo test --package driftfield --test simulation_run

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use driftfield::core::{Collider, Particle};
use driftfield::{Simulation, SimulationConfig};

const CONFIG: &str = r#"
[simulation]
particle_count = 4096
max_colliders = 4
vel_random_scaling = 0.02
seed = 7

[spawn]
layout = "scatter"
fill = 0.8
"#;

fn sweep(time: f32) -> [Collider; 1] {
    let x = 3.0 * time.sin();
    [Collider::new([x, -1.5, 0.0], 0.6, [x, 1.5, 0.0], 0.6)]
}

fn run(ticks: u32) -> Vec<Particle> {
    let mut sim = Simulation::new(SimulationConfig::from_toml_str(CONFIG).unwrap()).unwrap();
    for i in 1..=ticks {
        let t = i as f32 / 60.0;
        sim.advance(t, &sweep(t)).unwrap();
    }
    let field = sim.read_handle().to_vec();
    field
}

#[test]
fn same_config_reproduces_field() {
    let a = run(120);
    let b = run(120);
    assert_eq!(
        bytemuck::cast_slice::<Particle, u8>(&a),
        bytemuck::cast_slice::<Particle, u8>(&b)
    );
}

#[test]
fn sweeping_capsule_flags_particles() {
    let mut sim = Simulation::new(SimulationConfig::from_toml_str(CONFIG).unwrap()).unwrap();

    let idle = sim.advance(0.0, &[]).unwrap();
    assert_eq!(idle.report.interacted, 0);

    let mut peak = 0;
    for i in 1..=60 {
        let t = i as f32 / 60.0;
        peak = peak.max(sim.advance(t, &sweep(t)).unwrap().report.interacted);
    }
    assert!(peak > 0, "capsule never touched the field");
    assert_eq!(sim.stats().peak_interacted, peak);

    let front = sim.read_handle();
    assert!(front.iter().all(Particle::is_finite));
    assert!(front.iter().all(|p| p.position[3] == 0.0 || p.position[3] == 1.0));
}

#[test]
fn reader_thread_sees_whole_ticks() {
    let mut sim = Simulation::new(SimulationConfig::from_toml_str(CONFIG).unwrap()).unwrap();
    let store = sim.store_handle();
    let done = Arc::new(AtomicBool::new(false));

    let reader = {
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut reads = 0u64;
            while !done.load(Ordering::Acquire) {
                let front = store.read_handle();
                assert_eq!(front.len(), 4096);
                assert!(front.iter().all(Particle::is_finite));
                reads += 1;
            }
            reads
        })
    };

    for i in 1..=100 {
        let t = i as f32 / 60.0;
        sim.advance(t, &sweep(t)).unwrap();
    }
    done.store(true, Ordering::Release);

    let reads = reader.join().unwrap();
    assert!(reads > 0);
    assert_eq!(sim.tick_count(), 100);
}

#[test]
fn clock_delta_reaches_uniforms() {
    let mut sim = Simulation::new(SimulationConfig::from_toml_str(CONFIG).unwrap()).unwrap();
    sim.advance(1.0, &[]).unwrap();
    assert_eq!(sim.uniforms().time_delta, 0.0);

    sim.advance(1.5, &[]).unwrap();
    let u = sim.uniforms();
    assert_eq!(u.time, 1.5);
    assert_eq!(u.time_delta, -0.5);
    assert_eq!(u.collider_bases.len(), 4);
}
