//! # Simulation Driver
//!
//! Owns the particle store and everything a tick reads:
//! ```text
//! Tick N:
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. HOST INPUT                                                       │
//! │    ├─ set_colliders(..)  snapshot replaces the previous one         │
//! │    └─ set_time(t)        clock records t and previous - t           │
//! │                                                                     │
//! │ 2. ADVANCE                                                          │
//! │    ├─ every particle: respawn roll, then kernel                     │
//! │    └─ front/back swap, tick counter + 1                             │
//! │                                                                     │
//! │ 3. CONSUME                                                          │
//! │    └─ read_handle() hands the new front buffer to the renderer      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use driftfield_core::{
    Collider, ColliderSet, DoubleBufferedStore, StepParams, StoreReadHandle, TickReport,
};
use tracing::{debug, info, warn};

use crate::clock::TickClock;
use crate::config::SimulationConfig;
use crate::error::Result;
use crate::spawn;

/// Target tick time for 60 updates per second.
pub const TARGET_TICK_TIME: Duration = Duration::from_micros(16_666);

/// Tick time above which a warning is logged.
pub const MAX_TICK_TIME: Duration = Duration::from_millis(33);

/// Outcome and timing of one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Counters from the store.
    pub report: TickReport,
    /// Wall time spent advancing, in microseconds.
    pub duration_us: u64,
}

/// Values a renderer binds alongside the particle buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct TickUniforms {
    /// Last host time.
    pub time: f32,
    /// `previous - current` host time.
    pub time_delta: f32,
    /// Width of the respawn velocity range.
    pub vel_random_scaling: f32,
    /// Collider bases, padded with zeros to the slot count.
    pub collider_bases: Vec<[f32; 4]>,
    /// Collider tips, padded with zeros to the slot count.
    pub collider_tips: Vec<[f32; 4]>,
}

/// The simulation orchestrator.
pub struct Simulation {
    /// Double-buffered particle storage.
    store: Arc<DoubleBufferedStore>,
    /// Current collider snapshot.
    colliders: ColliderSet,
    /// Tuning and respawn scaling.
    params: StepParams,
    /// Host time.
    clock: TickClock,
    /// Configuration the simulation was built from.
    config: SimulationConfig,
    /// Accumulated tick statistics.
    stats_accumulator: TickStatsAccumulator,
}

impl Simulation {
    /// Builds the initial population and an empty collider set.
    ///
    /// # Errors
    ///
    /// Fails if the configuration does not validate.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let particles = spawn::populate(&config);
        let store = DoubleBufferedStore::new(particles)?;
        let colliders = ColliderSet::new(config.simulation.max_colliders)?;

        info!(
            particles = store.len(),
            max_colliders = colliders.capacity(),
            seed = config.simulation.seed,
            "simulation initialized"
        );

        Ok(Self {
            store,
            colliders,
            params: config.step_params(),
            clock: TickClock::new(),
            config,
            stats_accumulator: TickStatsAccumulator::new(),
        })
    }

    /// Records the host time for the next tick.
    pub fn set_time(&mut self, time: f32) {
        self.clock.set_time(time);
    }

    /// Replaces the collider snapshot.
    ///
    /// # Errors
    ///
    /// Fails if the snapshot exceeds the slot count; the previous snapshot
    /// stays in effect.
    pub fn set_colliders(&mut self, colliders: &[Collider]) -> Result<()> {
        if let Err(e) = self.colliders.replace(colliders) {
            warn!(error = %e, "collider snapshot rejected");
            return Err(e.into());
        }
        Ok(())
    }

    /// Advances every particle by one tick.
    ///
    /// # Errors
    ///
    /// Fails if another tick on the same store is still in flight, or if a
    /// reader keeps the back buffer locked.
    pub fn tick(&mut self) -> Result<TickStats> {
        let start = Instant::now();
        let report = self.store.advance(&self.colliders, &self.params)?;
        let elapsed = start.elapsed();

        let stats = TickStats {
            report,
            duration_us: elapsed.as_micros() as u64,
        };
        self.stats_accumulator.record(stats);

        debug!(
            tick = report.tick,
            respawned = report.respawned,
            interacted = report.interacted,
            colliders = self.colliders.len(),
            duration_us = stats.duration_us,
            "tick complete"
        );
        if elapsed > MAX_TICK_TIME {
            warn!(
                tick = report.tick,
                duration_ms = elapsed.as_secs_f64() * 1000.0,
                "tick exceeded budget"
            );
        }

        Ok(stats)
    }

    /// Sets colliders and time, then ticks.
    ///
    /// A rejected snapshot leaves the clock untouched.
    ///
    /// # Errors
    ///
    /// See [`Simulation::set_colliders`] and [`Simulation::tick`].
    pub fn advance(&mut self, time: f32, colliders: &[Collider]) -> Result<TickStats> {
        self.set_colliders(colliders)?;
        self.set_time(time);
        self.tick()
    }

    /// Read access to the current front buffer.
    #[must_use]
    pub fn read_handle(&self) -> StoreReadHandle<'_> {
        self.store.read_handle()
    }

    /// Shared handle to the store, for readers on other threads.
    #[must_use]
    pub fn store_handle(&self) -> Arc<DoubleBufferedStore> {
        Arc::clone(&self.store)
    }

    /// Values bound next to the particle buffer.
    #[must_use]
    pub fn uniforms(&self) -> TickUniforms {
        let (collider_bases, collider_tips) = self.colliders.uniform_arrays();
        TickUniforms {
            time: self.clock.time(),
            time_delta: self.clock.time_delta(),
            vel_random_scaling: self.params.vel_random_scaling,
            collider_bases,
            collider_tips,
        }
    }

    /// Number of completed ticks.
    #[inline]
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.store.tick_count()
    }

    /// Number of particles.
    #[inline]
    #[must_use]
    pub fn particle_count(&self) -> usize {
        self.store.len()
    }

    /// Current collider snapshot.
    #[must_use]
    pub fn colliders(&self) -> &ColliderSet {
        &self.colliders
    }

    /// Host clock.
    #[must_use]
    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    /// Configuration the simulation was built from.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Accumulated statistics.
    #[must_use]
    pub fn stats(&self) -> &TickStatsAccumulator {
        &self.stats_accumulator
    }
}

/// Accumulator for tick statistics.
#[derive(Clone, Debug)]
pub struct TickStatsAccumulator {
    /// Total ticks recorded.
    pub ticks_recorded: u64,
    /// Sum of tick times.
    pub total_us_sum: u64,
    /// Min tick time.
    pub min_tick_us: u64,
    /// Max tick time.
    pub max_tick_us: u64,
    /// Ticks that exceeded the target time.
    pub ticks_over_budget: u64,
    /// Sum of respawned particles.
    pub respawned_sum: u64,
    /// Sum of particle-ticks.
    pub particle_ticks: u64,
    /// Highest flagged count seen after a tick.
    pub peak_interacted: usize,
}

impl TickStatsAccumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ticks_recorded: 0,
            total_us_sum: 0,
            min_tick_us: u64::MAX,
            max_tick_us: 0,
            ticks_over_budget: 0,
            respawned_sum: 0,
            particle_ticks: 0,
            peak_interacted: 0,
        }
    }

    /// Records one tick.
    pub fn record(&mut self, stats: TickStats) {
        self.ticks_recorded += 1;
        self.total_us_sum += stats.duration_us;
        self.min_tick_us = self.min_tick_us.min(stats.duration_us);
        self.max_tick_us = self.max_tick_us.max(stats.duration_us);
        self.respawned_sum += stats.report.respawned as u64;
        self.particle_ticks += stats.report.particles as u64;
        self.peak_interacted = self.peak_interacted.max(stats.report.interacted);

        if stats.duration_us > TARGET_TICK_TIME.as_micros() as u64 {
            self.ticks_over_budget += 1;
        }
    }

    /// Average tick time in milliseconds.
    #[must_use]
    pub fn avg_tick_ms(&self) -> f64 {
        if self.ticks_recorded == 0 {
            return 0.0;
        }
        (self.total_us_sum as f64 / self.ticks_recorded as f64) / 1000.0
    }

    /// Fraction of particle-ticks that ended in a respawn.
    #[must_use]
    pub fn respawn_rate(&self) -> f64 {
        if self.particle_ticks == 0 {
            return 0.0;
        }
        self.respawned_sum as f64 / self.particle_ticks as f64
    }

    /// Fraction of ticks over the target time.
    #[must_use]
    pub fn over_budget_ratio(&self) -> f64 {
        if self.ticks_recorded == 0 {
            return 0.0;
        }
        self.ticks_over_budget as f64 / self.ticks_recorded as f64
    }

    /// Prints a summary of the statistics.
    pub fn print_summary(&self) {
        let min_us = if self.ticks_recorded == 0 { 0 } else { self.min_tick_us };
        println!("┌─ TICKS ──────────────────────────────────────────────────────────┐");
        println!("│ Ticks Recorded:     {}", self.ticks_recorded);
        println!("│ Average Tick:       {:.3} ms", self.avg_tick_ms());
        println!("│ Min Tick:           {:.3} ms", min_us as f64 / 1000.0);
        println!("│ Max Tick:           {:.3} ms", self.max_tick_us as f64 / 1000.0);
        println!(
            "│ Over Budget:        {} ticks ({:.1}%)",
            self.ticks_over_budget,
            self.over_budget_ratio() * 100.0
        );
        println!("└──────────────────────────────────────────────────────────────────┘");
        println!("┌─ PARTICLES ──────────────────────────────────────────────────────┐");
        println!("│ Respawned:          {}", self.respawned_sum);
        println!("│ Respawn Rate:       {:.3}%", self.respawn_rate() * 100.0);
        println!("│ Peak Interacted:    {}", self.peak_interacted);
        println!("└──────────────────────────────────────────────────────────────────┘");
    }
}

impl Default for TickStatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
