//! # Double-Buffered Particle Store
//!
//! ## Architecture
//!
//! ```text
//!                    ┌─────────────────────────────┐
//!                    │     DoubleBufferedStore     │
//!                    │                             │
//!                    │  ┌─────────┐  ┌─────────┐  │
//!                    │  │ Buffer A│  │ Buffer B│  │
//!                    │  └────┬────┘  └────┬────┘  │
//!                    │       │            │       │
//!                    │  ┌────┴────────────┴────┐  │
//!                    │  │ Atomic front (0/1)   │  │
//!                    │  └──────────────────────┘  │
//!                    └─────────────────────────────┘
//!                              │
//!              ┌───────────────┴───────────────┐
//!              ▼                               ▼
//!      ┌──────────────┐                ┌──────────────┐
//!      │   advance    │                │ ReadHandle   │
//!      │ front → back │                │ (front only) │
//!      └──────────────┘                └──────────────┘
//! ```
//!
//! ## Thread Safety
//!
//! - `advance`: one tick at a time (a second concurrent call is rejected)
//! - `read_handle`: shared access to the published buffer (many allowed)
//! - the front index flips only after every slot of the back buffer is
//!   written, so readers never see a partially updated tick
//!
//! A tick writes into the buffer that was published one tick earlier. If a
//! read handle on it is still alive after [`BACK_BUFFER_WAIT`], the tick is
//! abandoned with `CoreError::BufferBusy` and nothing is published.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{RwLock, RwLockReadGuard};
use rayon::prelude::*;

use crate::collider::{Collider, ColliderSet};
use crate::error::{CoreError, CoreResult};
use crate::particle::Particle;
use crate::respawn::{step, StepOutcome, StepParams};

/// How long a tick waits for readers to release the back buffer.
pub const BACK_BUFFER_WAIT: Duration = Duration::from_millis(250);

/// Counters for one completed tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tick number that produced this state (1 for the first tick).
    pub tick: u64,
    /// Number of particles evaluated.
    pub particles: usize,
    /// Particles reset to their origin this tick.
    pub respawned: usize,
    /// Particles carrying the interaction flag after the tick.
    pub interacted: usize,
}

impl TickReport {
    fn absorb(mut self, respawned: usize, interacted: usize) -> Self {
        self.respawned += respawned;
        self.interacted += interacted;
        self
    }
}

/// Two particle buffers and the index of the published one.
///
/// ## Usage
///
/// ```rust,ignore
/// let store = DoubleBufferedStore::new(particles)?;
///
/// loop {
///     colliders.replace(&tracked)?;
///     let report = store.advance(&colliders, &params)?;
///
///     let front = store.read_handle();
///     upload(front.as_bytes());
/// }
/// ```
pub struct DoubleBufferedStore {
    /// The two particle buffers.
    buffers: [RwLock<Box<[Particle]>>; 2],

    /// Index of the published buffer (0 or 1).
    /// The back buffer is always `front ^ 1`.
    front: AtomicUsize,

    /// Whether a tick is being computed.
    tick_in_flight: AtomicBool,

    /// Number of published ticks.
    tick_count: AtomicU64,

    /// Slots per buffer.
    len: usize,
}

impl DoubleBufferedStore {
    /// Creates a store with both buffers holding `particles`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::EmptyStore` if `particles` is empty.
    pub fn new(particles: Vec<Particle>) -> CoreResult<Arc<Self>> {
        if particles.is_empty() {
            return Err(CoreError::EmptyStore);
        }
        let len = particles.len();
        let front = particles.into_boxed_slice();
        let back = front.clone();

        Ok(Arc::new(Self {
            buffers: [RwLock::new(front), RwLock::new(back)],
            front: AtomicUsize::new(0),
            tick_in_flight: AtomicBool::new(false),
            tick_count: AtomicU64::new(0),
            len,
        }))
    }

    /// Number of particles.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; a store holds at least one particle.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of published ticks.
    #[inline]
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    /// Returns whether a tick is being computed.
    #[inline]
    #[must_use]
    pub fn is_tick_in_flight(&self) -> bool {
        self.tick_in_flight.load(Ordering::Acquire)
    }

    /// Index of the published buffer (for debugging).
    #[inline]
    #[must_use]
    pub fn front_index(&self) -> usize {
        self.front.load(Ordering::Acquire)
    }

    /// Shared access to the published buffer.
    #[must_use]
    pub fn read_handle(&self) -> StoreReadHandle<'_> {
        let index = self.front.load(Ordering::Acquire);
        StoreReadHandle {
            guard: self.buffers[index].read(),
            buffer_index: index,
        }
    }

    /// Copies the published buffer.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Particle> {
        self.read_handle().to_vec()
    }

    /// Runs one tick across all available lanes and publishes it.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::TickInFlight` if another tick is running, or
    /// `CoreError::BufferBusy` if a read handle keeps the back buffer locked.
    pub fn advance(&self, colliders: &ColliderSet, params: &StepParams) -> CoreResult<TickReport> {
        self.run_tick(colliders.as_slice(), params, step_parallel)
    }

    /// Runs one tick on the calling thread only.
    ///
    /// Produces bit-identical results to [`advance`](Self::advance).
    ///
    /// # Errors
    ///
    /// Same as [`advance`](Self::advance).
    pub fn advance_serial(
        &self,
        colliders: &ColliderSet,
        params: &StepParams,
    ) -> CoreResult<TickReport> {
        self.run_tick(colliders.as_slice(), params, step_serial)
    }

    fn run_tick(
        &self,
        colliders: &[Collider],
        params: &StepParams,
        lanes: fn(&[Particle], &mut [Particle], &[Collider], &StepParams) -> TickReport,
    ) -> CoreResult<TickReport> {
        if self.tick_in_flight.swap(true, Ordering::AcqRel) {
            return Err(CoreError::TickInFlight);
        }
        let _in_flight = InFlight(&self.tick_in_flight);

        let front = self.front.load(Ordering::Acquire);
        let back = front ^ 1;

        let mut report = {
            let Some(mut dst) = self.buffers[back].try_write_for(BACK_BUFFER_WAIT) else {
                return Err(CoreError::BufferBusy);
            };
            let src = self.buffers[front].read();
            lanes(&src, &mut dst, colliders, params)
        };

        // Publish.
        self.front.store(back, Ordering::Release);
        report.tick = self.tick_count.fetch_add(1, Ordering::Relaxed) + 1;
        report.particles = self.len;
        Ok(report)
    }
}

/// Clears the in-flight flag when the tick ends, including by unwinding.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[inline]
fn counts(next: &Particle, outcome: StepOutcome) -> (usize, usize) {
    (
        usize::from(outcome == StepOutcome::Respawned),
        usize::from(next.is_interacted()),
    )
}

fn step_parallel(
    src: &[Particle],
    dst: &mut [Particle],
    colliders: &[Collider],
    params: &StepParams,
) -> TickReport {
    let (respawned, interacted) = dst
        .par_iter_mut()
        .zip(src.par_iter())
        .map(|(out, prev)| {
            let (next, outcome) = step(prev, colliders, params);
            *out = next;
            counts(&next, outcome)
        })
        .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1));

    TickReport::default().absorb(respawned, interacted)
}

fn step_serial(
    src: &[Particle],
    dst: &mut [Particle],
    colliders: &[Collider],
    params: &StepParams,
) -> TickReport {
    dst.iter_mut()
        .zip(src.iter())
        .fold(TickReport::default(), |report, (out, prev)| {
            let (next, outcome) = step(prev, colliders, params);
            *out = next;
            let (respawned, interacted) = counts(&next, outcome);
            report.absorb(respawned, interacted)
        })
}

/// Read handle for the published buffer.
///
/// Multiple read handles can exist simultaneously.
///
/// ## Usage
///
/// ```rust,ignore
/// let read = store.read_handle();
/// for p in read.iter() {
///     draw_point(p.position);
/// }
/// ```
pub struct StoreReadHandle<'a> {
    guard: RwLockReadGuard<'a, Box<[Particle]>>,
    buffer_index: usize,
}

impl StoreReadHandle<'_> {
    /// Returns the buffer index this handle reads from (for debugging).
    #[inline]
    #[must_use]
    pub fn buffer_index(&self) -> usize {
        self.buffer_index
    }

    /// The buffer as raw bytes, ready for upload.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        let particles: &[Particle] = &self.guard;
        bytemuck::cast_slice(particles)
    }
}

impl Deref for StoreReadHandle<'_> {
    type Target = [Particle];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}
