//! # Tick Clock
//!
//! Tracks the host-supplied time and the delta between consecutive updates.
//!
//! The delta is `previous - current`, so it is negative while time moves
//! forward, and it stays `0.0` until a non-zero time has been seen once.
//! The kernel never reads either value; they travel with the tick inputs
//! so a consumer that binds them (a shader uniform block, a recorder) sees
//! the same numbers the reference renderer produced.

/// Host time and signed delta.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickClock {
    time: f32,
    time_delta: f32,
}

impl TickClock {
    /// Creates a clock at time zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            time: 0.0,
            time_delta: 0.0,
        }
    }

    /// Records a new host time.
    pub fn set_time(&mut self, time: f32) {
        if self.time != 0.0 {
            self.time_delta = self.time - time;
        }
        self.time = time;
    }

    /// Last recorded time.
    #[inline]
    #[must_use]
    pub const fn time(&self) -> f32 {
        self.time
    }

    /// `previous - current` from the last update.
    #[inline]
    #[must_use]
    pub const fn time_delta(&self) -> f32 {
        self.time_delta
    }

    /// Forward elapsed time between the last two updates.
    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        -self.time_delta
    }
}
