//! Monotonic clock adapter.
//!
//! Wraps `std::time::Instant`; `now()` is the time since the adapter was
//! created, which is all the motion model needs.

use core::time::Duration;
use std::time::Instant;

use crate::app::ports::Clock;

pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Whole seconds since the clock was created.
    pub fn uptime_secs(&self) -> u64 {
        self.start.elapsed().as_secs()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}
