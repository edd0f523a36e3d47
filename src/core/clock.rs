//! Injected time source
//!
//! Every duration and timing window in this core is computed against a
//! `Clock`. Hosts hand in `SteadyClock`; tests drive `ManualClock` so timing
//! windows can be crossed without real waits.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::core::types::TimeMs;

/// Monotonic millisecond clock - the sole time source for the combat core
pub trait Clock {
    fn now(&self) -> TimeMs;
}

/// Host clock backed by `Instant`, counting from construction
#[derive(Debug, Clone)]
pub struct SteadyClock {
    origin: Instant,
}

impl SteadyClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SteadyClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SteadyClock {
    fn now(&self) -> TimeMs {
        self.origin.elapsed().as_millis() as TimeMs
    }
}

/// Test clock advanced by hand
///
/// Interior mutability lets a shared handle be advanced while subsystems
/// hold their own reference to it.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: AtomicU64::new(0),
        }
    }

    pub fn starting_at(ms: TimeMs) -> Self {
        Self {
            now: AtomicU64::new(ms),
        }
    }

    pub fn advance(&self, ms: TimeMs) {
        self.now.fetch_add(ms, Ordering::Relaxed);
    }

    pub fn set(&self, ms: TimeMs) {
        self.now.store(ms, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> TimeMs {
        self.now.load(Ordering::Relaxed)
    }
}
