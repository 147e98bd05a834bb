//! Time sources.
//!
//! The simulator never reads the system clock directly. It asks a [`Clock`]
//! for seconds since the clock's own epoch, so tests can drive time by hand
//! with a [`FakeClock`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Source of wall-clock seconds.
pub trait Clock: Send + Sync {
    /// Seconds elapsed since this clock's epoch.
    fn now(&self) -> f64;
}

/// Real monotonic time; the epoch is the moment of construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    /// Create a clock starting at 0 s now.
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
}

/// Manually driven clock for deterministic tests.
///
/// Stores the `f64` bit pattern in an atomic, so one instance can be shared
/// between the test thread and a running simulator.
#[derive(Debug, Default)]
pub struct FakeClock {
    bits: AtomicU64,
}

impl FakeClock {
    /// Create a clock reading `start` seconds.
    pub fn new(start: f64) -> Self {
        Self {
            bits: AtomicU64::new(start.to_bits()),
        }
    }

    /// Jump to an absolute time. Going backwards is allowed.
    pub fn set(&self, t: f64) {
        self.bits.store(t.to_bits(), Ordering::SeqCst);
    }

    /// Move forward by `dt` seconds and return the new time.
    pub fn advance(&self, dt: f64) -> f64 {
        let mut current = self.bits.load(Ordering::SeqCst);
        loop {
            let next = (f64::from_bits(current) + dt).to_bits();
            match self
                .bits
                .compare_exchange(current, next, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return f64::from_bits(next),
                Err(actual) => current = actual,
            }
        }
    }
}

impl Clock for FakeClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}
