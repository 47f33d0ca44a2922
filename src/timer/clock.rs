//! Free-running millisecond counter.
//!
//! Incremented once per tick interrupt, read from anywhere.  The counter
//! is a `u32` and wraps modulo 2^32 (about 49.7 days); elapsed times must
//! always be computed with [`elapsed`], never with a plain `-`.

use core::sync::atomic::{AtomicU32, Ordering};

/// Wraparound-safe `now - start`.
pub const fn elapsed(now: u32, start: u32) -> u32 {
    now.wrapping_sub(start)
}

pub struct MillisClock {
    ticks: AtomicU32,
}

impl Default for MillisClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MillisClock {
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Clock preset to `ticks`, e.g. just below the wrap point.
    pub const fn starting_at(ticks: u32) -> Self {
        Self {
            ticks: AtomicU32::new(ticks),
        }
    }

    /// Current counter value.  A single aligned 32-bit load, so it cannot
    /// tear against a concurrent [`advance`](Self::advance).
    pub fn now(&self) -> u32 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Add one tick and return the new value.
    ///
    /// Load and store inside a critical section instead of `fetch_add`:
    /// Cortex-M0 and RV32 parts without the A extension have 32-bit atomic
    /// loads and stores but no read-modify-write.
    pub fn advance(&self) -> u32 {
        critical_section::with(|_| {
            let next = self.ticks.load(Ordering::Relaxed).wrapping_add(1);
            self.ticks.store(next, Ordering::Release);
            next
        })
    }

    pub fn reset(&self) {
        self.set(0);
    }

    pub(crate) fn set(&self, ticks: u32) {
        self.ticks.store(ticks, Ordering::Release);
    }

    /// Ticks since `start`, modulo 2^32.
    pub fn elapsed_since(&self, start: u32) -> u32 {
        elapsed(self.now(), start)
    }
}
