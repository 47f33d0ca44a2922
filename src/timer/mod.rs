//! Interrupt-driven millisecond timer service.
//!
//! ```text
//!  hardware tick (1 ms)
//!        │
//!        ▼
//!  TimerService::tick()          ── interrupt context
//!        │  1. claim the scan, clock.advance()
//!        │  2. timeouts.scan(now)
//!        ▼
//!  due handlers run (&dyn Action)
//!        │
//!        ▼
//!  DispatchAction ──▶ EventTarget (machine or queue)
//! ```
//!
//! Main-line code reads the clock with [`now`](TimerService::now), blocks
//! with [`delay`](TimerService::delay) and schedules work with
//! [`register_timeout`](TimerService::register_timeout).  Everything that
//! touches state shared with the tick runs inside a critical section.

pub mod clock;
pub mod registry;

use core::cell::Cell;
use core::sync::atomic::{AtomicBool, Ordering};

use critical_section::Mutex;
use log::{info, warn};

use crate::action::Action;
use crate::config::TICK_PERIOD_MS;
use crate::drivers::tick_source::TickSource;
use crate::error::{Error, Result};

pub use clock::{MillisClock, elapsed};
pub use registry::{MAX_DELAY_MS, TimeoutId, TimeoutRegistry};

/// Clock plus a registry of `N` timeout slots.
///
/// `const`-constructible so it can be a `static` shared between the tick
/// interrupt handler and main-line code.
pub struct TimerService<'a, const N: usize> {
    clock: MillisClock,
    timeouts: TimeoutRegistry<'a, N>,
    initialized: AtomicBool,
    scanning: Mutex<Cell<bool>>,
}

impl<const N: usize> Default for TimerService<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize> TimerService<'a, N> {
    pub const fn new() -> Self {
        Self {
            clock: MillisClock::new(),
            timeouts: TimeoutRegistry::new(),
            initialized: AtomicBool::new(false),
            scanning: Mutex::new(Cell::new(false)),
        }
    }

    /// Reset the clock to zero, drop pending timeouts, and start `source`
    /// with a 1 ms period.  Call once, before any other operation.
    pub fn init(&self, source: &mut impl TickSource) -> Result<()> {
        self.clock.reset();
        self.timeouts.clear();
        source.start_periodic(TICK_PERIOD_MS)?;
        self.initialized.store(true, Ordering::Release);
        info!("timer: started, {} timeout slots", N);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Tick interrupt body: advance the clock by one, then fire every due
    /// timeout.  Returns how many handlers ran.
    ///
    /// If a tick preempts another tick's scan, it only advances the clock;
    /// the next tick picks up anything that became due meanwhile.
    pub fn tick(&self) -> usize {
        // Claim and advance together, so the scan's `now` is never older
        // than the clock a nested tick leaves behind.
        let claimed = critical_section::with(|cs| {
            let now = self.clock.advance();
            let busy = self.scanning.borrow(cs).replace(true);
            (!busy).then_some(now)
        });
        let Some(now) = claimed else {
            return 0;
        };
        let fired = self.timeouts.scan(now);
        critical_section::with(|cs| self.scanning.borrow(cs).set(false));
        fired
    }

    /// Milliseconds since `init`, modulo 2^32.
    pub fn now(&self) -> u32 {
        self.clock.now()
    }

    /// Wraparound-safe time since `start`.
    pub fn elapsed_since(&self, start: u32) -> u32 {
        self.clock.elapsed_since(start)
    }

    /// Busy-wait for `ms` milliseconds.
    ///
    /// Blocks main-line code; only the tick interrupt runs meanwhile.
    /// Returns immediately if the service was never initialized, since no
    /// tick would ever end the wait.
    pub fn delay(&self, ms: u32) {
        if !self.is_initialized() {
            warn!("timer: delay({}) before init ignored", ms);
            return;
        }
        let start = self.now();
        while self.elapsed_since(start) < ms {
            core::hint::spin_loop();
        }
    }

    /// Run `handler` from the tick interrupt once `delay_ms` milliseconds
    /// have passed.
    ///
    /// Fails with [`Error::NotInitialized`] before `init`, with
    /// [`Error::Config`] for delays above [`MAX_DELAY_MS`], and with
    /// [`Error::ResourceExhausted`] when all `N` slots are taken.
    pub fn register_timeout(&self, delay_ms: u32, handler: &'a dyn Action) -> Result<TimeoutId> {
        if !self.is_initialized() {
            return Err(Error::NotInitialized);
        }
        // Read the clock inside the same critical section as the insertion
        // so a tick cannot slip in between and shorten the delay.
        critical_section::with(|_| self.timeouts.register(self.now(), delay_ms, handler))
    }

    /// Withdraw a timeout that has not fired yet.
    pub fn cancel_timeout(&self, id: TimeoutId) -> bool {
        self.timeouts.cancel(id)
    }

    pub fn is_pending(&self, id: TimeoutId) -> bool {
        self.timeouts.is_pending(id)
    }

    /// Number of armed timeouts.
    pub fn pending_timeouts(&self) -> usize {
        self.timeouts.pending()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Stop `source` and mark the service uninitialized.  Pending timeouts
    /// are dropped without running.
    pub fn shutdown(&self, source: &mut impl TickSource) {
        source.stop();
        self.initialized.store(false, Ordering::Release);
        self.timeouts.clear();
        info!("timer: stopped at {} ms", self.now());
    }

    /// Preset the clock, e.g. close to the wrap point in soak tests.
    pub fn set_time(&self, ms: u32) {
        self.clock.set(ms);
    }
}
