//! Periodic hardware tick sources.
//!
//! The timer service never touches timer registers itself: board code
//! passes a [`TickSource`] handle to
//! [`TimerService::init`](crate::timer::TimerService::init), which asks it
//! for a 1 ms period.  The tick interrupt handler then calls
//! [`TimerService::tick`](crate::timer::TimerService::tick).
//!
//! - **`target_arch = "arm"`**: `SysTickSource` programs the Cortex-M
//!   SysTick counter.
//! - **any target**: [`ManualTickSource`] only records the request; the
//!   caller drives `tick()` itself (tests).
//! - **`std`**: `adapters::ThreadTickSource` calls `tick()` from a
//!   background thread for the host simulation.

use log::info;

use crate::error::{Error, Result};

/// A periodic interrupt source that can be started and stopped.
pub trait TickSource {
    /// Start raising the tick interrupt every `period_ms` milliseconds.
    fn start_periodic(&mut self, period_ms: u32) -> Result<()>;

    /// Stop raising the tick interrupt.
    fn stop(&mut self);
}

/// Tick source with no hardware behind it.
#[derive(Debug, Default)]
pub struct ManualTickSource {
    period_ms: Option<u32>,
    starts: u32,
}

impl ManualTickSource {
    pub const fn new() -> Self {
        Self {
            period_ms: None,
            starts: 0,
        }
    }

    /// Period requested by the last `start_periodic`, while running.
    pub fn period_ms(&self) -> Option<u32> {
        self.period_ms
    }

    pub fn is_running(&self) -> bool {
        self.period_ms.is_some()
    }

    /// How many times the source has been started.
    pub fn starts(&self) -> u32 {
        self.starts
    }
}

impl TickSource for ManualTickSource {
    fn start_periodic(&mut self, period_ms: u32) -> Result<()> {
        if period_ms == 0 {
            return Err(Error::Config("tick period must be non-zero"));
        }
        self.period_ms = Some(period_ms);
        self.starts += 1;
        info!("tick(manual): period {} ms, driven by caller", period_ms);
        Ok(())
    }

    fn stop(&mut self) {
        self.period_ms = None;
    }
}

#[cfg(target_arch = "arm")]
pub use systick::SysTickSource;

#[cfg(target_arch = "arm")]
mod systick {
    use cortex_m::peripheral::SYST;
    use cortex_m::peripheral::syst::SystClkSource;
    use log::info;

    use super::TickSource;
    use crate::config::SYSTICK_MAX_RELOAD;
    use crate::error::{Error, Result};

    /// Cortex-M SysTick clocked from the core clock.
    ///
    /// The `SysTick` exception handler must call
    /// [`TimerService::tick`](crate::timer::TimerService::tick).
    pub struct SysTickSource {
        syst: SYST,
        core_clock_hz: u32,
    }

    impl SysTickSource {
        pub fn new(syst: SYST, core_clock_hz: u32) -> Self {
            Self { syst, core_clock_hz }
        }

        /// Hand the peripheral back to the caller.
        pub fn free(self) -> SYST {
            self.syst
        }
    }

    impl TickSource for SysTickSource {
        fn start_periodic(&mut self, period_ms: u32) -> Result<()> {
            let cycles = u64::from(self.core_clock_hz) * u64::from(period_ms) / 1000;
            if cycles == 0 || cycles - 1 > u64::from(SYSTICK_MAX_RELOAD) {
                return Err(Error::Config("SysTick reload out of range"));
            }
            self.syst.disable_counter();
            self.syst.set_clock_source(SystClkSource::Core);
            self.syst.set_reload((cycles - 1) as u32);
            self.syst.clear_current();
            self.syst.enable_interrupt();
            self.syst.enable_counter();
            info!("tick(systick): period {} ms, reload {}", period_ms, cycles - 1);
            Ok(())
        }

        fn stop(&mut self) {
            self.syst.disable_interrupt();
            self.syst.disable_counter();
        }
    }
}
