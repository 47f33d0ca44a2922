//! System configuration parameters
//!
//! Every tunable for the runtime and the host simulation lives here.
//! The tick period itself is fixed at [`TICK_PERIOD_MS`]: the clock counts
//! milliseconds, so a different hardware period would skew every deadline.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Hardware tick period.  One tick is one millisecond.
pub const TICK_PERIOD_MS: u32 = 1;

/// Largest value the 24-bit SysTick reload register accepts.
pub const SYSTICK_MAX_RELOAD: u32 = 0x00FF_FFFF;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Clock tree ---
    /// Frequency feeding the SysTick counter (Hz).
    pub core_clock_hz: u32,

    // --- Blink controller ---
    /// Time the LED stays on per blink cycle (milliseconds)
    pub blink_on_ms: u32,
    /// Time the LED stays off per blink cycle (milliseconds)
    pub blink_off_ms: u32,

    // --- Simulation ---
    /// How long the host simulation runs before stopping (milliseconds)
    pub sim_run_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // 8 MHz internal RC oscillator, reset clock of the STM32F1 family
            core_clock_hz: 8_000_000,

            blink_on_ms: 250,
            blink_off_ms: 750,

            sim_run_ms: 5_000,
        }
    }
}

impl SystemConfig {
    /// SysTick reload value that yields one interrupt per tick period.
    pub fn systick_reload(&self) -> Result<u32> {
        let cycles = u64::from(self.core_clock_hz) * u64::from(TICK_PERIOD_MS) / 1000;
        if cycles == 0 {
            return Err(Error::Config("core clock too slow for a 1 ms tick"));
        }
        let reload = cycles - 1;
        if reload > u64::from(SYSTICK_MAX_RELOAD) {
            return Err(Error::Config("core clock too fast for the 24-bit SysTick reload"));
        }
        Ok(reload as u32)
    }

    /// Check every invariant the runtime relies on.
    pub fn validate(&self) -> Result<()> {
        self.systick_reload()?;
        if self.blink_on_ms == 0 || self.blink_off_ms == 0 {
            return Err(Error::Config("blink periods must be non-zero"));
        }
        if self.sim_run_ms == 0 {
            return Err(Error::Config("simulation run time must be non-zero"));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration document.
    #[cfg(feature = "std")]
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }
}
