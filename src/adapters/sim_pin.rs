//! Simulated digital output for host runs.
//!
//! Keeps the driven level in memory and logs every edge, so the console
//! shows what an LED on the real board would do.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin, StatefulOutputPin};
use log::info;

#[derive(Debug)]
pub struct SimPin {
    name: &'static str,
    high: bool,
    edges: u32,
}

impl SimPin {
    /// A pin that starts driven low.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            high: false,
            edges: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Level changes seen so far.  Writing the current level again is not
    /// an edge.
    pub fn edges(&self) -> u32 {
        self.edges
    }

    fn drive(&mut self, high: bool) {
        if self.high != high {
            self.high = high;
            self.edges = self.edges.wrapping_add(1);
            info!("pin {}: {}", self.name, if high { "HIGH" } else { "LOW" });
        }
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}

impl StatefulOutputPin for SimPin {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.high)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.high)
    }
}
