//! Action that drives a digital output.
//!
//! Lets a transition table switch an LED or a relay without the engine
//! knowing anything about pins.  The pin is addressed through a
//! [`PinBank`] handle, so an out-of-range handle is refused at execution
//! time instead of reaching a driver.

use embedded_hal::digital::StatefulOutputPin;

use super::{Action, ActionResult};
use crate::drivers::pin_bank::{PinBank, PinHandle};

/// What the action does to its pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinLevel {
    High,
    Low,
    Toggle,
}

pub struct PinAction<'a, P, const N: usize> {
    bank: &'a PinBank<P, N>,
    pin: PinHandle,
    level: PinLevel,
}

impl<'a, P, const N: usize> PinAction<'a, P, N> {
    pub const fn new(bank: &'a PinBank<P, N>, pin: PinHandle, level: PinLevel) -> Self {
        Self { bank, pin, level }
    }
}

impl<P: StatefulOutputPin + Send, const N: usize> Action for PinAction<'_, P, N> {
    fn execute(&self) -> ActionResult {
        match self.level {
            PinLevel::High => self.bank.set_high(self.pin),
            PinLevel::Low => self.bank.set_low(self.pin),
            PinLevel::Toggle => self.bank.toggle(self.pin),
        }
    }
}
