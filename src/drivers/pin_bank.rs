//! Handle-addressed bank of digital outputs.
//!
//! Board code owns the concrete `embedded-hal` pins and hands them to a
//! `PinBank` once at boot.  Everything else refers to a pin by its
//! [`PinHandle`], the index into the bank.  A handle outside the bank is
//! rejected with [`Error::InvalidHandle`] before any driver is touched.
//!
//! The bank guards its pins with a critical section, so it can be driven
//! from transition actions running in the tick interrupt as well as from
//! main-line code.

use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::digital::{Error as _, OutputPin, StatefulOutputPin};
use log::warn;

use crate::error::{Error, Result};

/// Index of a pin inside a [`PinBank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinHandle(pub u8);

pub struct PinBank<P, const N: usize> {
    pins: Mutex<RefCell<[P; N]>>,
}

impl<P, const N: usize> PinBank<P, N> {
    pub const fn new(pins: [P; N]) -> Self {
        Self {
            pins: Mutex::new(RefCell::new(pins)),
        }
    }

    /// Number of pins in the bank.
    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Whether `handle` addresses a pin of this bank.
    pub const fn contains(&self, handle: PinHandle) -> bool {
        (handle.0 as usize) < N
    }

    /// Run `f` with exclusive access to the pin behind `handle`.
    pub fn with_pin<R>(&self, handle: PinHandle, f: impl FnOnce(&mut P) -> R) -> Result<R> {
        if !self.contains(handle) {
            warn!("pin bank: handle {} out of range (bank has {})", handle.0, N);
            return Err(Error::InvalidHandle);
        }
        critical_section::with(|cs| {
            let mut pins = self.pins.borrow_ref_mut(cs);
            Ok(f(&mut pins[handle.0 as usize]))
        })
    }
}

impl<P: OutputPin, const N: usize> PinBank<P, N> {
    pub fn set_high(&self, handle: PinHandle) -> Result<()> {
        self.with_pin(handle, |pin| pin.set_high())?
            .map_err(|e| pin_error(handle, e.kind()))
    }

    pub fn set_low(&self, handle: PinHandle) -> Result<()> {
        self.with_pin(handle, |pin| pin.set_low())?
            .map_err(|e| pin_error(handle, e.kind()))
    }

    pub fn set_level(&self, handle: PinHandle, high: bool) -> Result<()> {
        if high {
            self.set_high(handle)
        } else {
            self.set_low(handle)
        }
    }
}

impl<P: StatefulOutputPin, const N: usize> PinBank<P, N> {
    pub fn toggle(&self, handle: PinHandle) -> Result<()> {
        self.with_pin(handle, |pin| pin.toggle())?
            .map_err(|e| pin_error(handle, e.kind()))
    }

    /// Level the pin was last driven to.
    pub fn is_set_high(&self, handle: PinHandle) -> Result<bool> {
        self.with_pin(handle, |pin| pin.is_set_high())?
            .map_err(|e| pin_error(handle, e.kind()))
    }
}

fn pin_error(handle: PinHandle, kind: embedded_hal::digital::ErrorKind) -> Error {
    warn!("pin bank: driver error on pin {}: {:?}", handle.0, kind);
    Error::Pin
}
