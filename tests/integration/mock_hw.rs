//! Mock hardware and shared fixtures for integration tests.
//!
//! Records every pin write and every posted event so tests can assert on
//! the full history without touching real GPIO.

use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin, StatefulOutputPin};
use maquina::Result;
use maquina::events::{Event, EventTarget};

// ── Shared event and state sets ───────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ev {
    Nulo,
    EventA,
    EventB,
    EventC,
}

impl Event for Ev {
    const NULL: Self = Ev::Nulo;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum St {
    S0,
    S1,
    S2,
}

// ── MockPin ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockPinError;

impl embedded_hal::digital::Error for MockPinError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Output pin that remembers every level written to it.  A `broken` pin
/// refuses every write.
#[derive(Debug, Default)]
pub struct MockPin {
    pub writes: Vec<bool>,
    pub broken: bool,
}

#[allow(dead_code)]
impl MockPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn broken() -> Self {
        Self {
            writes: Vec::new(),
            broken: true,
        }
    }

    pub fn level(&self) -> bool {
        self.writes.last().copied().unwrap_or(false)
    }

    fn write(&mut self, high: bool) -> core::result::Result<(), MockPinError> {
        if self.broken {
            return Err(MockPinError);
        }
        self.writes.push(high);
        Ok(())
    }
}

impl ErrorType for MockPin {
    type Error = MockPinError;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> core::result::Result<(), MockPinError> {
        self.write(false)
    }

    fn set_high(&mut self) -> core::result::Result<(), MockPinError> {
        self.write(true)
    }
}

impl StatefulOutputPin for MockPin {
    fn is_set_high(&mut self) -> core::result::Result<bool, MockPinError> {
        Ok(self.level())
    }

    fn is_set_low(&mut self) -> core::result::Result<bool, MockPinError> {
        Ok(!self.level())
    }
}

// ── RecordingTarget ───────────────────────────────────────────

/// Event target that accepts everything and keeps the history.
pub struct RecordingTarget {
    seen: Mutex<RefCell<Vec<Ev>>>,
}

#[allow(dead_code)]
impl RecordingTarget {
    pub fn new() -> Self {
        Self {
            seen: Mutex::new(RefCell::new(Vec::new())),
        }
    }

    pub fn seen(&self) -> Vec<Ev> {
        critical_section::with(|cs| self.seen.borrow_ref(cs).clone())
    }
}

impl EventTarget<Ev> for RecordingTarget {
    fn post(&self, event: Ev) -> Result<()> {
        critical_section::with(|cs| self.seen.borrow_ref_mut(cs).push(event));
        Ok(())
    }
}
