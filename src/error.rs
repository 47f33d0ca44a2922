//! Unified error type for the runtime.
//!
//! A single `Error` enum that the timer service, the state machine engine
//! and the action variants all return.  Every variant is `Copy` so it can
//! be produced inside a critical section or an interrupt handler and passed
//! back to main-line code without allocation.

use core::fmt;

/// Every fallible operation in the runtime funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Operation attempted before the object was configured.
    NotInitialized,
    /// `init` called on an object that is already configured.
    AlreadyInitialized,
    /// A fixed-capacity resource (timeout slots, event queue) is full.
    ResourceExhausted,
    /// The machine has no transition for (current state, event).
    UnhandledTransition,
    /// A peripheral handle is outside the board's handle table.
    InvalidHandle,
    /// The target machine is already processing an event.
    Busy,
    /// The "no event" sentinel was used where a real event is required.
    NullEvent,
    /// The digital pin driver reported a failure.
    Pin,
    /// Configuration or table rejected by validation.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "not initialized"),
            Self::AlreadyInitialized => write!(f, "already initialized"),
            Self::ResourceExhausted => write!(f, "resource exhausted"),
            Self::UnhandledTransition => write!(f, "unhandled transition"),
            Self::InvalidHandle => write!(f, "invalid handle"),
            Self::Busy => write!(f, "target busy"),
            Self::NullEvent => write!(f, "null event"),
            Self::Pin => write!(f, "pin driver error"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
