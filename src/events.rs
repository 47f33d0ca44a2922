//! Events and the places they can be posted to.
//!
//! Events are produced by:
//! - Timeout handlers running inside the tick interrupt
//! - Transition actions of other state machines
//! - Main-line code
//!
//! and are consumed by anything implementing [`EventTarget`]: a
//! [`SharedMachine`](crate::fsm::shared::SharedMachine) processes the event
//! immediately, while an [`EventQueue`] defers it for the main loop.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Tick ISR    │────▶│              │     │              │
//! │ Actions     │────▶│  EventQueue  │────▶│  Main Loop   │
//! │ Main-line   │────▶│  (bounded)   │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::cell::RefCell;
use core::fmt::Debug;

use critical_section::Mutex;
use heapless::Deque;
use log::{debug, warn};

use crate::error::{Error, Result};

/// A closed set of discrete occurrences with a distinguished "no event"
/// sentinel.
///
/// ```
/// use maquina::events::Event;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum Ev {
///     Nulo,
///     Press,
/// }
///
/// impl Event for Ev {
///     const NULL: Self = Ev::Nulo;
/// }
///
/// assert!(Ev::Nulo.is_null());
/// assert!(!Ev::Press.is_null());
/// ```
pub trait Event: Copy + Eq + Debug + Send + Sync {
    /// The "no event" value.  Never a valid trigger.
    const NULL: Self;

    fn is_null(&self) -> bool {
        *self == Self::NULL
    }
}

/// Anything that accepts posted events.
///
/// `Sync` because posts arrive from both the tick interrupt and main-line
/// code; implementations guard their own state with a critical section.
pub trait EventTarget<E: Event>: Sync {
    /// Deliver `event`.  An `Err` means the target refused it.
    fn post(&self, event: E) -> Result<()>;
}

/// Bounded FIFO of pending events.
///
/// Producers call [`post`](EventTarget::post) from any context; the main
/// loop drains with [`pop`](Self::pop) or [`pump_into`](Self::pump_into).
/// A full queue refuses the event with [`Error::ResourceExhausted`].
pub struct EventQueue<E: Event, const N: usize> {
    pending: Mutex<RefCell<Deque<E, N>>>,
}

impl<E: Event, const N: usize> Default for EventQueue<E, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event, const N: usize> EventQueue<E, N> {
    pub const fn new() -> Self {
        Self {
            pending: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Pop the oldest pending event, or `None` if the queue is empty.
    pub fn pop(&self) -> Option<E> {
        critical_section::with(|cs| self.pending.borrow_ref_mut(cs).pop_front())
    }

    /// Drain all pending events into a callback, in FIFO order.
    ///
    /// Each event is popped in its own critical section so the tick
    /// interrupt is never held off for the whole drain.
    pub fn drain(&self, mut handler: impl FnMut(E)) {
        while let Some(event) = self.pop() {
            handler(event);
        }
    }

    /// Deliver every pending event to `target`.  Returns how many were
    /// accepted; refused events are logged and dropped.
    pub fn pump_into(&self, target: &dyn EventTarget<E>) -> usize {
        let mut accepted = 0;
        self.drain(|event| match target.post(event) {
            Ok(()) => accepted += 1,
            Err(e) => warn!("event queue: {:?} refused by target ({})", event, e),
        });
        accepted
    }

    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.pending.borrow_ref(cs).len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<E: Event, const N: usize> EventTarget<E> for EventQueue<E, N> {
    fn post(&self, event: E) -> Result<()> {
        if event.is_null() {
            return Err(Error::NullEvent);
        }
        critical_section::with(|cs| {
            self.pending
                .borrow_ref_mut(cs)
                .push_back(event)
                .map_err(|dropped| {
                    warn!("event queue full, dropping {:?}", dropped);
                    Error::ResourceExhausted
                })
        })?;
        debug!("event queue: queued {:?}", event);
        Ok(())
    }
}
