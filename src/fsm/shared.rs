//! A machine that can be posted to from any context.
//!
//! [`Maquina::process_event`] needs `&mut self`, but dispatch actions only
//! hold `&dyn EventTarget`.  `SharedMachine` parks the machine behind a
//! critical-section mutex and processes each posted event synchronously.
//!
//! ```text
//!  post(event)
//!     │  critical section: take the machine out of its slot
//!     ▼
//!  process_event + actions      ── interrupts enabled, tick keeps counting
//!     │  critical section: put the machine back
//!     ▼
//!  Ok(new state) / Err
//! ```
//!
//! While the machine is out of its slot, every other post (a transition
//! action posting back into its own machine, or the tick interrupt posting
//! into a machine main-line code is driving) gets [`Error::Busy`].  Route
//! such events through an [`EventQueue`](crate::events::EventQueue)
//! instead.

use core::cell::RefCell;

use critical_section::Mutex;
use log::debug;

use super::{MachineState, Maquina};
use crate::error::{Error, Result};
use crate::events::{Event, EventTarget};

pub struct SharedMachine<'a, S: MachineState, E: Event> {
    /// `None` while some caller has the machine checked out.
    slot: Mutex<RefCell<Option<Maquina<'a, S, E>>>>,
}

impl<'a, S: MachineState, E: Event> SharedMachine<'a, S, E> {
    pub const fn new(machine: Maquina<'a, S, E>) -> Self {
        Self {
            slot: Mutex::new(RefCell::new(Some(machine))),
        }
    }

    /// Current state, or `None` while the machine is mid-transition.
    pub fn state(&self) -> Option<S> {
        critical_section::with(|cs| self.slot.borrow_ref(cs).as_ref().map(Maquina::state))
    }

    /// Run `f` with exclusive access to the machine.  `f` runs outside any
    /// critical section.
    pub fn with<R>(&self, f: impl FnOnce(&mut Maquina<'a, S, E>) -> R) -> Result<R> {
        let mut machine = critical_section::with(|cs| self.slot.borrow_ref_mut(cs).take())
            .ok_or(Error::Busy)?;
        let result = f(&mut machine);
        critical_section::with(|cs| *self.slot.borrow_ref_mut(cs) = Some(machine));
        Ok(result)
    }

    /// Process `event` and return the state it led to.
    pub fn process_event(&self, event: E) -> Result<S> {
        self.with(|machine| machine.process_event(event))?
    }
}

impl<S: MachineState, E: Event> EventTarget<E> for SharedMachine<'_, S, E> {
    fn post(&self, event: E) -> Result<()> {
        self.process_event(event).map(|_| ()).inspect_err(|e| {
            if *e == Error::Busy {
                debug!("fsm: {:?} refused, machine busy", event);
            }
        })
    }
}
