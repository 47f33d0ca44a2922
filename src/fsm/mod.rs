//! Table-driven finite state machine engine.
//!
//! Classic embedded transition-table pattern:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Transition table                                            │
//! │  ┌──────────┬──────────┬──────────┬───────────────────────┐  │
//! │  │ from     │ event    │ to       │ actions               │  │
//! │  ├──────────┼──────────┼──────────┼───────────────────────┤  │
//! │  │ Off      │ Timeout  │ On       │ [pin high, re-arm]    │  │
//! │  │ On       │ Timeout  │ Off      │ [pin low,  re-arm]    │  │
//! │  │ On       │ Stop     │ Off      │ [pin low]             │  │
//! │  └──────────┴──────────┴──────────┴───────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`Maquina::process_event`] looks up the row for (current state, event).
//! If there is one, it executes the row's actions in order, then moves to
//! `to`.  If there is none, the event is refused with
//! [`Error::UnhandledTransition`] and the current state is left untouched.
//!
//! The table is borrowed for `'a` and never mutated; only
//! `process_event` writes the current state.

pub mod shared;
pub mod table;

use core::fmt::Debug;

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::events::Event;

pub use shared::SharedMachine;
pub use table::{Transition, validate_table};

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Bounds every machine-specific state enum must satisfy.
pub trait MachineState: Copy + Eq + Debug + Send + Sync {}

impl<T: Copy + Eq + Debug + Send + Sync> MachineState for T {}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// A state machine driven by a borrowed transition table.
pub struct Maquina<'a, S: MachineState, E: Event> {
    name: &'static str,
    table: &'a [Transition<'a, S, E>],
    initial: S,
    current: S,
    /// Transitions taken since construction (wraps at u32::MAX).
    taken: u32,
    /// Events refused since construction (wraps at u32::MAX).
    rejected: u32,
}

impl<'a, S: MachineState, E: Event> Maquina<'a, S, E> {
    /// Construct a machine in state `initial`.  `const` so that machines
    /// and their tables can be `static`.
    pub const fn new(name: &'static str, table: &'a [Transition<'a, S, E>], initial: S) -> Self {
        Self {
            name,
            table,
            initial,
            current: initial,
            taken: 0,
            rejected: 0,
        }
    }

    /// Like [`new`](Self::new), but reject malformed tables first.
    pub fn checked(
        name: &'static str,
        table: &'a [Transition<'a, S, E>],
        initial: S,
    ) -> Result<Self> {
        validate_table(table)?;
        Ok(Self::new(name, table, initial))
    }

    /// Feed one event through the table.
    ///
    /// 1. Find the row for (current state, event).
    /// 2. Execute its actions in order.  An action failure is logged; it
    ///    does not abort the transition.
    /// 3. Move to the row's target state and return it.
    pub fn process_event(&mut self, event: E) -> Result<S> {
        let Some(row) = self.lookup(event) else {
            self.rejected = self.rejected.wrapping_add(1);
            debug!("{}: {:?} not handled in {:?}", self.name, event, self.current);
            return Err(Error::UnhandledTransition);
        };

        for (index, action) in row.actions.iter().enumerate() {
            if let Err(e) = action.execute() {
                warn!(
                    "{}: action {} of {:?} --{:?}--> {:?} failed: {}",
                    self.name, index, row.from, event, row.to, e
                );
            }
        }

        debug!("{}: {:?} --{:?}--> {:?}", self.name, self.current, event, row.to);
        self.current = row.to;
        self.taken = self.taken.wrapping_add(1);
        Ok(self.current)
    }

    /// Whether `event` has a row for the current state.
    pub fn can_handle(&self, event: E) -> bool {
        self.lookup(event).is_some()
    }

    /// The current state's identity.
    pub fn state(&self) -> S {
        self.current
    }

    pub fn initial_state(&self) -> S {
        self.initial
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Return to the initial state without running any action.
    pub fn reset(&mut self) {
        info!("{}: reset {:?} -> {:?}", self.name, self.current, self.initial);
        self.current = self.initial;
    }

    pub fn transitions_taken(&self) -> u32 {
        self.taken
    }

    pub fn events_rejected(&self) -> u32 {
        self.rejected
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn lookup(&self, event: E) -> Option<&'a Transition<'a, S, E>> {
        if event.is_null() {
            return None;
        }
        let table: &'a [Transition<'a, S, E>] = self.table;
        table
            .iter()
            .find(|row| row.from == self.current && row.event == event)
    }
}
