//! Transition rows and table validation.

use log::warn;

use super::MachineState;
use crate::action::Action;
use crate::error::{Error, Result};
use crate::events::Event;

/// One row of a transition table: in state `from`, on `event`, run
/// `actions` in order and move to `to`.
///
/// `actions` may be empty.  Rows are immutable once built; `const` so whole
/// tables can be `static`.
pub struct Transition<'a, S: MachineState, E: Event> {
    pub from: S,
    pub event: E,
    pub to: S,
    pub actions: &'a [&'a dyn Action],
}

impl<'a, S: MachineState, E: Event> Transition<'a, S, E> {
    pub const fn new(from: S, event: E, to: S, actions: &'a [&'a dyn Action]) -> Self {
        Self {
            from,
            event,
            to,
            actions,
        }
    }

    /// Row leading back into its own state.
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

/// Reject tables the engine could not evaluate unambiguously.
///
/// - A row triggered by `E::NULL` can never fire: [`Error::NullEvent`].
/// - Two rows for the same (state, event): lookup would silently pick the
///   first, so this is reported as a configuration error.
pub fn validate_table<S: MachineState, E: Event>(table: &[Transition<'_, S, E>]) -> Result<()> {
    for (i, row) in table.iter().enumerate() {
        if row.event.is_null() {
            warn!("fsm table: row {} is triggered by the null event", i);
            return Err(Error::NullEvent);
        }
        let duplicate = table[..i]
            .iter()
            .any(|earlier| earlier.from == row.from && earlier.event == row.event);
        if duplicate {
            warn!(
                "fsm table: row {} repeats ({:?}, {:?})",
                i, row.from, row.event
            );
            return Err(Error::Config("duplicate transition"));
        }
    }
    Ok(())
}
