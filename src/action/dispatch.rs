//! Action that posts a pre-configured event into a target.
//!
//! ```text
//!                 init                 execute (ok)
//!  Uninitialized ──────▶ NotDispatched ────────────▶ Dispatched ◀─┐
//!        ▲                    │                        │   │      │ execute (ok)
//!        │                    │ execute (err)          │   └──────┘
//!        │                    ▼                        ▼
//!        │                  Failed ◀──────────────── execute (err)
//!        │
//!        └──────────── deinit (from any state)
//! ```
//!
//! The status records only the outcome of the most recent execution, so a
//! single action can be re-armed and fired from a recurring timeout or a
//! state entered many times without accumulating history.

use core::cell::Cell;

use critical_section::Mutex;
use log::debug;

use super::{Action, ActionResult};
use crate::error::{Error, Result};
use crate::events::{Event, EventTarget};

/// Outcome of the most recent dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    /// `init` has not been called, or `deinit` erased the configuration.
    Uninitialized,
    /// Configured but never executed.
    NotDispatched,
    /// The last execution was accepted by the target.
    Dispatched,
    /// The last execution was refused by the target.
    Failed,
}

#[derive(Clone, Copy)]
struct Binding<'a, E: Event> {
    event: E,
    target: Option<&'a dyn EventTarget<E>>,
    status: DispatchStatus,
    /// Bumped by every `init` and `deinit`; an execution only records its
    /// outcome if the configuration it posted with is still current.
    epoch: u32,
}

impl<E: Event> Binding<'_, E> {
    const UNBOUND: Self = Self {
        event: E::NULL,
        target: None,
        status: DispatchStatus::Uninitialized,
        epoch: 0,
    };
}

/// Posts `event` into `target` every time it is executed.
///
/// The target is borrowed, never owned: it must outlive every execution,
/// which the `'a` lifetime enforces.
pub struct DispatchAction<'a, E: Event> {
    binding: Mutex<Cell<Binding<'a, E>>>,
}

impl<E: Event> Default for DispatchAction<'_, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, E: Event> DispatchAction<'a, E> {
    /// An unconfigured action.  `const` so it can live in a `static` table.
    pub const fn new() -> Self {
        Self {
            binding: Mutex::new(Cell::new(Binding::UNBOUND)),
        }
    }

    /// Configure the event to post and the target to post it to.
    ///
    /// Fails with [`Error::AlreadyInitialized`] if the action is already
    /// configured (call [`deinit`](Self::deinit) first) and with
    /// [`Error::NullEvent`] if `event` is the sentinel.  On failure the
    /// previous configuration is untouched.
    pub fn init(&self, event: E, target: &'a dyn EventTarget<E>) -> Result<()> {
        if event.is_null() {
            return Err(Error::NullEvent);
        }
        critical_section::with(|cs| {
            let cell = self.binding.borrow(cs);
            let current = cell.get();
            if current.status != DispatchStatus::Uninitialized {
                return Err(Error::AlreadyInitialized);
            }
            cell.set(Binding {
                event,
                target: Some(target),
                status: DispatchStatus::NotDispatched,
                epoch: current.epoch.wrapping_add(1),
            });
            Ok(())
        })
    }

    /// This object seen through the [`Action`] interface.  Executing the
    /// returned reference updates this object's status.
    pub fn as_action(&self) -> &dyn Action {
        self
    }

    /// Outcome of the most recent execution.
    pub fn status(&self) -> DispatchStatus {
        critical_section::with(|cs| self.binding.borrow(cs).get().status)
    }

    /// The configured event, or `E::NULL` when uninitialized.
    pub fn event(&self) -> E {
        critical_section::with(|cs| self.binding.borrow(cs).get().event)
    }

    pub fn is_initialized(&self) -> bool {
        self.status() != DispatchStatus::Uninitialized
    }

    /// Erase the configuration and status.  A full teardown: the action
    /// must be initialized again before it can dispatch.
    pub fn deinit(&self) {
        critical_section::with(|cs| {
            let cell = self.binding.borrow(cs);
            let epoch = cell.get().epoch.wrapping_add(1);
            cell.set(Binding {
                epoch,
                ..Binding::UNBOUND
            });
        });
    }
}

impl<E: Event> Action for DispatchAction<'_, E> {
    /// Post the configured event.
    ///
    /// Only the snapshot of the configuration and the status write are
    /// critical sections; the target's work runs with interrupts enabled so
    /// the tick keeps counting.  If `deinit` or a new `init` lands while the
    /// post is in flight, the outcome is dropped and the newer
    /// configuration stands.
    fn execute(&self) -> ActionResult {
        let snapshot = critical_section::with(|cs| self.binding.borrow(cs).get());
        let Some(target) = snapshot.target else {
            return Err(Error::NotInitialized);
        };

        let outcome = target.post(snapshot.event);
        let status = match outcome {
            Ok(()) => DispatchStatus::Dispatched,
            Err(e) => {
                debug!("dispatch of {:?} failed: {}", snapshot.event, e);
                DispatchStatus::Failed
            }
        };

        critical_section::with(|cs| {
            let cell = self.binding.borrow(cs);
            let mut current = cell.get();
            if current.epoch == snapshot.epoch {
                current.status = status;
                cell.set(current);
            } else {
                debug!("dispatch of {:?} outlived its configuration", snapshot.event);
            }
        });
        outcome
    }
}
