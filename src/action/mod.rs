//! Actions: the effects a transition or a timeout firing produces.
//!
//! The state machine engine and the timeout registry only ever see
//! `&dyn Action`.  Variants live in their own modules and expose their own
//! status accessors:
//!
//! | Variant                       | Effect                                   |
//! |-------------------------------|------------------------------------------|
//! | [`DispatchAction`]            | posts a configured event to a target     |
//! | [`PinAction`]                 | drives a digital output through a bank   |
//! | [`Callback`]                  | calls `fn(&P)` with a borrowed parameter |

pub mod dispatch;
pub mod pin;

pub use dispatch::{DispatchAction, DispatchStatus};
pub use pin::{PinAction, PinLevel};

use crate::error::Result;

/// Outcome of a single execution.
pub type ActionResult = Result<()>;

/// Something that can be executed as a side effect.
///
/// `execute` takes `&self`: the same action is referenced from transition
/// tables and timeout slots at once, so variants keep mutable status behind
/// a critical section.  `Sync` lets actions live in `static` tables shared
/// with the tick interrupt.
pub trait Action: Sync {
    fn execute(&self) -> ActionResult;
}

/// Type-erased handler: a plain function plus the context it runs with.
///
/// The registry stores only the reference; the caller keeps `param` alive
/// until the timeout fires or is cancelled, which the `'a` borrow enforces.
pub struct Callback<'a, P: ?Sized + Sync> {
    handler: fn(&P),
    param: &'a P,
}

impl<'a, P: ?Sized + Sync> Callback<'a, P> {
    pub const fn new(handler: fn(&P), param: &'a P) -> Self {
        Self { handler, param }
    }
}

impl<P: ?Sized + Sync> Action for Callback<'_, P> {
    fn execute(&self) -> ActionResult {
        (self.handler)(self.param);
        Ok(())
    }
}
