//! Maquina: table-driven state machines driven by a millisecond tick.
//!
//! Exposes the hardware-independent modules for integration testing and
//! for firmware crates to build on.  The core is `no_std`; host-only
//! adapters (console logger, simulated pins) are gated behind the `std`
//! feature, and the Cortex-M SysTick source behind `target_arch = "arm"`.

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![deny(unused_must_use)]

pub mod action;
pub mod config;
pub mod drivers;
pub mod events;
pub mod fsm;
pub mod timer;

mod error;

#[cfg(feature = "std")]
pub mod adapters;

pub use error::{Error, Result};
