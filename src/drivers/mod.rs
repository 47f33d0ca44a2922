//! Board-facing drivers: the tick source and the digital pin bank.

pub mod pin_bank;
pub mod tick_source;
