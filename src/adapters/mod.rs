//! Host adapters: concrete implementations of the board-facing traits for
//! simulation and tests.
//!
//! | Adapter         | Implements                      | Stands in for        |
//! |-----------------|---------------------------------|----------------------|
//! | `sim_pin`       | OutputPin, StatefulOutputPin    | GPIO output          |
//! | `thread_ticker` | TickSource                      | SysTick interrupt    |

pub mod sim_pin;
pub mod thread_ticker;

pub use sim_pin::SimPin;
pub use thread_ticker::ThreadTickSource;
