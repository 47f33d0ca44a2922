//! Fuzz target: table-driven machine fed arbitrary event streams.
//!
//! Verifies:
//! - No panics
//! - A refused event never changes the state
//! - An accepted event lands exactly on the row's target
//!
//! cargo fuzz run fuzz_machine

#![no_main]

use libfuzzer_sys::fuzz_target;
use maquina::events::Event;
use maquina::fsm::{Maquina, Transition};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum St {
    Idle,
    Armed,
    Firing,
    Fault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ev {
    Nulo,
    Arm,
    Fire,
    Done,
    Trip,
    Clear,
}

impl Event for Ev {
    const NULL: Self = Ev::Nulo;
}

const EVENTS: [Ev; 6] = [Ev::Nulo, Ev::Arm, Ev::Fire, Ev::Done, Ev::Trip, Ev::Clear];

const TABLE: [Transition<'static, St, Ev>; 6] = [
    Transition::new(St::Idle, Ev::Arm, St::Armed, &[]),
    Transition::new(St::Armed, Ev::Fire, St::Firing, &[]),
    Transition::new(St::Firing, Ev::Done, St::Idle, &[]),
    Transition::new(St::Armed, Ev::Trip, St::Fault, &[]),
    Transition::new(St::Firing, Ev::Trip, St::Fault, &[]),
    Transition::new(St::Fault, Ev::Clear, St::Idle, &[]),
];

fuzz_target!(|data: &[u8]| {
    let mut machine = Maquina::new("fuzz", &TABLE, St::Idle);

    for byte in data {
        let event = EVENTS[usize::from(*byte) % EVENTS.len()];
        let before = machine.state();
        let row = TABLE.iter().find(|r| r.from == before && r.event == event);
        match machine.process_event(event) {
            Ok(after) => {
                let row = row.expect("accepted event without a row");
                assert_eq!(after, row.to);
            }
            Err(_) => {
                assert!(row.is_none() || event.is_null());
                assert_eq!(machine.state(), before);
            }
        }
    }
});
