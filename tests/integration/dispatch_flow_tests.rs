//! Integration tests: events dispatched from one machine's transition into
//! another machine, directly and through a deferred queue.

use maquina::Error;
use maquina::action::{Action, DispatchAction, DispatchStatus, PinAction, PinLevel};
use maquina::drivers::pin_bank::{PinBank, PinHandle};
use maquina::events::{Event, EventQueue, EventTarget};
use maquina::fsm::{Maquina, SharedMachine, Transition};

use crate::mock_hw::{Ev, MockPin, RecordingTarget, St};

// ── M --EventA--> S1 posts EventB into N ──────────────────────

#[test]
fn transition_action_dispatches_into_second_machine() {
    let n_table = [Transition::new(St::S0, Ev::EventB, St::S2, &[])];
    let n = SharedMachine::new(Maquina::new("n", &n_table, St::S0));

    let notify = DispatchAction::new();
    notify.init(Ev::EventB, &n).unwrap();
    let m_actions: [&dyn Action; 1] = [notify.as_action()];
    let m_table = [Transition::new(St::S0, Ev::EventA, St::S1, &m_actions)];
    let mut m = Maquina::new("m", &m_table, St::S0);

    assert_eq!(m.process_event(Ev::EventA), Ok(St::S1));
    assert_eq!(notify.status(), DispatchStatus::Dispatched);
    assert_eq!(n.state(), Some(St::S2));
}

#[test]
fn undefined_row_in_target_marks_dispatch_failed() {
    // N only reacts to EventC, so EventB is refused.
    let n_table = [Transition::new(St::S0, Ev::EventC, St::S2, &[])];
    let n = SharedMachine::new(Maquina::new("n", &n_table, St::S0));

    let notify = DispatchAction::new();
    notify.init(Ev::EventB, &n).unwrap();
    let m_actions: [&dyn Action; 1] = [notify.as_action()];
    let m_table = [Transition::new(St::S0, Ev::EventA, St::S1, &m_actions)];
    let mut m = Maquina::new("m", &m_table, St::S0);

    // The failing action does not stop M's own transition.
    assert_eq!(m.process_event(Ev::EventA), Ok(St::S1));
    assert_eq!(notify.status(), DispatchStatus::Failed);
    assert_eq!(n.state(), Some(St::S0));
    assert_eq!(n.with(|machine| machine.events_rejected()), Ok(1));
}

#[test]
fn direct_execute_reports_target_outcome() {
    let n_table = [Transition::new(St::S0, Ev::EventB, St::S1, &[])];
    let n = SharedMachine::new(Maquina::new("n", &n_table, St::S0));
    let notify = DispatchAction::new();
    notify.init(Ev::EventB, &n).unwrap();

    assert_eq!(notify.as_action().execute(), Ok(()));
    assert_eq!(
        notify.as_action().execute(),
        Err(Error::UnhandledTransition)
    );
    assert_eq!(notify.status(), DispatchStatus::Failed);
}

// ── Lifecycle ─────────────────────────────────────────────────

#[test]
fn init_execute_deinit_lifecycle() {
    let target = RecordingTarget::new();
    let notify = DispatchAction::new();
    assert_eq!(notify.event(), Ev::NULL);
    assert_eq!(notify.as_action().execute(), Err(Error::NotInitialized));
    assert_eq!(notify.status(), DispatchStatus::Uninitialized);

    notify.init(Ev::EventC, &target).unwrap();
    assert_eq!(notify.status(), DispatchStatus::NotDispatched);
    assert_eq!(notify.event(), Ev::EventC);

    for _ in 0..3 {
        notify.as_action().execute().unwrap();
        assert_eq!(notify.status(), DispatchStatus::Dispatched);
    }
    assert_eq!(target.seen(), [Ev::EventC; 3]);

    notify.deinit();
    assert_eq!(notify.status(), DispatchStatus::Uninitialized);
    assert!(notify.event().is_null());

    // A fresh configuration is accepted after teardown.
    notify.init(Ev::EventA, &target).unwrap();
    assert_eq!(notify.event(), Ev::EventA);
}

#[test]
fn reinit_without_deinit_keeps_first_configuration() {
    let first = RecordingTarget::new();
    let second = RecordingTarget::new();
    let notify = DispatchAction::new();
    notify.init(Ev::EventA, &first).unwrap();

    assert_eq!(
        notify.init(Ev::EventB, &second),
        Err(Error::AlreadyInitialized)
    );
    notify.as_action().execute().unwrap();
    assert_eq!(first.seen(), [Ev::EventA]);
    assert!(second.seen().is_empty());
}

// ── Deferred delivery ─────────────────────────────────────────

#[test]
fn queue_defers_event_until_pumped() {
    let n_table = [Transition::new(St::S0, Ev::EventB, St::S1, &[])];
    let n = SharedMachine::new(Maquina::new("n", &n_table, St::S0));
    let queue: EventQueue<Ev, 4> = EventQueue::new();

    let notify = DispatchAction::new();
    notify.init(Ev::EventB, &queue).unwrap();
    let m_actions: [&dyn Action; 1] = [notify.as_action()];
    let m_table = [Transition::new(St::S0, Ev::EventA, St::S1, &m_actions)];
    let mut m = Maquina::new("m", &m_table, St::S0);

    m.process_event(Ev::EventA).unwrap();
    // Accepted by the queue, not yet seen by N.
    assert_eq!(notify.status(), DispatchStatus::Dispatched);
    assert_eq!(n.state(), Some(St::S0));
    assert_eq!(queue.len(), 1);

    assert_eq!(queue.pump_into(&n), 1);
    assert_eq!(n.state(), Some(St::S1));
    assert!(queue.is_empty());
}

#[test]
fn full_queue_marks_dispatch_failed() {
    let queue: EventQueue<Ev, 1> = EventQueue::new();
    let notify = DispatchAction::new();
    notify.init(Ev::EventA, &queue).unwrap();

    notify.as_action().execute().unwrap();
    assert_eq!(
        notify.as_action().execute(),
        Err(Error::ResourceExhausted)
    );
    assert_eq!(notify.status(), DispatchStatus::Failed);
    assert_eq!(queue.len(), 1);
}

#[test]
fn queue_breaks_self_dispatch_cycle() {
    // S0 --EventA--> S1 wants to follow up with EventB on the same machine.
    // Posting directly would find the machine busy; the queue defers it.
    let queue: EventQueue<Ev, 2> = EventQueue::new();
    let follow_up = DispatchAction::new();
    follow_up.init(Ev::EventB, &queue).unwrap();
    let actions: [&dyn Action; 1] = [follow_up.as_action()];
    let table = [
        Transition::new(St::S0, Ev::EventA, St::S1, &actions),
        Transition::new(St::S1, Ev::EventB, St::S2, &[]),
    ];
    let machine = SharedMachine::new(Maquina::new("self", &table, St::S0));

    machine.post(Ev::EventA).unwrap();
    assert_eq!(machine.state(), Some(St::S1));
    queue.pump_into(&machine);
    assert_eq!(machine.state(), Some(St::S2));
}

// ── Pin actions in a table ────────────────────────────────────

#[test]
fn pin_actions_follow_transitions() {
    let bank = PinBank::new([MockPin::new(), MockPin::new()]);
    let on = PinAction::new(&bank, PinHandle(1), PinLevel::High);
    let off = PinAction::new(&bank, PinHandle(1), PinLevel::Low);
    let flip = PinAction::new(&bank, PinHandle(0), PinLevel::Toggle);
    let enter: [&dyn Action; 2] = [&on, &flip];
    let leave: [&dyn Action; 1] = [&off];
    let table = [
        Transition::new(St::S0, Ev::EventA, St::S1, &enter),
        Transition::new(St::S1, Ev::EventB, St::S0, &leave),
    ];
    let mut m = Maquina::new("lamp", &table, St::S0);

    m.process_event(Ev::EventA).unwrap();
    assert_eq!(bank.is_set_high(PinHandle(1)), Ok(true));
    assert_eq!(bank.is_set_high(PinHandle(0)), Ok(true));

    m.process_event(Ev::EventB).unwrap();
    assert_eq!(bank.is_set_high(PinHandle(1)), Ok(false));
    assert_eq!(bank.with_pin(PinHandle(1), |p| p.writes.clone()), Ok(vec![true, false]));
}

#[test]
fn pin_failures_do_not_block_transitions() {
    let bank = PinBank::new([MockPin::broken()]);
    let stray = PinAction::new(&bank, PinHandle(3), PinLevel::High);
    let broken = PinAction::new(&bank, PinHandle(0), PinLevel::High);
    assert_eq!(stray.execute(), Err(Error::InvalidHandle));
    assert_eq!(broken.execute(), Err(Error::Pin));

    let actions: [&dyn Action; 2] = [&stray, &broken];
    let table = [Transition::new(St::S0, Ev::EventA, St::S1, &actions)];
    let mut m = Maquina::new("faulty", &table, St::S0);
    assert_eq!(m.process_event(Ev::EventA), Ok(St::S1));
    assert_eq!(bank.with_pin(PinHandle(0), |p| p.writes.len()), Ok(0));
}
