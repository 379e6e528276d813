use lathe_core::{Dispatch, DeviceStatus, Dispatcher, FixedSequence, Lathe};
use lathe_sim::console::build_commands;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn console(start_enabled: bool) -> (Dispatcher, Rc<RefCell<Lathe<FixedSequence>>>) {
    let device = Rc::new(RefCell::new(Lathe::new(
        FixedSequence::constant(0.5),
        start_enabled,
    )));
    let running = Rc::new(Cell::new(true));
    let actions = build_commands(Rc::clone(&device), Rc::clone(&running)).unwrap();
    let dispatcher = Dispatcher::new(actions, running).unwrap();
    (dispatcher, device)
}

#[test]
fn full_operator_session() {
    let (dispatcher, device) = console(false);
    assert_eq!(device.borrow().status(), DeviceStatus::Disabled);

    assert_eq!(dispatcher.dispatch("enable"), Dispatch::Handled);
    assert_eq!(device.borrow().status(), DeviceStatus::Enabled);

    assert_eq!(dispatcher.dispatch("produce 5"), Dispatch::Handled);
    assert_eq!(device.borrow().produced(), 5);

    assert_eq!(dispatcher.dispatch("fail"), Dispatch::Handled);
    assert_eq!(device.borrow().status(), DeviceStatus::Failure);
    assert!(!device.borrow().enabled());

    assert_eq!(dispatcher.dispatch("enable"), Dispatch::Handled);
    assert_eq!(device.borrow().status(), DeviceStatus::Enabled);
    assert!(!device.borrow().failure());
    assert_eq!(device.borrow().produced(), 5);

    assert_eq!(dispatcher.dispatch("reset"), Dispatch::Handled);
    assert_eq!(device.borrow().produced(), 0);
    assert_eq!(device.borrow().rejected(), 0);
}

#[test]
fn unknown_command_changes_nothing() {
    let (dispatcher, device) = console(true);
    dispatcher.dispatch("produce 2");

    assert_eq!(dispatcher.dispatch("xyz"), Dispatch::Unknown);
    assert_eq!(device.borrow().status(), DeviceStatus::Enabled);
    assert_eq!(device.borrow().produced(), 2);
    assert!(dispatcher.is_running());
}

#[test]
fn stop_matches_case_insensitively() {
    let (dispatcher, _device) = console(true);
    assert_eq!(dispatcher.dispatch("STOP"), Dispatch::Handled);
    assert!(!dispatcher.is_running());
}

#[test]
fn toggle_flips_the_run_state() {
    let (dispatcher, device) = console(false);

    dispatcher.dispatch("toggle");
    assert!(device.borrow().enabled());

    dispatcher.dispatch("toggle");
    assert!(!device.borrow().enabled());
}

#[test]
fn produce_rejects_bad_repeat_counts() {
    let (dispatcher, device) = console(true);

    assert_eq!(
        dispatcher.dispatch("produce abc"),
        Dispatch::Failed("abc is not a number".to_string())
    );
    assert_eq!(
        dispatcher.dispatch("produce -1"),
        Dispatch::Failed("-1 is negative".to_string())
    );
    assert_eq!(
        dispatcher.dispatch("produce 1 2"),
        Dispatch::Failed("Too many argument. Maximum required: 1. Got: 2".to_string())
    );
    assert_eq!(device.borrow().produced(), 0);
}

#[test]
fn bare_produce_counts_exactly_once() {
    let (dispatcher, device) = console(true);
    assert_eq!(dispatcher.dispatch("produce"), Dispatch::Handled);
    assert_eq!(device.borrow().produced(), 1);
}

#[test]
fn counters_stay_put_while_disabled() {
    let (dispatcher, device) = console(false);

    assert_eq!(dispatcher.dispatch("produce 3"), Dispatch::Handled);
    assert_eq!(dispatcher.dispatch("reject"), Dispatch::Handled);
    assert_eq!(device.borrow().produced(), 0);
    assert_eq!(device.borrow().rejected(), 0);
}

#[test]
fn help_and_status_are_available() {
    let (dispatcher, _device) = console(true);
    assert_eq!(dispatcher.dispatch("help"), Dispatch::Handled);
    assert_eq!(dispatcher.dispatch("status"), Dispatch::Handled);
}

#[test]
fn fractional_repeat_counts_round_up() {
    let (dispatcher, device) = console(true);
    assert_eq!(dispatcher.dispatch("produce 2.5"), Dispatch::Handled);
    assert_eq!(device.borrow().produced(), 3);
}
