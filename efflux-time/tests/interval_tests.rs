// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::time::Duration;

use efflux_core::FluxError;
use efflux_test_utils::TestSubscriber;
use efflux_time::{interval_with, Scheduler};

const PERIOD: Duration = Duration::from_millis(10);
const PATIENCE: Duration = Duration::from_secs(10);

#[test]
fn ticks_count_up_from_zero() {
    let scheduler = Scheduler::new("ticks");
    let probe = TestSubscriber::unbounded();

    interval_with(PERIOD, PERIOD, &scheduler).subscribe_with(probe.clone());

    assert!(probe.await_count(5, PATIENCE));
    probe.cancel();
    assert_eq!(&probe.values()[..5], &[0, 1, 2, 3, 4]);
}

#[test]
fn tick_without_demand_fails_with_overflow() {
    let scheduler = Scheduler::new("starved");
    let probe: TestSubscriber<u64> = TestSubscriber::manual();

    interval_with(PERIOD, PERIOD, &scheduler).subscribe_with(probe.clone());

    assert!(probe.await_error(PATIENCE));
    assert_eq!(probe.count(), 0);
    assert!(matches!(probe.error(), Some(FluxError::Overflow { .. })));
}

#[test]
fn bounded_demand_is_honored_until_exhausted() {
    let scheduler = Scheduler::new("bounded");
    let probe = TestSubscriber::with_initial_demand(3);

    interval_with(PERIOD, PERIOD, &scheduler).subscribe_with(probe.clone());

    assert!(probe.await_error(PATIENCE));
    assert_eq!(probe.values(), vec![0, 1, 2]);
    assert!(matches!(probe.error(), Some(FluxError::Overflow { .. })));
}

#[test]
fn cancellation_stops_the_ticks() {
    let scheduler = Scheduler::new("cancelled");
    let probe = TestSubscriber::unbounded();

    interval_with(PERIOD, PERIOD, &scheduler).subscribe_with(probe.clone());

    assert!(probe.await_count(2, PATIENCE));
    probe.cancel();

    // A tick already past the demand check may still land; after that the
    // count must not move again.
    std::thread::sleep(PERIOD * 5);
    let settled = probe.count();
    std::thread::sleep(PERIOD * 10);
    assert_eq!(probe.count(), settled);
    assert!(!probe.is_terminated());
}

#[test]
fn subscriptions_tick_independently() {
    let scheduler = Scheduler::new("independent");
    let ticks = interval_with(PERIOD, PERIOD, &scheduler);

    let first = TestSubscriber::unbounded();
    ticks.subscribe_with(first.clone());
    assert!(first.await_count(3, PATIENCE));

    // The second subscriber starts its own counter at zero.
    let second = TestSubscriber::unbounded();
    ticks.subscribe_with(second.clone());
    assert!(second.await_count(3, PATIENCE));

    first.cancel();
    second.cancel();
    assert_eq!(&second.values()[..3], &[0, 1, 2]);
}

#[test]
fn initial_delay_holds_back_the_first_tick() {
    let scheduler = Scheduler::new("warmup");
    let probe = TestSubscriber::unbounded();

    interval_with(Duration::from_millis(300), PERIOD, &scheduler).subscribe_with(probe.clone());

    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(probe.count(), 0);

    assert!(probe.await_count(1, PATIENCE));
    probe.cancel();
}
