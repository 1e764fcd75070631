// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::time::{Duration, Instant};

use efflux_core::FluxError;
use efflux_stream::Flux;
use efflux_test_utils::TestSubscriber;
use efflux_time::{delay_with, DelayElementsExt, Scheduler};

const PATIENCE: Duration = Duration::from_secs(10);

#[test]
fn delay_emits_zero_after_the_duration() {
    let scheduler = Scheduler::new("one-shot");
    let probe = TestSubscriber::unbounded();

    delay_with(Duration::from_millis(50), &scheduler).subscribe_with(probe.clone());

    assert!(probe.await_terminal(PATIENCE));
    assert_eq!(probe.values(), vec![0]);
    assert!(probe.is_completed());
}

#[test]
fn delay_does_not_fire_early() {
    let scheduler = Scheduler::new("patient");
    let probe = TestSubscriber::unbounded();

    delay_with(Duration::from_millis(300), &scheduler).subscribe_with(probe.clone());

    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(probe.count(), 0);

    assert!(probe.await_terminal(PATIENCE));
    assert_eq!(probe.values(), vec![0]);
}

#[test]
fn elapsed_deadline_still_waits_for_demand() {
    let scheduler = Scheduler::new("held");
    let probe: TestSubscriber<u64> = TestSubscriber::manual();

    delay_with(Duration::from_millis(20), &scheduler).subscribe_with(probe.clone());

    std::thread::sleep(Duration::from_millis(200));
    assert_eq!(probe.count(), 0);
    assert!(!probe.is_terminated());

    probe.request(1);
    assert!(probe.await_terminal(PATIENCE));
    assert_eq!(probe.values(), vec![0]);
}

#[test]
fn cancelling_before_the_deadline_suppresses_the_value() {
    let scheduler = Scheduler::new("cut-short");
    let probe = TestSubscriber::unbounded();

    delay_with(Duration::from_millis(50), &scheduler).subscribe_with(probe.clone());
    probe.cancel();

    std::thread::sleep(Duration::from_millis(250));
    assert_eq!(probe.count(), 0);
    assert!(!probe.is_terminated());
}

#[test]
fn delayed_elements_keep_their_order() {
    let scheduler = Scheduler::new("paced");
    let probe = TestSubscriber::unbounded();

    Flux::range(0, 5)
        .delay_elements_with(Duration::from_millis(20), &scheduler)
        .subscribe_with(probe.clone());

    assert!(probe.await_terminal(PATIENCE));
    assert_eq!(probe.values(), vec![0, 1, 2, 3, 4]);
    assert!(probe.is_completed());
}

#[test]
fn delayed_elements_are_spaced_by_the_delay() {
    let scheduler = Scheduler::new("not-early");
    let probe = TestSubscriber::unbounded();
    let started = Instant::now();

    Flux::range(0, 3)
        .delay_elements_with(Duration::from_millis(100), &scheduler)
        .subscribe_with(probe.clone());

    assert!(probe.await_count(1, PATIENCE));
    assert!(started.elapsed() >= Duration::from_millis(100));

    // One item per delay window: the second cannot land before 2x.
    assert!(probe.await_count(2, PATIENCE));
    assert!(started.elapsed() >= Duration::from_millis(200));
}

#[test]
fn completion_waits_for_items_in_flight() {
    let scheduler = Scheduler::new("lagging-tail");
    let probe = TestSubscriber::unbounded();

    // The upstream finishes immediately; the completion signal must still
    // trail the last delayed item.
    Flux::range(0, 4)
        .delay_elements_with(Duration::from_millis(50), &scheduler)
        .subscribe_with(probe.clone());

    assert!(probe.await_terminal(PATIENCE));
    assert_eq!(probe.count(), 4);
    assert!(probe.is_completed());
}

#[test]
fn empty_upstream_completes_without_waiting() {
    let scheduler = Scheduler::new("dry");
    let probe: TestSubscriber<i64> = TestSubscriber::unbounded();

    Flux::empty()
        .delay_elements_with(Duration::from_millis(200), &scheduler)
        .subscribe_with(probe.clone());

    // The pull finds no item, so completion must not wait out a delay.
    assert!(probe.await_terminal(Duration::from_millis(100)));
    assert!(probe.is_completed());
    assert_eq!(probe.count(), 0);
}

#[test]
fn errors_skip_the_delay_queue() {
    let scheduler = Scheduler::new("error-fast-path");
    let probe: TestSubscriber<i64> = TestSubscriber::unbounded();

    let source = Flux::create(|emitter| {
        emitter.next(1);
        emitter.error(FluxError::source("feed dropped"));
    });
    source
        .delay_elements_with(Duration::from_millis(500), &scheduler)
        .subscribe_with(probe.clone());

    // The error arrives well before the item's deadline; the item mid-delay
    // is dropped with its timer task.
    assert!(probe.await_error(Duration::from_millis(400)));
    assert_eq!(probe.count(), 0);

    std::thread::sleep(Duration::from_millis(700));
    assert_eq!(probe.count(), 0);
}

#[test]
fn cancellation_drops_items_in_flight() {
    let scheduler = Scheduler::new("dropped");
    let probe = TestSubscriber::unbounded();

    Flux::range(0, 100)
        .delay_elements_with(Duration::from_millis(100), &scheduler)
        .subscribe_with(probe.clone());
    probe.cancel();

    std::thread::sleep(Duration::from_millis(400));
    assert_eq!(probe.count(), 0);
    assert!(!probe.is_terminated());
}
