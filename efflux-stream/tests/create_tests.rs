// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::sync::Arc;

use efflux_core::FluxError;
use efflux_stream::{Emitter, Flux};
use efflux_test_utils::TestSubscriber;
use parking_lot::Mutex;

/// Builds a create-source and hands its emitter out of the producer closure,
/// so the test can drive the stream after subscription.
fn manual_source<T: Send + 'static>() -> (Flux<T>, Arc<Mutex<Option<Emitter<T>>>>) {
    let held: Arc<Mutex<Option<Emitter<T>>>> = Arc::new(Mutex::new(None));
    let slot = held.clone();
    let flux = Flux::create(move |emitter| {
        *slot.lock() = Some(emitter);
    });
    (flux, held)
}

#[test]
fn synchronous_producer_feeds_an_unbounded_subscriber() {
    let probe = TestSubscriber::unbounded();

    Flux::create(|emitter| {
        for n in 1..=5 {
            emitter.next(n);
        }
        emitter.complete();
    })
    .subscribe_with(probe.clone());

    assert_eq!(probe.values(), vec![1, 2, 3, 4, 5]);
    assert!(probe.is_completed());
}

#[test]
fn items_ahead_of_demand_are_buffered() {
    let (flux, held) = manual_source();
    let probe = TestSubscriber::manual();
    flux.subscribe_with(probe.clone());

    let emitter = held.lock().clone().expect("producer ran at subscribe");
    emitter.next(1);
    emitter.next(2);
    emitter.next(3);
    assert_eq!(probe.count(), 0);

    probe.request(2);
    assert_eq!(probe.values(), vec![1, 2]);

    probe.request(5);
    assert_eq!(probe.values(), vec![1, 2, 3]);
    assert!(!probe.is_terminated());
}

#[test]
fn pending_terminal_waits_for_buffered_items() {
    let (flux, held) = manual_source();
    let probe = TestSubscriber::manual();
    flux.subscribe_with(probe.clone());

    let emitter = held.lock().clone().expect("producer ran at subscribe");
    emitter.next("first");
    emitter.complete();
    assert!(!probe.is_terminated());

    probe.request(1);
    assert_eq!(probe.values(), vec!["first"]);
    assert!(probe.is_completed());
}

#[test]
fn error_at_five_cuts_the_sequence_with_one_terminal() {
    let probe = TestSubscriber::unbounded();

    Flux::create(|emitter| {
        for n in 1..=10 {
            if emitter.is_cancelled() {
                return;
            }
            emitter.next(n);
            if n == 5 {
                emitter.error(FluxError::source("stopped at five"));
            }
        }
        emitter.complete();
    })
    .subscribe_with(probe.clone());

    assert_eq!(probe.values(), vec![1, 2, 3, 4, 5]);
    assert!(probe.error().is_some());
    let terminals = probe
        .signals()
        .iter()
        .filter(|signal| signal.is_terminal())
        .count();
    assert_eq!(terminals, 1);
}

#[test]
fn signals_after_cancellation_are_dropped() {
    let (flux, held) = manual_source();
    let probe = TestSubscriber::unbounded();
    flux.subscribe_with(probe.clone());

    let emitter = held.lock().clone().expect("producer ran at subscribe");
    emitter.next(1);
    probe.cancel();
    assert!(emitter.is_cancelled());

    emitter.next(2);
    emitter.error(FluxError::source("too late"));
    emitter.complete();

    assert_eq!(probe.values(), vec![1]);
    assert!(!probe.is_terminated());
}

#[test]
fn first_terminal_wins_over_later_ones() {
    let probe = TestSubscriber::<i32>::unbounded();

    Flux::create(|emitter: Emitter<i32>| {
        emitter.complete();
        emitter.error(FluxError::source("after the fact"));
        emitter.next(9);
    })
    .subscribe_with(probe.clone());

    assert!(probe.is_completed());
    assert!(probe.error().is_none());
    assert_eq!(probe.count(), 0);
}

#[test]
fn emitter_works_from_another_thread() {
    let probe = TestSubscriber::unbounded();

    Flux::create(|emitter| {
        std::thread::spawn(move || {
            for n in 0..4 {
                emitter.next(n);
            }
            emitter.complete();
        });
    })
    .subscribe_with(probe.clone());

    assert!(probe.await_terminal(std::time::Duration::from_secs(5)));
    assert_eq!(probe.values(), vec![0, 1, 2, 3]);
}
