// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::sync::Arc;

use efflux_core::FluxError;
use efflux_exec::SubscribeExt;
use efflux_stream::{Flux, Mono};
use parking_lot::Mutex;

#[test]
fn bounded_batches_drain_the_whole_range() {
    let seen: Arc<Mutex<Vec<i64>>> = Arc::new(Mutex::new(Vec::new()));

    let sink = seen.clone();
    Flux::range(1, 10).subscribe_bounded(2, move |n| sink.lock().push(n));

    assert_eq!(*seen.lock(), (1..=10).collect::<Vec<_>>());
}

#[test]
fn producer_stays_within_the_batch_window() {
    let emitted: Arc<Mutex<Vec<i64>>> = Arc::new(Mutex::new(Vec::new()));
    let consumed: Arc<Mutex<Vec<i64>>> = Arc::new(Mutex::new(Vec::new()));

    let upstream = emitted.clone();
    let downstream = consumed.clone();
    Flux::range(1, 9)
        .tap(move |n| upstream.lock().push(*n))
        .subscribe_bounded(3, move |n| downstream.lock().push(n));

    // With a synchronous source each batch is produced and consumed in
    // lockstep, so both sides see the full ordered range.
    assert_eq!(*emitted.lock(), (1..=9).collect::<Vec<_>>());
    assert_eq!(*consumed.lock(), (1..=9).collect::<Vec<_>>());
}

#[test]
fn zero_batch_is_promoted_to_one() {
    let seen: Arc<Mutex<Vec<i64>>> = Arc::new(Mutex::new(Vec::new()));

    let sink = seen.clone();
    Flux::range(1, 3).subscribe_bounded(0, move |n| sink.lock().push(n));

    assert_eq!(*seen.lock(), vec![1, 2, 3]);
}

#[test]
fn subscribe_drains_with_unbounded_demand() {
    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

    let sink = seen.clone();
    Flux::from_iter(["ada", "grace"])
        .map(|name| name.to_uppercase())
        .subscribe(move |name| sink.lock().push(name));

    assert_eq!(*seen.lock(), vec!["ADA".to_string(), "GRACE".to_string()]);
}

#[test]
fn callbacks_observe_completion() {
    let completed = Arc::new(Mutex::new(false));

    let flag = completed.clone();
    Flux::range(1, 3).subscribe_callbacks(
        |_| {},
        |_| panic!("unexpected error"),
        move || *flag.lock() = true,
    );

    assert!(*completed.lock());
}

#[test]
fn callbacks_observe_the_error() {
    let failure: Arc<Mutex<Option<FluxError>>> = Arc::new(Mutex::new(None));
    let items: Arc<Mutex<u32>> = Arc::new(Mutex::new(0));

    let slot = failure.clone();
    let counter = items.clone();
    Flux::<i64>::error(FluxError::source("backing store offline")).subscribe_callbacks(
        move |_| *counter.lock() += 1,
        move |error| *slot.lock() = Some(error),
        || panic!("errored stream must not complete"),
    );

    assert_eq!(*items.lock(), 0);
    assert!(matches!(*failure.lock(), Some(FluxError::Source { .. })));
}

#[test]
fn mono_subscribes_through_the_same_surface() {
    let seen: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

    let sink = seen.clone();
    Mono::just("solo").subscribe(move |s| *sink.lock() = Some(s.to_string()));

    assert_eq!(seen.lock().as_deref(), Some("solo"));
}

#[test]
fn kept_subscription_can_cancel_later() {
    let seen: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));

    let emitter_slot = Arc::new(Mutex::new(None));
    let slot = emitter_slot.clone();
    let source = Flux::create(move |emitter| {
        *slot.lock() = Some(emitter);
    });

    let sink = seen.clone();
    let subscription = source.subscribe(move |n| sink.lock().push(n));

    let emitter = emitter_slot.lock().take().unwrap();
    emitter.next(1);
    subscription.cancel();
    emitter.next(2);

    assert_eq!(*seen.lock(), vec![1]);
    assert!(emitter.is_cancelled());
}
