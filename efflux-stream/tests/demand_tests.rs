// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use efflux_stream::Flux;
use efflux_test_utils::TestSubscriber;

#[test]
fn nothing_flows_before_the_first_request() {
    let probe = TestSubscriber::manual();

    Flux::range(1, 10).subscribe_with(probe.clone());

    assert_eq!(probe.count(), 0);
    assert!(!probe.is_terminated());
}

#[test]
fn each_request_yields_exactly_that_many_items() {
    let probe = TestSubscriber::manual();
    Flux::range(1, 10).subscribe_with(probe.clone());

    probe.request(2);
    assert_eq!(probe.values(), vec![1, 2]);

    probe.request(3);
    assert_eq!(probe.values(), vec![1, 2, 3, 4, 5]);

    probe.request(5);
    assert_eq!(probe.values(), (1..=10).collect::<Vec<_>>());
    assert!(probe.is_completed());
}

#[test]
fn completion_does_not_wait_for_extra_demand() {
    let probe = TestSubscriber::with_initial_demand(3);

    Flux::range(1, 3).subscribe_with(probe.clone());

    // The last item and on_complete arrive together.
    assert_eq!(probe.values(), vec![1, 2, 3]);
    assert!(probe.is_completed());
}

#[test]
fn empty_source_completes_on_first_request() {
    let probe = TestSubscriber::<i32>::manual();
    Flux::empty().subscribe_with(probe.clone());

    assert!(!probe.is_terminated());

    probe.request(1);
    assert!(probe.is_completed());
}

#[test]
fn cancellation_stops_a_partly_drained_sequence() {
    let probe = TestSubscriber::manual();
    Flux::range(1, 100).subscribe_with(probe.clone());

    probe.request(4);
    probe.cancel();
    probe.request(10);

    assert_eq!(probe.values(), vec![1, 2, 3, 4]);
    assert!(!probe.is_terminated());
}

#[test]
fn cancelling_twice_is_harmless() {
    let probe = TestSubscriber::manual();
    Flux::range(1, 10).subscribe_with(probe.clone());

    probe.request(1);
    probe.cancel();
    probe.cancel();

    assert_eq!(probe.values(), vec![1]);
    assert!(!probe.is_terminated());
}

#[test]
fn independent_subscriptions_do_not_share_position() {
    let source = Flux::range(1, 5);

    let first = TestSubscriber::with_initial_demand(2);
    source.subscribe_with(first.clone());

    let second = TestSubscriber::unbounded();
    source.subscribe_with(second.clone());

    assert_eq!(first.values(), vec![1, 2]);
    assert_eq!(second.values(), vec![1, 2, 3, 4, 5]);
}

#[test]
fn limit_rate_paces_an_unbounded_downstream() {
    let probe = TestSubscriber::unbounded();

    Flux::range(1, 50).limit_rate(8).subscribe_with(probe.clone());

    assert_eq!(probe.values(), (1..=50).collect::<Vec<_>>());
    assert!(probe.is_completed());
}
