// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use efflux_core::FluxError;
use efflux_stream::Flux;
use efflux_test_utils::test_data::{everyone, User};
use efflux_test_utils::TestSubscriber;

#[test]
fn map_transforms_every_item_in_order() {
    let probe = TestSubscriber::unbounded();

    Flux::from_iter(everyone())
        .map(|user: User| user.full_name().to_uppercase())
        .subscribe_with(probe.clone());

    assert_eq!(
        probe.values(),
        vec![
            "ALICE MOREAU".to_string(),
            "BRUNO DIAZ".to_string(),
            "CARLA SANTOS".to_string(),
            "DIEGO FUENTES".to_string(),
        ]
    );
    assert!(probe.is_completed());
}

#[test]
fn map_preserves_bounded_demand() {
    let probe = TestSubscriber::with_initial_demand(2);

    Flux::range(1, 10).map(|n| n * 2).subscribe_with(probe.clone());

    assert_eq!(probe.values(), vec![2, 4]);
    assert!(!probe.is_terminated());

    probe.request(8);
    assert_eq!(probe.count(), 10);
    assert!(probe.is_completed());
}

#[test]
fn try_map_cuts_the_sequence_at_the_failing_item() {
    let probe = TestSubscriber::unbounded();

    Flux::from_iter(["2", "7", "x", "9"])
        .try_map(|raw: &str| {
            raw.parse::<i32>()
                .map_err(|_| FluxError::processing(format!("not a number: {raw}")))
        })
        .subscribe_with(probe.clone());

    // Items mapped before the failure stay delivered; nothing follows it.
    assert_eq!(probe.values(), vec![2, 7]);
    assert!(probe.error().is_some());
    assert!(!probe.is_completed());
}

#[test]
fn try_map_error_reaches_a_downstream_stage_once() {
    let probe = TestSubscriber::unbounded();

    Flux::range(1, 5)
        .try_map(|n| {
            if n == 3 {
                Err(FluxError::processing("rejected"))
            } else {
                Ok(n)
            }
        })
        .map(|n| n * 10)
        .subscribe_with(probe.clone());

    assert_eq!(probe.values(), vec![10, 20]);
    let errors = probe
        .signals()
        .iter()
        .filter(|signal| signal.is_error())
        .count();
    assert_eq!(errors, 1);
}

#[test]
fn map_errors_propagate_from_the_source() {
    let probe = TestSubscriber::<String>::unbounded();

    Flux::<i32>::error(FluxError::source("unreachable"))
        .map(|n| n.to_string())
        .subscribe_with(probe.clone());

    assert!(probe.error().is_some());
    assert_eq!(probe.count(), 0);
}
