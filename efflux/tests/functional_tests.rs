// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! End-to-end pipelines through the facade, the way an application would
//! compose them.

use std::sync::Arc;
use std::time::Duration;

use efflux::prelude::*;
use efflux_test_utils::test_data::{everyone, greeting_comments, User, UserComments};
use efflux_test_utils::TestSubscriber;
use futures::StreamExt;
use parking_lot::Mutex;

const PATIENCE: Duration = Duration::from_secs(10);

#[test]
fn full_names_pipeline_drains_in_order() {
    let full_names = Flux::from_iter(everyone())
        .map(|user| user.full_name())
        .collect_list()
        .block(PATIENCE)
        .unwrap()
        .unwrap();

    assert_eq!(full_names.len(), 4);
    assert_eq!(full_names[0], everyone()[0].full_name());
}

#[test]
fn users_fan_out_to_their_comments() {
    let expanded = Flux::from_iter(everyone())
        .flat_map(|user: User| {
            Flux::from_iter(greeting_comments()).map(move |comment| UserComments {
                user: user.clone(),
                comments: vec![comment],
            })
        })
        .collect_list()
        .block(PATIENCE)
        .unwrap()
        .unwrap();

    assert_eq!(expanded.len(), 4 * 3);
}

#[test]
fn retry_recovers_a_flaky_pipeline() {
    let attempts = Arc::new(Mutex::new(0u32));

    let counter = attempts.clone();
    let flaky = Flux::create(move |emitter: Emitter<i64>| {
        let mut attempts = counter.lock();
        *attempts += 1;
        if *attempts < 3 {
            emitter.error(FluxError::source("transient outage"));
        } else {
            emitter.next(7);
            emitter.complete();
        }
    });

    let value = flaky.retry(5).block_last(PATIENCE).unwrap();

    assert_eq!(value, Some(7));
    assert_eq!(*attempts.lock(), 3);
}

#[test]
fn interval_zip_paces_a_name_list() {
    let names = Flux::from_iter(["one", "two", "three"]);
    let paced = interval(Duration::from_millis(20)).zip_with(names, |tick, name| (tick, name));

    let pairs = paced.collect_list().block(PATIENCE).unwrap().unwrap();

    assert_eq!(pairs, vec![(0, "one"), (1, "two"), (2, "three")]);
}

#[test]
fn probe_and_facade_surface_compose() {
    let probe = TestSubscriber::with_initial_demand(2);

    Flux::range(1, 5).subscribe_with(probe.clone());
    assert_eq!(probe.values(), vec![1, 2]);

    probe.request(3);
    assert!(probe.await_terminal(PATIENCE));
    assert_eq!(probe.values(), vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn facade_bridges_into_async() {
    let doubled: Vec<i64> = Flux::range(1, 4)
        .map(|n| n * 2)
        .into_stream(2)
        .map(|item| item.unwrap())
        .collect()
        .await;

    assert_eq!(doubled, vec![2, 4, 6, 8]);
}
