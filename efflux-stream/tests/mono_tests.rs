// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use efflux_core::FluxError;
use efflux_stream::{Flux, Mono};
use efflux_test_utils::test_data::{alice, greeting_comments, Comment, User, UserComments};
use efflux_test_utils::TestSubscriber;

#[test]
fn just_emits_one_item_and_completes() {
    let probe = TestSubscriber::unbounded();

    Mono::just(alice()).subscribe_with(probe.clone());

    assert_eq!(probe.values(), vec![alice()]);
    assert!(probe.is_completed());
}

#[test]
fn from_fn_runs_once_per_subscription() {
    let calls = Arc::new(AtomicU64::new(0));
    let counter = calls.clone();
    let lazy = Mono::from_fn(move || Ok(counter.fetch_add(1, Ordering::SeqCst)));

    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let first = TestSubscriber::unbounded();
    lazy.subscribe_with(first.clone());
    let second = TestSubscriber::unbounded();
    lazy.subscribe_with(second.clone());

    assert_eq!(first.values(), vec![0]);
    assert_eq!(second.values(), vec![1]);
}

#[test]
fn from_fn_failure_becomes_on_error() {
    let probe = TestSubscriber::<i32>::unbounded();

    Mono::from_fn(|| Err(FluxError::source("lookup failed"))).subscribe_with(probe.clone());

    assert!(probe.error().is_some());
    assert_eq!(probe.count(), 0);
}

#[test]
fn filter_turns_a_mismatch_into_empty() {
    let probe = TestSubscriber::unbounded();

    Mono::just(7).filter(|n| *n > 10).subscribe_with(probe.clone());

    assert_eq!(probe.count(), 0);
    assert!(probe.is_completed());
}

#[test]
fn zip_with_combines_two_monos() {
    let probe = TestSubscriber::unbounded();

    let user = Mono::just(alice());
    let comments = Mono::just(greeting_comments());
    user.zip_with(comments, UserComments::new)
        .subscribe_with(probe.clone());

    let values = probe.values();
    assert_eq!(values.len(), 1);
    assert_eq!(values[0].user, alice());
    assert_eq!(values[0].comments.len(), 3);
    assert!(probe.is_completed());
}

#[test]
fn zip_with_an_empty_side_is_empty() {
    let probe = TestSubscriber::<(i32, i32)>::unbounded();

    Mono::just(1)
        .zip_with(Mono::empty(), |a, b| (a, b))
        .subscribe_with(probe.clone());

    assert_eq!(probe.count(), 0);
    assert!(probe.is_completed());
}

#[test]
fn flat_map_chains_dependent_lookups() {
    let probe = TestSubscriber::unbounded();

    Mono::just(alice())
        .flat_map(|user: User| Mono::just(format!("profile of {}", user.full_name())))
        .subscribe_with(probe.clone());

    assert_eq!(probe.values(), vec!["profile of Alice Moreau".to_string()]);
}

#[test]
fn flat_map_many_widens_into_a_flux() {
    let probe = TestSubscriber::unbounded();

    Mono::just(alice())
        .flat_map_many(|_| Flux::from_iter(greeting_comments()))
        .map(|comment: Comment| comment.body)
        .subscribe_with(probe.clone());

    assert_eq!(probe.count(), 3);
    assert!(probe.is_completed());
}

#[test]
fn default_if_empty_fills_the_gap() {
    let probe = TestSubscriber::unbounded();

    Mono::<i32>::empty()
        .default_if_empty(0)
        .subscribe_with(probe.clone());

    assert_eq!(probe.values(), vec![0]);
    assert!(probe.is_completed());
}

#[test]
fn error_if_empty_raises_instead_of_completing() {
    let probe = TestSubscriber::<User>::unbounded();

    Mono::empty()
        .error_if_empty(|| FluxError::Empty)
        .subscribe_with(probe.clone());

    assert!(probe.error().is_some_and(|error| error.is_empty_sequence()));
    assert!(!probe.is_completed());
}

#[test]
fn error_if_empty_passes_a_present_value_through() {
    let probe = TestSubscriber::unbounded();

    Mono::just(3)
        .error_if_empty(|| FluxError::Empty)
        .subscribe_with(probe.clone());

    assert_eq!(probe.values(), vec![3]);
    assert!(probe.is_completed());
}

#[test]
fn on_error_resume_recovers_a_failed_lookup() {
    let probe = TestSubscriber::unbounded();

    Mono::<String>::error(FluxError::source("store offline"))
        .on_error_resume(|_| Mono::just("cached".to_string()))
        .subscribe_with(probe.clone());

    assert_eq!(probe.values(), vec!["cached".to_string()]);
    assert!(probe.is_completed());
}
