// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::sync::Arc;
use std::time::Duration;

use efflux_core::FluxError;
use efflux_exec::BlockingExt;
use efflux_stream::{Flux, Mono};
use efflux_time::{delay_with, Scheduler};
use parking_lot::Mutex;

const PATIENCE: Duration = Duration::from_secs(10);

#[test]
fn block_last_returns_the_final_item() {
    let last = Flux::range(1, 5).map(|n| n * n).block_last(PATIENCE);

    assert_eq!(last.unwrap(), Some(25));
}

#[test]
fn block_last_on_an_empty_sequence_is_none() {
    let last = Flux::<i64>::empty().block_last(PATIENCE);

    assert_eq!(last.unwrap(), None);
}

#[test]
fn block_last_surfaces_the_stream_error() {
    let result = Flux::<i64>::error(FluxError::source("backing store offline")).block_last(PATIENCE);

    assert!(matches!(result, Err(FluxError::Source { .. })));
}

#[test]
fn block_first_takes_one_item_and_cancels_the_rest() {
    let emitter_slot = Arc::new(Mutex::new(None));
    let slot = emitter_slot.clone();
    let source = Flux::create(move |emitter| {
        emitter.next(42u64);
        *slot.lock() = Some(emitter);
    });

    let first = source.block_first(PATIENCE);

    assert_eq!(first.unwrap(), Some(42));
    let emitter = emitter_slot.lock().take().unwrap();
    assert!(emitter.is_cancelled());
}

#[test]
fn block_times_out_on_a_silent_stream() {
    let silent: Flux<u64> = Flux::create(|_emitter| {});

    let result = silent.block_last(Duration::from_millis(100));

    match result {
        Err(error) => assert!(error.is_timeout()),
        Ok(value) => panic!("expected a timeout, got {value:?}"),
    }
}

#[test]
fn block_waits_for_a_cross_thread_terminal() {
    let scheduler = Scheduler::new("block-wakeup");

    let value = delay_with(Duration::from_millis(50), &scheduler).block(PATIENCE);

    assert_eq!(value.unwrap(), Some(0));
}

#[test]
fn mono_block_returns_its_item() {
    assert_eq!(Mono::just(7).block(PATIENCE).unwrap(), Some(7));
    assert_eq!(Mono::<i64>::empty().block(PATIENCE).unwrap(), None);
}
