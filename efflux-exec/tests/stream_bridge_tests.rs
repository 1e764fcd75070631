// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::sync::Arc;
use std::time::Duration;

use efflux_core::FluxError;
use efflux_exec::StreamBridgeExt;
use efflux_stream::{Flux, Mono};
use futures::StreamExt;
use parking_lot::Mutex;

#[tokio::test]
async fn bridge_yields_every_item_then_ends() {
    let mut stream = Flux::range(1, 5).into_stream(2);

    let mut seen = Vec::new();
    while let Some(item) = stream.next().await {
        seen.push(item.unwrap());
    }

    assert_eq!(seen, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn bridge_surfaces_the_error_after_the_items() {
    let source = Flux::create(|emitter| {
        emitter.next("one");
        emitter.next("two");
        emitter.error(FluxError::source("feed dropped"));
    });
    let mut stream = source.into_stream(8);

    assert_eq!(stream.next().await.unwrap().unwrap(), "one");
    assert_eq!(stream.next().await.unwrap().unwrap(), "two");
    assert!(matches!(
        stream.next().await,
        Some(Err(FluxError::Source { .. }))
    ));
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn dropping_the_stream_cancels_the_subscription() {
    let emitter_slot = Arc::new(Mutex::new(None));
    let slot = emitter_slot.clone();
    let source: Flux<u64> = Flux::create(move |emitter| {
        *slot.lock() = Some(emitter);
    });

    let stream = source.into_stream(4);
    drop(stream);

    let emitter = emitter_slot.lock().take().unwrap();
    assert!(emitter.is_cancelled());
}

#[tokio::test]
async fn bridge_wakes_the_task_for_cross_thread_items() {
    let source = Flux::create(|emitter| {
        std::thread::spawn(move || {
            for n in 0..3u64 {
                std::thread::sleep(Duration::from_millis(20));
                emitter.next(n);
            }
            emitter.complete();
        });
    });

    let seen: Vec<u64> = source
        .into_stream(1)
        .map(|item| item.unwrap())
        .collect()
        .await;

    assert_eq!(seen, vec![0, 1, 2]);
}

#[tokio::test]
async fn small_prefetch_still_drains_a_larger_sequence() {
    let seen: Vec<i64> = Flux::range(0, 100)
        .into_stream(1)
        .map(|item| item.unwrap())
        .collect()
        .await;

    assert_eq!(seen, (0..100).collect::<Vec<_>>());
}

#[tokio::test]
async fn mono_bridges_to_a_single_item_stream() {
    let mut stream = Mono::just("solo").into_stream(1);

    assert_eq!(stream.next().await.unwrap().unwrap(), "solo");
    assert!(stream.next().await.is_none());
}
