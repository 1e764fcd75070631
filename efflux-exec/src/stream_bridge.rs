// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Adapter from an efflux sequence into a [`futures::Stream`].

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use efflux_core::{FluxError, Result, Subscriber, Subscription};
use efflux_stream::{Flux, Mono};
use futures::Stream;
use parking_lot::Mutex;

/// Hands a sequence to async code.
pub trait StreamBridgeExt<T: Send + 'static> {
    /// Subscribes and exposes the signals as a `Stream<Item = Result<T>>`.
    ///
    /// The bridge requests `prefetch` items up front and `prefetch` more
    /// every time that many have been polled out, so the producer stays at
    /// most one window ahead of the consumer. An error ends the stream
    /// after being yielded as `Err`. Dropping the stream cancels the
    /// subscription. A `prefetch` of zero is treated as one.
    fn into_stream(self, prefetch: u64) -> FluxStream<T>;
}

impl<T: Send + 'static> StreamBridgeExt<T> for Flux<T> {
    fn into_stream(self, prefetch: u64) -> FluxStream<T> {
        let prefetch = prefetch.max(1);
        let shared = Arc::new(BridgeShared {
            state: Mutex::new(BridgeState {
                queue: VecDeque::new(),
                terminal: None,
                waker: None,
            }),
        });
        let subscription = self.subscribe_with(BridgeSubscriber {
            shared: shared.clone(),
            prefetch,
        });
        FluxStream {
            shared,
            subscription,
            prefetch,
            polled_out: 0,
            finished: false,
        }
    }
}

impl<T: Send + 'static> StreamBridgeExt<T> for Mono<T> {
    fn into_stream(self, prefetch: u64) -> FluxStream<T> {
        self.into_flux().into_stream(prefetch)
    }
}

struct BridgeShared<T> {
    state: Mutex<BridgeState<T>>,
}

struct BridgeState<T> {
    queue: VecDeque<T>,
    /// `Some(None)` is completion, `Some(Some(e))` is failure.
    terminal: Option<Option<FluxError>>,
    waker: Option<Waker>,
}

impl<T> BridgeShared<T> {
    fn wake(&self, state: &mut BridgeState<T>) {
        if let Some(waker) = state.waker.take() {
            waker.wake();
        }
    }
}

struct BridgeSubscriber<T> {
    shared: Arc<BridgeShared<T>>,
    prefetch: u64,
}

impl<T: Send> Subscriber<T> for BridgeSubscriber<T> {
    fn on_subscribe(&mut self, subscription: Subscription) {
        subscription.request(self.prefetch);
    }

    fn on_next(&mut self, item: T) {
        let mut state = self.shared.state.lock();
        state.queue.push_back(item);
        self.shared.wake(&mut state);
    }

    fn on_error(&mut self, error: FluxError) {
        let mut state = self.shared.state.lock();
        state.terminal = Some(Some(error));
        self.shared.wake(&mut state);
    }

    fn on_complete(&mut self) {
        let mut state = self.shared.state.lock();
        state.terminal = Some(None);
        self.shared.wake(&mut state);
    }
}

/// A subscribed sequence viewed as an async stream.
///
/// Created by [`StreamBridgeExt::into_stream`].
pub struct FluxStream<T> {
    shared: Arc<BridgeShared<T>>,
    subscription: Subscription,
    prefetch: u64,
    polled_out: u64,
    finished: bool,
}

impl<T: Send + 'static> Stream for FluxStream<T> {
    type Item = Result<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }
        let mut state = this.shared.state.lock();
        if let Some(item) = state.queue.pop_front() {
            drop(state);
            this.polled_out += 1;
            if this.polled_out == this.prefetch {
                this.polled_out = 0;
                this.subscription.request(this.prefetch);
            }
            return Poll::Ready(Some(Ok(item)));
        }
        match state.terminal.take() {
            Some(None) => {
                this.finished = true;
                Poll::Ready(None)
            }
            Some(Some(error)) => {
                this.finished = true;
                Poll::Ready(Some(Err(error)))
            }
            None => {
                state.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

impl<T> Drop for FluxStream<T> {
    fn drop(&mut self) {
        self.subscription.cancel();
    }
}
