// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Prefix truncation.

use efflux_core::{FluxError, Publisher, Subscriber, Subscription};

use crate::flux::Flux;

/// Passes through the first `limit` items, then cancels the upstream and
/// completes. `limit` is never zero here; that case short-circuits to an
/// empty source at construction.
pub(crate) struct TakeOperator<T> {
    source: Flux<T>,
    limit: u64,
}

impl<T> TakeOperator<T> {
    pub(crate) fn new(source: Flux<T>, limit: u64) -> Self {
        debug_assert!(limit > 0, "take(0) is handled by the empty source");
        Self { source, limit }
    }
}

impl<T: Send + 'static> Publisher<T> for TakeOperator<T> {
    fn subscribe(&self, subscriber: Box<dyn Subscriber<T>>) -> Subscription {
        self.source.subscribe_with(TakeSubscriber {
            downstream: subscriber,
            upstream: None,
            remaining: self.limit,
            done: false,
        })
    }
}

struct TakeSubscriber<T> {
    downstream: Box<dyn Subscriber<T>>,
    upstream: Option<Subscription>,
    remaining: u64,
    done: bool,
}

impl<T: Send> Subscriber<T> for TakeSubscriber<T> {
    fn on_subscribe(&mut self, subscription: Subscription) {
        self.upstream = Some(subscription.clone());
        self.downstream.on_subscribe(subscription);
    }

    fn on_next(&mut self, item: T) {
        if self.done {
            return;
        }
        self.remaining -= 1;
        if self.remaining > 0 {
            self.downstream.on_next(item);
            return;
        }
        // Boundary reached: stop the upstream before completing downstream.
        self.done = true;
        if let Some(upstream) = &self.upstream {
            upstream.cancel();
        }
        self.downstream.on_next(item);
        self.downstream.on_complete();
    }

    fn on_error(&mut self, error: FluxError) {
        if self.done {
            return;
        }
        self.done = true;
        self.downstream.on_error(error);
    }

    fn on_complete(&mut self) {
        if self.done {
            return;
        }
        self.done = true;
        self.downstream.on_complete();
    }
}
