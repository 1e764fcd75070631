// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Item transformation operators.

use std::sync::Arc;

use efflux_core::{FluxError, Publisher, Result, Subscriber, Subscription};

use crate::flux::Flux;

/// Infallible 1:1 transformation. Demand passes through untouched since
/// every upstream item becomes exactly one downstream item.
pub(crate) struct MapOperator<T, F> {
    source: Flux<T>,
    mapper: Arc<F>,
}

impl<T, F> MapOperator<T, F> {
    pub(crate) fn new(source: Flux<T>, mapper: F) -> Self {
        Self {
            source,
            mapper: Arc::new(mapper),
        }
    }
}

impl<T, U, F> Publisher<U> for MapOperator<T, F>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> U + Send + Sync + 'static,
{
    fn subscribe(&self, subscriber: Box<dyn Subscriber<U>>) -> Subscription {
        self.source.subscribe_with(MapSubscriber {
            downstream: subscriber,
            mapper: self.mapper.clone(),
        })
    }
}

struct MapSubscriber<U, F> {
    downstream: Box<dyn Subscriber<U>>,
    mapper: Arc<F>,
}

impl<T, U, F> Subscriber<T> for MapSubscriber<U, F>
where
    T: Send,
    U: Send,
    F: Fn(T) -> U + Send + Sync,
{
    fn on_subscribe(&mut self, subscription: Subscription) {
        self.downstream.on_subscribe(subscription);
    }

    fn on_next(&mut self, item: T) {
        self.downstream.on_next((self.mapper)(item));
    }

    fn on_error(&mut self, error: FluxError) {
        self.downstream.on_error(error);
    }

    fn on_complete(&mut self) {
        self.downstream.on_complete();
    }
}

/// Fallible 1:1 transformation. The first `Err` cancels the upstream and
/// fails the stream with that error.
pub(crate) struct TryMapOperator<T, F> {
    source: Flux<T>,
    mapper: Arc<F>,
}

impl<T, F> TryMapOperator<T, F> {
    pub(crate) fn new(source: Flux<T>, mapper: F) -> Self {
        Self {
            source,
            mapper: Arc::new(mapper),
        }
    }
}

impl<T, U, F> Publisher<U> for TryMapOperator<T, F>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> Result<U> + Send + Sync + 'static,
{
    fn subscribe(&self, subscriber: Box<dyn Subscriber<U>>) -> Subscription {
        self.source.subscribe_with(TryMapSubscriber {
            downstream: subscriber,
            mapper: self.mapper.clone(),
            upstream: None,
            done: false,
        })
    }
}

struct TryMapSubscriber<U, F> {
    downstream: Box<dyn Subscriber<U>>,
    mapper: Arc<F>,
    upstream: Option<Subscription>,
    done: bool,
}

impl<T, U, F> Subscriber<T> for TryMapSubscriber<U, F>
where
    T: Send,
    U: Send,
    F: Fn(T) -> Result<U> + Send + Sync,
{
    fn on_subscribe(&mut self, subscription: Subscription) {
        self.upstream = Some(subscription.clone());
        self.downstream.on_subscribe(subscription);
    }

    fn on_next(&mut self, item: T) {
        if self.done {
            return;
        }
        match (self.mapper)(item) {
            Ok(mapped) => self.downstream.on_next(mapped),
            Err(error) => {
                self.done = true;
                if let Some(upstream) = &self.upstream {
                    upstream.cancel();
                }
                self.downstream.on_error(error);
            }
        }
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
