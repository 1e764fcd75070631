// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Predicate filtering with demand compensation.

use std::sync::Arc;

use efflux_core::{FluxError, Publisher, Subscriber, Subscription};

use crate::flux::Flux;

/// Drops items that fail the predicate.
///
/// Each dropped item is immediately re-requested upstream, so the
/// subscriber's demand counts delivered items only and a sparse match never
/// stalls the stream.
pub(crate) struct FilterOperator<T, P> {
    source: Flux<T>,
    predicate: Arc<P>,
}

impl<T, P> FilterOperator<T, P> {
    pub(crate) fn new(source: Flux<T>, predicate: P) -> Self {
        Self {
            source,
            predicate: Arc::new(predicate),
        }
    }
}

impl<T, P> Publisher<T> for FilterOperator<T, P>
where
    T: Send + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    fn subscribe(&self, subscriber: Box<dyn Subscriber<T>>) -> Subscription {
        self.source.subscribe_with(FilterSubscriber {
            downstream: subscriber,
            predicate: self.predicate.clone(),
            upstream: None,
        })
    }
}

struct FilterSubscriber<T, P> {
    downstream: Box<dyn Subscriber<T>>,
    predicate: Arc<P>,
    upstream: Option<Subscription>,
}

impl<T, P> Subscriber<T> for FilterSubscriber<T, P>
where
    T: Send,
    P: Fn(&T) -> bool + Send + Sync,
{
    fn on_subscribe(&mut self, subscription: Subscription) {
        self.upstream = Some(subscription.clone());
        self.downstream.on_subscribe(subscription);
    }

    fn on_next(&mut self, item: T) {
        if (self.predicate)(&item) {
            self.downstream.on_next(item);
        } else if let Some(upstream) = &self.upstream {
            // Compensate for the dropped item so downstream demand stays
            // spendable.
            upstream.request(1);
        }
    }

    fn on_error(&mut self, error: FluxError) {
        self.downstream.on_error(error);
    }

    fn on_complete(&mut self) {
        self.downstream.on_complete();
    }
}
