// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Switching to an alternative sequence on error or on emptiness.

use std::sync::Arc;

use efflux_core::{FluxError, Publisher, Subscriber, Subscription, SubscriptionLink};
use parking_lot::Mutex;

use crate::arbiter::SubscriptionArbiter;
use crate::flux::Flux;

struct FallbackShared<T> {
    downstream: Mutex<Box<dyn Subscriber<T>>>,
    arbiter: Arc<SubscriptionArbiter>,
}

/// Tail subscriber for whichever sequence the operator switched to. Nothing
/// can trigger a further switch from here, so every signal passes through.
struct ContinuationSubscriber<T> {
    shared: Arc<FallbackShared<T>>,
}

impl<T: Send + 'static> Subscriber<T> for ContinuationSubscriber<T> {
    fn on_subscribe(&mut self, subscription: Subscription) {
        self.shared.arbiter.set_upstream(subscription);
    }

    fn on_next(&mut self, item: T) {
        self.shared.arbiter.note_produced(1);
        self.shared.downstream.lock().on_next(item);
    }

    fn on_error(&mut self, error: FluxError) {
        self.shared.downstream.lock().on_error(error);
    }

    fn on_complete(&mut self) {
        self.shared.downstream.lock().on_complete();
    }
}

/// Replaces an upstream error with the sequence built by `fallback`.
///
/// The fallback factory receives the error, so it can decide what to emit
/// based on what went wrong. Errors raised by the fallback itself propagate.
pub(crate) struct OnErrorResume<T> {
    source: Flux<T>,
    fallback: Arc<dyn Fn(&FluxError) -> Flux<T> + Send + Sync>,
}

impl<T> OnErrorResume<T> {
    pub(crate) fn new<F>(source: Flux<T>, fallback: F) -> Self
    where
        F: Fn(&FluxError) -> Flux<T> + Send + Sync + 'static,
    {
        Self {
            source,
            fallback: Arc::new(fallback),
        }
    }
}

impl<T: Send + 'static> Publisher<T> for OnErrorResume<T> {
    fn subscribe(&self, subscriber: Box<dyn Subscriber<T>>) -> Subscription {
        let shared = Arc::new(FallbackShared {
            downstream: Mutex::new(subscriber),
            arbiter: Arc::new(SubscriptionArbiter::new()),
        });
        let subscription = Subscription::new(shared.arbiter.clone());

        shared.downstream.lock().on_subscribe(subscription.clone());
        self.source.subscribe_with(ResumePrimary {
            shared,
            fallback: self.fallback.clone(),
        });

        subscription
    }
}

struct ResumePrimary<T> {
    shared: Arc<FallbackShared<T>>,
    fallback: Arc<dyn Fn(&FluxError) -> Flux<T> + Send + Sync>,
}

impl<T: Send + 'static> Subscriber<T> for ResumePrimary<T> {
    fn on_subscribe(&mut self, subscription: Subscription) {
        self.shared.arbiter.set_upstream(subscription);
    }

    fn on_next(&mut self, item: T) {
        self.shared.arbiter.note_produced(1);
        self.shared.downstream.lock().on_next(item);
    }

    fn on_error(&mut self, error: FluxError) {
        if self.shared.arbiter.is_cancelled() {
            return;
        }
        tracing::debug!(%error, "switching to fallback sequence");
        let alternative = (self.fallback)(&error);
        alternative.subscribe_with(ContinuationSubscriber {
            shared: self.shared.clone(),
        });
    }

    fn on_complete(&mut self) {
        self.shared.downstream.lock().on_complete();
    }
}

/// Substitutes `alternative` when the source completes without a single item.
pub(crate) struct SwitchIfEmpty<T> {
    source: Flux<T>,
    alternative: Flux<T>,
}

impl<T> SwitchIfEmpty<T> {
    pub(crate) fn new(source: Flux<T>, alternative: Flux<T>) -> Self {
        Self {
            source,
            alternative,
        }
    }
}

impl<T: Send + 'static> Publisher<T> for SwitchIfEmpty<T> {
    fn subscribe(&self, subscriber: Box<dyn Subscriber<T>>) -> Subscription {
        let shared = Arc::new(FallbackShared {
            downstream: Mutex::new(subscriber),
            arbiter: Arc::new(SubscriptionArbiter::new()),
        });
        let subscription = Subscription::new(shared.arbiter.clone());

        shared.downstream.lock().on_subscribe(subscription.clone());
        self.source.subscribe_with(EmptyWatchPrimary {
            shared,
            alternative: self.alternative.clone(),
            saw_item: false,
        });

        subscription
    }
}

struct EmptyWatchPrimary<T> {
    shared: Arc<FallbackShared<T>>,
    alternative: Flux<T>,
    saw_item: bool,
}

impl<T: Send + 'static> Subscriber<T> for EmptyWatchPrimary<T> {
    fn on_subscribe(&mut self, subscription: Subscription) {
        self.shared.arbiter.set_upstream(subscription);
    }

    fn on_next(&mut self, item: T) {
        self.saw_item = true;
        self.shared.arbiter.note_produced(1);
        self.shared.downstream.lock().on_next(item);
    }

    fn on_error(&mut self, error: FluxError) {
        self.shared.downstream.lock().on_error(error);
    }

    fn on_complete(&mut self) {
        if self.shared.arbiter.is_cancelled() {
            return;
        }
        if self.saw_item {
            self.shared.downstream.lock().on_complete();
            return;
        }
        self.alternative.subscribe_with(ContinuationSubscriber {
            shared: self.shared.clone(),
        });
    }
}
