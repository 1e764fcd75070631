// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Sources that terminate without ever producing an item.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use efflux_core::{
    DrainGate, FluxError, Publisher, Status, StreamState, Subscriber, Subscription,
    SubscriptionLink,
};
use parking_lot::Mutex;

/// Source that completes as soon as the subscriber shows any demand.
///
/// Completion waits for the first request so that a subscriber observing an
/// empty sequence still controls when the terminal signal may arrive.
pub(crate) struct EmptySource;

impl<T: Send + 'static> Publisher<T> for EmptySource {
    fn subscribe(&self, subscriber: Box<dyn Subscriber<T>>) -> Subscription {
        let state = Arc::new(EmptyState {
            subscriber: Mutex::new(subscriber),
            status: Status::new(),
            gate: DrainGate::new(),
            requested: AtomicBool::new(false),
        });
        let subscription = Subscription::new(state.clone());

        state.gate.enter();
        state.subscriber.lock().on_subscribe(subscription.clone());
        state.gate.resume(|| state.deliver());

        subscription
    }
}

struct EmptyState<T> {
    subscriber: Mutex<Box<dyn Subscriber<T>>>,
    status: Status,
    gate: DrainGate,
    requested: AtomicBool,
}

impl<T: Send> EmptyState<T> {
    fn deliver(&self) {
        if self.requested.load(Ordering::Acquire) && self.status.finish(StreamState::Completed) {
            self.subscriber.lock().on_complete();
        }
    }
}

impl<T: Send> SubscriptionLink for EmptyState<T> {
    fn request(&self, _n: u64) {
        self.requested.store(true, Ordering::Release);
        self.gate.run(|| self.deliver());
    }

    fn cancel(&self) {
        self.status.finish(StreamState::Cancelled);
    }

    fn is_cancelled(&self) -> bool {
        self.status.is_cancelled()
    }
}

/// Source that fails every subscriber with a clone of one error.
///
/// The error is delivered during `subscribe`, right after `on_subscribe`;
/// terminal signals do not wait for demand.
pub(crate) struct ErrorSource {
    error: FluxError,
}

impl ErrorSource {
    pub(crate) fn new(error: FluxError) -> Self {
        Self { error }
    }
}

impl<T: Send + 'static> Publisher<T> for ErrorSource {
    fn subscribe(&self, mut subscriber: Box<dyn Subscriber<T>>) -> Subscription {
        let link = Arc::new(ErrorLink {
            status: Status::new(),
        });
        let subscription = Subscription::new(link.clone());

        subscriber.on_subscribe(subscription.clone());
        // A cancel made inside on_subscribe wins the race and mutes the error.
        if link.status.finish(StreamState::Errored) {
            subscriber.on_error(self.error.clone());
        }

        subscription
    }
}

struct ErrorLink {
    status: Status,
}

impl SubscriptionLink for ErrorLink {
    fn request(&self, _n: u64) {}

    fn cancel(&self) {
        self.status.finish(StreamState::Cancelled);
    }

    fn is_cancelled(&self) -> bool {
        self.status.is_cancelled()
    }
}
