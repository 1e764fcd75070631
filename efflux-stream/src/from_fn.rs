// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Lazy single-value source evaluated on first demand.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use efflux_core::{
    DrainGate, Publisher, Result, Status, StreamState, Subscriber, Subscription, SubscriptionLink,
};
use parking_lot::Mutex;

/// Publisher that runs `producer` once per subscription, at the moment the
/// subscriber first requests, and emits the outcome.
pub(crate) struct FnSource<F> {
    producer: Arc<F>,
}

impl<F> FnSource<F> {
    pub(crate) fn new(producer: F) -> Self {
        Self {
            producer: Arc::new(producer),
        }
    }
}

impl<T, F> Publisher<T> for FnSource<F>
where
    T: Send + 'static,
    F: Fn() -> Result<T> + Send + Sync + 'static,
{
    fn subscribe(&self, subscriber: Box<dyn Subscriber<T>>) -> Subscription {
        let state = Arc::new(FnState {
            subscriber: Mutex::new(subscriber),
            producer: self.producer.clone(),
            status: Status::new(),
            gate: DrainGate::new(),
            requested: AtomicBool::new(false),
            fired: AtomicBool::new(false),
        });
        let subscription = Subscription::new(state.clone());

        state.gate.enter();
        state.subscriber.lock().on_subscribe(subscription.clone());
        state.gate.resume(|| state.deliver());

        subscription
    }
}

struct FnState<T, F> {
    subscriber: Mutex<Box<dyn Subscriber<T>>>,
    producer: Arc<F>,
    status: Status,
    gate: DrainGate,
    requested: AtomicBool,
    fired: AtomicBool,
}

impl<T, F> FnState<T, F>
where
    T: Send,
    F: Fn() -> Result<T> + Send + Sync,
{
    fn deliver(&self) {
        if !self.requested.load(Ordering::Acquire) || !self.status.is_active() {
            return;
        }
        if self.fired.swap(true, Ordering::AcqRel) {
            return;
        }
        match (self.producer)() {
            Ok(item) => {
                let mut subscriber = self.subscriber.lock();
                if self.status.is_cancelled() {
                    return;
                }
                subscriber.on_next(item);
                if self.status.finish(StreamState::Completed) {
                    subscriber.on_complete();
                }
            }
            Err(error) => {
                if self.status.finish(StreamState::Errored) {
                    self.subscriber.lock().on_error(error);
                }
            }
        }
    }
}

impl<T, F> SubscriptionLink for FnState<T, F>
where
    T: Send,
    F: Fn() -> Result<T> + Send + Sync,
{
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
