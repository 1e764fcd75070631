// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Aggregation of a whole sequence into one value.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use efflux_core::{
    Demand, DrainGate, FluxError, Publisher, Status, StreamState, Subscriber, Subscription,
    SubscriptionLink,
};
use parking_lot::Mutex;

use crate::flux::Flux;

/// Buffers every upstream item and emits them as a single `Vec` when the
/// upstream completes.
///
/// The upstream is consumed with unbounded demand; the downstream's demand
/// gates only the delivery of the final list.
pub(crate) struct CollectListOperator<T> {
    source: Flux<T>,
}

impl<T> CollectListOperator<T> {
    pub(crate) fn new(source: Flux<T>) -> Self {
        Self { source }
    }
}

impl<T: Send + 'static> Publisher<Vec<T>> for CollectListOperator<T> {
    fn subscribe(&self, subscriber: Box<dyn Subscriber<Vec<T>>>) -> Subscription {
        let state = Arc::new(CollectState {
            downstream: Mutex::new(subscriber),
            buffer: Mutex::new(Vec::new()),
            upstream: Mutex::new(None),
            demand: Demand::new(),
            status: Status::new(),
            gate: DrainGate::new(),
            done: AtomicBool::new(false),
            error_slot: Mutex::new(None),
        });

        self.source.subscribe_with(CollectSubscriber {
            state: state.clone(),
        });

        let subscription = Subscription::new(state.clone());
        state.gate.enter();
        state.downstream.lock().on_subscribe(subscription.clone());
        state.gate.resume(|| state.drain_once());

        subscription
    }
}

struct CollectState<T> {
    downstream: Mutex<Box<dyn Subscriber<Vec<T>>>>,
    buffer: Mutex<Vec<T>>,
    upstream: Mutex<Option<Subscription>>,
    demand: Demand,
    status: Status,
    gate: DrainGate,
    done: AtomicBool,
    error_slot: Mutex<Option<FluxError>>,
}

impl<T: Send> CollectState<T> {
    fn drain(&self) {
        self.gate.run(|| self.drain_once());
    }

    fn drain_once(&self) {
        if self.status.is_cancelled() {
            self.buffer.lock().clear();
            return;
        }
        let failure = self.error_slot.lock().take();
        if let Some(error) = failure {
            if self.status.finish(StreamState::Errored) {
                self.buffer.lock().clear();
                self.downstream.lock().on_error(error);
            }
            return;
        }
        if self.done.load(Ordering::Acquire)
            && self.demand.try_consume()
            && self.status.finish(StreamState::Completed)
        {
            let items = std::mem::take(&mut *self.buffer.lock());
            let mut downstream = self.downstream.lock();
            downstream.on_next(items);
            downstream.on_complete();
        }
    }
}

impl<T: Send> SubscriptionLink for CollectState<T> {
    fn request(&self, n: u64) {
        self.demand.add(n);
        self.drain();
    }

    fn cancel(&self) {
        if self.status.finish(StreamState::Cancelled) {
            let upstream = self.upstream.lock().take();
            if let Some(upstream) = upstream {
                upstream.cancel();
            }
            self.buffer.lock().clear();
        }
    }

    fn is_cancelled(&self) -> bool {
        self.status.is_cancelled()
    }
}

struct CollectSubscriber<T> {
    state: Arc<CollectState<T>>,
}

impl<T: Send + 'static> Subscriber<T> for CollectSubscriber<T> {
    fn on_subscribe(&mut self, subscription: Subscription) {
        if self.state.status.is_cancelled() {
            subscription.cancel();
            return;
        }
        *self.state.upstream.lock() = Some(subscription.clone());
        subscription.request(Demand::UNBOUNDED);
    }

    fn on_next(&mut self, item: T) {
        self.state.buffer.lock().push(item);
    }

    fn on_error(&mut self, error: FluxError) {
        {
            let mut slot = self.state.error_slot.lock();
            if slot.is_none() {
                *slot = Some(error);
            }
        }
        self.state.drain();
    }

    fn on_complete(&mut self) {
        self.state.done.store(true, Ordering::Release);
        self.state.drain();
    }
}
