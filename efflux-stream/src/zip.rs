// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Pairwise combination of two sequences.

use std::collections::VecDeque;
use std::sync::Arc;

use efflux_core::{
    Demand, DrainGate, FluxError, Publisher, Status, StreamState, Subscriber, Subscription,
    SubscriptionLink,
};
use parking_lot::Mutex;

use crate::flux::Flux;

/// Combines the n-th items of two sources into one output item.
///
/// Demand is forwarded in lockstep: a request for `n` pairs asks each side
/// for exactly `n` items, so neither side runs ahead of the other by more
/// than the unpaired remainder. The stream completes as soon as one side is
/// exhausted with no unpaired item left; the other side is then cancelled.
pub(crate) struct ZipOperator<A, B, O> {
    left: Flux<A>,
    right: Flux<B>,
    combiner: Arc<dyn Fn(A, B) -> O + Send + Sync>,
}

impl<A, B, O> ZipOperator<A, B, O> {
    pub(crate) fn new<F>(left: Flux<A>, right: Flux<B>, combiner: F) -> Self
    where
        F: Fn(A, B) -> O + Send + Sync + 'static,
    {
        Self {
            left,
            right,
            combiner: Arc::new(combiner),
        }
    }
}

impl<A, B, O> Publisher<O> for ZipOperator<A, B, O>
where
    A: Send + 'static,
    B: Send + 'static,
    O: Send + 'static,
{
    fn subscribe(&self, subscriber: Box<dyn Subscriber<O>>) -> Subscription {
        let state = Arc::new(ZipState {
            downstream: Mutex::new(subscriber),
            combiner: self.combiner.clone(),
            demand: Demand::new(),
            status: Status::new(),
            gate: DrainGate::new(),
            left: Mutex::new(ZipSide::new()),
            right: Mutex::new(ZipSide::new()),
            error_slot: Mutex::new(None),
        });

        // Attach both sides first; nothing flows until demand arrives, and
        // this guarantees request forwarding always has real targets.
        self.left.subscribe_with(LeftSubscriber {
            state: state.clone(),
        });
        self.right.subscribe_with(RightSubscriber {
            state: state.clone(),
        });

        let subscription = Subscription::new(state.clone());
        state.gate.enter();
        state.downstream.lock().on_subscribe(subscription.clone());
        state.gate.resume(|| state.drain_once());

        subscription
    }
}

struct ZipSide<T> {
    queue: VecDeque<T>,
    done: bool,
    subscription: Option<Subscription>,
}

impl<T> ZipSide<T> {
    fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            done: false,
            subscription: None,
        }
    }

    fn exhausted(&self) -> bool {
        self.done && self.queue.is_empty()
    }
}

struct ZipState<A, B, O> {
    downstream: Mutex<Box<dyn Subscriber<O>>>,
    combiner: Arc<dyn Fn(A, B) -> O + Send + Sync>,
    demand: Demand,
    status: Status,
    gate: DrainGate,
    left: Mutex<ZipSide<A>>,
    right: Mutex<ZipSide<B>>,
    error_slot: Mutex<Option<FluxError>>,
}

impl<A, B, O> ZipState<A, B, O>
where
    A: Send,
    B: Send,
    O: Send,
{
    fn drain(&self) {
        self.gate.run(|| self.drain_once());
    }

    fn drain_once(&self) {
        loop {
            if self.status.is_cancelled() {
                self.clear_queues();
                return;
            }
            let failure = self.error_slot.lock().take();
            if let Some(error) = failure {
                if self.status.finish(StreamState::Errored) {
                    self.cancel_sides();
                    self.clear_queues();
                    self.downstream.lock().on_error(error);
                }
                return;
            }
            let (left_empty, left_exhausted) = {
                let left = self.left.lock();
                (left.queue.is_empty(), left.exhausted())
            };
            let (right_empty, right_exhausted) = {
                let right = self.right.lock();
                (right.queue.is_empty(), right.exhausted())
            };
            // Completion is checked before demand: once a side can no longer
            // contribute, no request will ever form another pair.
            if left_exhausted || right_exhausted {
                if self.status.finish(StreamState::Completed) {
                    self.cancel_sides();
                    self.clear_queues();
                    self.downstream.lock().on_complete();
                }
                return;
            }
            if left_empty || right_empty {
                return;
            }
            if !self.demand.try_consume() {
                return;
            }
            let a = self.left.lock().queue.pop_front();
            let b = self.right.lock().queue.pop_front();
            if let (Some(a), Some(b)) = (a, b) {
                let paired = (self.combiner)(a, b);
                self.downstream.lock().on_next(paired);
            }
        }
    }

    fn fail(&self, error: FluxError) {
        {
            let mut slot = self.error_slot.lock();
            if slot.is_none() && self.status.is_active() {
                *slot = Some(error);
            } else {
                tracing::debug!(%error, "error dropped, zip already terminating");
            }
        }
        self.drain();
    }

    fn cancel_sides(&self) {
        let left = self.left.lock().subscription.take();
        if let Some(left) = left {
            left.cancel();
        }
        let right = self.right.lock().subscription.take();
        if let Some(right) = right {
            right.cancel();
        }
    }

    fn clear_queues(&self) {
        self.left.lock().queue.clear();
        self.right.lock().queue.clear();
    }
}

impl<A, B, O> SubscriptionLink for ZipState<A, B, O>
where
    A: Send,
    B: Send,
    O: Send,
{
    fn request(&self, n: u64) {
        self.demand.add(n);
        let left = self.left.lock().subscription.clone();
        if let Some(left) = left {
            left.request(n);
        }
        let right = self.right.lock().subscription.clone();
        if let Some(right) = right {
            right.request(n);
        }
        self.drain();
    }

    fn cancel(&self) {
        if self.status.finish(StreamState::Cancelled) {
            self.cancel_sides();
            self.clear_queues();
        }
    }

    fn is_cancelled(&self) -> bool {
        self.status.is_cancelled()
    }
}

struct LeftSubscriber<A, B, O> {
    state: Arc<ZipState<A, B, O>>,
}

impl<A, B, O> Subscriber<A> for LeftSubscriber<A, B, O>
where
    A: Send + 'static,
    B: Send + 'static,
    O: Send + 'static,
{
    fn on_subscribe(&mut self, subscription: Subscription) {
        self.state.left.lock().subscription = Some(subscription);
    }

    fn on_next(&mut self, item: A) {
        self.state.left.lock().queue.push_back(item);
        self.state.drain();
    }

    fn on_error(&mut self, error: FluxError) {
        self.state.fail(error);
    }

    fn on_complete(&mut self) {
        self.state.left.lock().done = true;
        self.state.drain();
    }
}

struct RightSubscriber<A, B, O> {
    state: Arc<ZipState<A, B, O>>,
}

impl<A, B, O> Subscriber<B> for RightSubscriber<A, B, O>
where
    A: Send + 'static,
    B: Send + 'static,
    O: Send + 'static,
{
    fn on_subscribe(&mut self, subscription: Subscription) {
        self.state.right.lock().subscription = Some(subscription);
    }

    fn on_next(&mut self, item: B) {
        self.state.right.lock().queue.push_back(item);
        self.state.drain();
    }

    fn on_error(&mut self, error: FluxError) {
        self.state.fail(error);
    }

    fn on_complete(&mut self) {
        self.state.right.lock().done = true;
        self.state.drain();
    }
}
