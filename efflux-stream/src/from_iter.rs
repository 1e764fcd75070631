// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Cold source backed by a cloneable collection.

use std::iter::{Fuse, Peekable};
use std::sync::Arc;

use efflux_core::{
    Demand, DrainGate, Publisher, Status, StreamState, Subscriber, Subscription, SubscriptionLink,
};
use parking_lot::Mutex;

/// Publisher that walks a fresh copy of `collection` for every subscriber.
pub(crate) struct IterSource<C> {
    collection: C,
}

impl<C> IterSource<C> {
    pub(crate) fn new(collection: C) -> Self {
        Self { collection }
    }
}

impl<C, T> Publisher<T> for IterSource<C>
where
    C: IntoIterator<Item = T> + Clone + Send + Sync + 'static,
    C::IntoIter: Send,
    T: Send + 'static,
{
    fn subscribe(&self, subscriber: Box<dyn Subscriber<T>>) -> Subscription {
        let state = Arc::new(IterState {
            inner: Mutex::new(IterInner {
                items: self.collection.clone().into_iter().fuse().peekable(),
                subscriber,
            }),
            demand: Demand::new(),
            status: Status::new(),
            gate: DrainGate::new(),
        });
        let subscription = Subscription::new(state.clone());

        // Claim the gate before on_subscribe so a request made inside the
        // callback parks as a wake-up instead of draining under the lock.
        state.gate.enter();
        state.inner.lock().subscriber.on_subscribe(subscription.clone());
        state.gate.resume(|| state.drain_once());

        subscription
    }
}

struct IterState<I: Iterator> {
    inner: Mutex<IterInner<I>>,
    demand: Demand,
    status: Status,
    gate: DrainGate,
}

struct IterInner<I: Iterator> {
    items: Peekable<Fuse<I>>,
    subscriber: Box<dyn Subscriber<I::Item>>,
}

impl<I> IterState<I>
where
    I: Iterator + Send,
    I::Item: Send,
{
    fn drain_once(&self) {
        let mut inner = self.inner.lock();
        loop {
            if self.status.is_cancelled() {
                return;
            }
            // Exhaustion is checked ahead of demand: completion needs no
            // request, so the last item and on_complete arrive together.
            if inner.items.peek().is_none() {
                if self.status.finish(StreamState::Completed) {
                    inner.subscriber.on_complete();
                }
                return;
            }
            if !self.demand.try_consume() {
                return;
            }
            let Some(item) = inner.items.next() else {
                return;
            };
            inner.subscriber.on_next(item);
        }
    }
}

impl<I> SubscriptionLink for IterState<I>
where
    I: Iterator + Send,
    I::Item: Send,
{
    fn request(&self, n: u64) {
        self.demand.add(n);
        self.gate.run(|| self.drain_once());
    }

    fn cancel(&self) {
        self.status.finish(StreamState::Cancelled);
    }

    fn is_cancelled(&self) -> bool {
        self.status.is_cancelled()
    }
}
