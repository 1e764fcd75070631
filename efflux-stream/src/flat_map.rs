// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Merge-mapping with bounded concurrency.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use efflux_core::{
    Demand, DrainGate, FluxError, Publisher, Status, StreamState, Subscriber, Subscription,
    SubscriptionLink,
};
use parking_lot::Mutex;

use crate::flux::Flux;

/// How many source items are mapped and subscribed at once by default.
pub(crate) const DEFAULT_CONCURRENCY: u64 = 32;
/// How many items are requested up front from each inner sequence.
pub(crate) const DEFAULT_PREFETCH: u64 = 32;

/// Maps each item to an inner sequence and merges the inner items.
///
/// Memory stays bounded by `concurrency * prefetch` queued items: the
/// upstream window is `concurrency` (replenished as inners terminate) and
/// each inner is asked for `prefetch` items, replenished one by one as its
/// items are handed downstream. Arrival order across inners is preserved,
/// which for mixed-speed inners means interleaving.
pub(crate) struct FlatMapOperator<T, U> {
    source: Flux<T>,
    mapper: Arc<dyn Fn(T) -> Flux<U> + Send + Sync>,
    concurrency: u64,
    prefetch: u64,
}

impl<T, U> FlatMapOperator<T, U> {
    pub(crate) fn new<F>(source: Flux<T>, mapper: F, concurrency: u64, prefetch: u64) -> Self
    where
        F: Fn(T) -> Flux<U> + Send + Sync + 'static,
    {
        Self {
            source,
            mapper: Arc::new(mapper),
            concurrency: concurrency.max(1),
            prefetch: prefetch.max(1),
        }
    }
}

impl<T, U> Publisher<U> for FlatMapOperator<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    fn subscribe(&self, subscriber: Box<dyn Subscriber<U>>) -> Subscription {
        let state = Arc::new(FlatMapState {
            downstream: Mutex::new(subscriber),
            demand: Demand::new(),
            status: Status::new(),
            gate: DrainGate::new(),
            queue: Mutex::new(VecDeque::new()),
            inners: Mutex::new(HashMap::new()),
            next_inner_id: AtomicU64::new(0),
            active: AtomicU64::new(0),
            outer_done: AtomicBool::new(false),
            outer: Mutex::new(None),
            error_slot: Mutex::new(None),
            prefetch: self.prefetch,
        });
        self.source.subscribe_with(OuterSubscriber {
            state,
            mapper: self.mapper.clone(),
            concurrency: self.concurrency,
        })
    }
}

struct FlatMapState<U> {
    downstream: Mutex<Box<dyn Subscriber<U>>>,
    demand: Demand,
    status: Status,
    gate: DrainGate,
    /// Merged inner items, tagged with the id of the inner they came from.
    queue: Mutex<VecDeque<(u64, U)>>,
    inners: Mutex<HashMap<u64, Subscription>>,
    next_inner_id: AtomicU64,
    active: AtomicU64,
    outer_done: AtomicBool,
    outer: Mutex<Option<Subscription>>,
    error_slot: Mutex<Option<FluxError>>,
    prefetch: u64,
}

impl<U: Send> FlatMapState<U> {
    fn drain(&self) {
        self.gate.run(|| self.drain_once());
    }

    fn drain_once(&self) {
        loop {
            if self.status.is_cancelled() {
                self.queue.lock().clear();
                return;
            }
            let failure = self.error_slot.lock().take();
            if let Some(error) = failure {
                if self.status.finish(StreamState::Errored) {
                    self.shutdown_upstreams();
                    self.queue.lock().clear();
                    self.downstream.lock().on_error(error);
                }
                return;
            }
            let popped = {
                let mut queue = self.queue.lock();
                if queue.is_empty() {
                    None
                } else if self.demand.try_consume() {
                    queue.pop_front()
                } else {
                    None
                }
            };
            match popped {
                Some((inner_id, item)) => {
                    self.downstream.lock().on_next(item);
                    // Refill the window of the inner that produced the item.
                    let inner = self.inners.lock().get(&inner_id).cloned();
                    if let Some(inner) = inner {
                        inner.request(1);
                    }
                }
                None => {
                    let drained = self.queue.lock().is_empty();
                    if drained
                        && self.outer_done.load(Ordering::Acquire)
                        && self.active.load(Ordering::Acquire) == 0
                        && self.status.finish(StreamState::Completed)
                    {
                        self.downstream.lock().on_complete();
                    }
                    return;
                }
            }
        }
    }

    fn fail(&self, error: FluxError) {
        {
            let mut slot = self.error_slot.lock();
            if slot.is_none() && self.status.is_active() {
                *slot = Some(error);
            } else {
                tracing::debug!(%error, "error dropped, stream already terminating");
            }
        }
        self.drain();
    }

    fn shutdown_upstreams(&self) {
        if let Some(outer) = self.outer.lock().take() {
            outer.cancel();
        }
        let inners: Vec<Subscription> = self.inners.lock().drain().map(|(_, s)| s).collect();
        for inner in inners {
            inner.cancel();
        }
    }
}

impl<U: Send> SubscriptionLink for FlatMapState<U> {
    fn request(&self, n: u64) {
        self.demand.add(n);
        self.drain();
    }

    fn cancel(&self) {
        if self.status.finish(StreamState::Cancelled) {
            self.shutdown_upstreams();
            self.queue.lock().clear();
        }
    }

    fn is_cancelled(&self) -> bool {
        self.status.is_cancelled()
    }
}

struct OuterSubscriber<T, U> {
    state: Arc<FlatMapState<U>>,
    mapper: Arc<dyn Fn(T) -> Flux<U> + Send + Sync>,
    concurrency: u64,
}

impl<T, U> Subscriber<T> for OuterSubscriber<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    fn on_subscribe(&mut self, subscription: Subscription) {
        *self.state.outer.lock() = Some(subscription.clone());

        self.state.gate.enter();
        self.state
            .downstream
            .lock()
            .on_subscribe(Subscription::new(self.state.clone()));
        self.state.gate.resume(|| self.state.drain_once());

        // The outer window is fixed at `concurrency`, independent of
        // downstream demand; inner queues absorb the difference.
        if self.state.status.is_active() {
            subscription.request(self.concurrency);
        }
    }

    fn on_next(&mut self, item: T) {
        if !self.state.status.is_active() {
            return;
        }
        let inner = (self.mapper)(item);
        let id = self.state.next_inner_id.fetch_add(1, Ordering::Relaxed);
        self.state.active.fetch_add(1, Ordering::AcqRel);
        inner.subscribe_with(InnerSubscriber {
            state: self.state.clone(),
            id,
        });
    }

    fn on_error(&mut self, error: FluxError) {
        self.state.fail(error);
    }

    fn on_complete(&mut self) {
        self.state.outer_done.store(true, Ordering::Release);
        self.state.drain();
    }
}

struct InnerSubscriber<U> {
    state: Arc<FlatMapState<U>>,
    id: u64,
}

impl<U: Send + 'static> Subscriber<U> for InnerSubscriber<U> {
    fn on_subscribe(&mut self, subscription: Subscription) {
        if self.state.status.is_terminal() {
            subscription.cancel();
            return;
        }
        self.state.inners.lock().insert(self.id, subscription.clone());
        subscription.request(self.state.prefetch);
    }

    fn on_next(&mut self, item: U) {
        self.state.queue.lock().push_back((self.id, item));
        self.state.drain();
    }

    fn on_error(&mut self, error: FluxError) {
        self.state.inners.lock().remove(&self.id);
        self.state.active.fetch_sub(1, Ordering::AcqRel);
        self.state.fail(error);
    }

    fn on_complete(&mut self) {
        self.state.inners.lock().remove(&self.id);
        self.state.active.fetch_sub(1, Ordering::AcqRel);
        // One inner finished: let one more source item through the window.
        if self.state.status.is_active() && !self.state.outer_done.load(Ordering::Acquire) {
            let outer = self.state.outer.lock().clone();
            if let Some(outer) = outer {
                outer.request(1);
            }
        }
        self.state.drain();
    }
}
