// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Decoupling downstream requests from upstream batch sizes.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use efflux_core::{
    Demand, DrainGate, FluxError, Publisher, Status, StreamState, Subscriber, Subscription,
    SubscriptionLink,
};
use parking_lot::Mutex;

use crate::flux::Flux;

/// Caps what the upstream ever sees to batches of `prefetch`.
///
/// Whatever the downstream requests, the upstream is asked for `prefetch`
/// items up front and replenished once three quarters of a batch have been
/// delivered. Large or unbounded downstream requests therefore translate to
/// a steady pull instead of a single giant one.
pub(crate) struct LimitRateOperator<T> {
    source: Flux<T>,
    prefetch: u64,
}

impl<T> LimitRateOperator<T> {
    pub(crate) fn new(source: Flux<T>, prefetch: u64) -> Self {
        Self {
            source,
            prefetch: prefetch.max(1),
        }
    }
}

impl<T: Send + 'static> Publisher<T> for LimitRateOperator<T> {
    fn subscribe(&self, subscriber: Box<dyn Subscriber<T>>) -> Subscription {
        let prefetch = self.prefetch;
        let state = Arc::new(LimitRateState {
            downstream: Mutex::new(subscriber),
            queue: Mutex::new(VecDeque::new()),
            upstream: Mutex::new(None),
            demand: Demand::new(),
            status: Status::new(),
            gate: DrainGate::new(),
            error_slot: Mutex::new(None),
            done: AtomicBool::new(false),
            consumed: AtomicU64::new(0),
            replenish_mark: (prefetch - (prefetch >> 2)).max(1),
            prefetch,
        });
        self.source.subscribe_with(RateSubscriber { state })
    }
}

struct LimitRateState<T> {
    downstream: Mutex<Box<dyn Subscriber<T>>>,
    queue: Mutex<VecDeque<T>>,
    upstream: Mutex<Option<Subscription>>,
    demand: Demand,
    status: Status,
    gate: DrainGate,
    error_slot: Mutex<Option<FluxError>>,
    done: AtomicBool,
    /// Items delivered since the last replenishing request.
    consumed: AtomicU64,
    replenish_mark: u64,
    prefetch: u64,
}

impl<T: Send> LimitRateState<T> {
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
                Some(item) => {
                    self.downstream.lock().on_next(item);
                    let consumed = self.consumed.fetch_add(1, Ordering::AcqRel) + 1;
                    if consumed >= self.replenish_mark && !self.done.load(Ordering::Acquire) {
                        self.consumed.fetch_sub(consumed, Ordering::AcqRel);
                        let upstream = self.upstream.lock().clone();
                        if let Some(upstream) = upstream {
                            upstream.request(consumed);
                        }
                    }
                }
                None => {
                    if self.queue.lock().is_empty()
                        && self.done.load(Ordering::Acquire)
                        && self.status.finish(StreamState::Completed)
                    {
                        self.downstream.lock().on_complete();
                    }
                    return;
                }
            }
        }
    }
}

impl<T: Send> SubscriptionLink for LimitRateState<T> {
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
            self.queue.lock().clear();
        }
    }

    fn is_cancelled(&self) -> bool {
        self.status.is_cancelled()
    }
}

struct RateSubscriber<T> {
    state: Arc<LimitRateState<T>>,
}

impl<T: Send + 'static> Subscriber<T> for RateSubscriber<T> {
    fn on_subscribe(&mut self, subscription: Subscription) {
        *self.state.upstream.lock() = Some(subscription.clone());

        self.state.gate.enter();
        self.state
            .downstream
            .lock()
            .on_subscribe(Subscription::new(self.state.clone()));
        self.state.gate.resume(|| self.state.drain_once());

        if self.state.status.is_active() {
            subscription.request(self.state.prefetch);
        }
    }

    fn on_next(&mut self, item: T) {
        self.state.queue.lock().push_back(item);
        self.state.drain();
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
