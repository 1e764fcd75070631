// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Retry and repeat: resubscribing a cold source after a terminal signal.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use efflux_core::{DrainGate, FluxError, Publisher, Subscriber, Subscription, SubscriptionLink};
use parking_lot::Mutex;

use crate::arbiter::SubscriptionArbiter;
use crate::flux::Flux;

/// Which terminal signal triggers a fresh subscription.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Retrigger {
    /// `retry`: swallow errors while attempts remain.
    Error,
    /// `repeat`: swallow completions while repeats remain.
    Complete,
}

/// Operator that plays the source again up to `times` extra rounds.
///
/// `retry(n)` therefore makes at most `n + 1` subscription attempts; the
/// error of the last attempt is the one the downstream sees.
pub(crate) struct Resubscribe<T> {
    source: Flux<T>,
    trigger: Retrigger,
    times: u64,
}

impl<T> Resubscribe<T> {
    pub(crate) fn new(source: Flux<T>, trigger: Retrigger, times: u64) -> Self {
        Self {
            source,
            trigger,
            times,
        }
    }
}

impl<T: Send + 'static> Publisher<T> for Resubscribe<T> {
    fn subscribe(&self, subscriber: Box<dyn Subscriber<T>>) -> Subscription {
        let shared = Arc::new(ResubShared {
            source: self.source.clone(),
            downstream: Mutex::new(subscriber),
            arbiter: Arc::new(SubscriptionArbiter::new()),
            trigger: self.trigger,
            remaining: AtomicU64::new(self.times),
            gate: DrainGate::new(),
            pending: AtomicBool::new(false),
        });
        let subscription = Subscription::new(shared.arbiter.clone());

        shared.downstream.lock().on_subscribe(subscription.clone());
        shared.resubscribe();

        subscription
    }
}

struct ResubShared<T> {
    source: Flux<T>,
    downstream: Mutex<Box<dyn Subscriber<T>>>,
    arbiter: Arc<SubscriptionArbiter>,
    trigger: Retrigger,
    remaining: AtomicU64,
    gate: DrainGate,
    pending: AtomicBool,
}

impl<T: Send + 'static> ResubShared<T> {
    /// Starts the next attempt. A synchronous terminal inside `subscribe`
    /// lands back here; the gate flattens that recursion into the `while`
    /// loop so deep retry counts cannot overflow the stack.
    fn resubscribe(self: &Arc<Self>) {
        self.pending.store(true, Ordering::Release);
        self.gate.run(|| {
            while self.pending.swap(false, Ordering::AcqRel) {
                if self.arbiter.is_cancelled() {
                    return;
                }
                self.source.subscribe_with(AttemptSubscriber {
                    shared: Arc::clone(self),
                });
            }
        });
    }

    /// Consumes one remaining round, if any are left.
    fn take_round(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |left| {
                left.checked_sub(1)
            })
            .is_ok()
    }
}

struct AttemptSubscriber<T> {
    shared: Arc<ResubShared<T>>,
}

impl<T: Send + 'static> Subscriber<T> for AttemptSubscriber<T> {
    fn on_subscribe(&mut self, subscription: Subscription) {
        self.shared.arbiter.set_upstream(subscription);
    }

    fn on_next(&mut self, item: T) {
        self.shared.arbiter.note_produced(1);
        self.shared.downstream.lock().on_next(item);
    }

    fn on_error(&mut self, error: FluxError) {
        if self.shared.trigger == Retrigger::Error && self.shared.take_round() {
            tracing::debug!(
                %error,
                remaining = self.shared.remaining.load(Ordering::Acquire),
                "resubscribing after error"
            );
            self.shared.resubscribe();
            return;
        }
        self.shared.downstream.lock().on_error(error);
    }

    fn on_complete(&mut self) {
        if self.shared.trigger == Retrigger::Complete && self.shared.take_round() {
            self.shared.resubscribe();
            return;
        }
        self.shared.downstream.lock().on_complete();
    }
}
