// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Programmatic source driven through an [`Emitter`].

use std::collections::VecDeque;
use std::sync::Arc;

use efflux_core::{
    Demand, DrainGate, FluxError, Publisher, Status, StreamState, Subscriber, Subscription,
    SubscriptionLink,
};
use parking_lot::Mutex;

/// Handle used by a producer callback to push signals into a stream.
///
/// Cloneable and sendable, so the producer may hand it to another thread or
/// a timer task. Items pushed ahead of demand are buffered without bound and
/// delivered as the subscriber requests them.
///
/// # Behavior
/// - The first of [`Emitter::complete`] / [`Emitter::error`] wins; every
///   later signal is dropped silently.
/// - A pending terminal waits until all buffered items have been delivered.
/// - After the subscriber cancels, all signals are dropped silently;
///   well-behaved producers poll [`Emitter::is_cancelled`] and stop early.
pub struct Emitter<T> {
    state: Arc<CreateState<T>>,
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T: Send + 'static> Emitter<T> {
    /// Pushes one item into the stream.
    ///
    /// Buffered if the subscriber has no outstanding demand. Dropped
    /// silently once the stream has terminated.
    pub fn next(&self, item: T) {
        {
            let mut data = self.state.data.lock();
            if self.state.status.is_terminal() || data.terminal.is_some() {
                tracing::trace!("emitter item dropped after terminal signal");
                return;
            }
            data.items.push_back(item);
        }
        self.state.drain();
    }

    /// Marks the stream as failed.
    ///
    /// Items already buffered are still delivered first; the error follows
    /// them. Dropped silently when a terminal signal was already recorded.
    pub fn error(&self, error: FluxError) {
        {
            let mut data = self.state.data.lock();
            if self.state.status.is_terminal() || data.terminal.is_some() {
                tracing::debug!(%error, "emitter error dropped after terminal signal");
                return;
            }
            data.terminal = Some(PendingTerminal::Error(error));
        }
        self.state.drain();
    }

    /// Marks the stream as finished.
    ///
    /// Items already buffered are still delivered first.
    pub fn complete(&self) {
        {
            let mut data = self.state.data.lock();
            if self.state.status.is_terminal() || data.terminal.is_some() {
                return;
            }
            data.terminal = Some(PendingTerminal::Complete);
        }
        self.state.drain();
    }

    /// Returns `true` once the subscriber has cancelled its subscription.
    pub fn is_cancelled(&self) -> bool {
        self.state.status.is_cancelled()
    }
}

/// Publisher that invokes a producer callback once per subscription.
pub(crate) struct CreateSource<F> {
    producer: Arc<F>,
}

impl<F> CreateSource<F> {
    pub(crate) fn new(producer: F) -> Self {
        Self {
            producer: Arc::new(producer),
        }
    }
}

impl<T, F> Publisher<T> for CreateSource<F>
where
    T: Send + 'static,
    F: Fn(Emitter<T>) + Send + Sync + 'static,
{
    fn subscribe(&self, subscriber: Box<dyn Subscriber<T>>) -> Subscription {
        let state = Arc::new(CreateState {
            data: Mutex::new(CreateQueue {
                items: VecDeque::new(),
                terminal: None,
            }),
            subscriber: Mutex::new(subscriber),
            demand: Demand::new(),
            status: Status::new(),
            gate: DrainGate::new(),
        });
        let subscription = Subscription::new(state.clone());

        state.gate.enter();
        state.subscriber.lock().on_subscribe(subscription.clone());
        state.gate.resume(|| state.drain_once());

        // The producer runs after the subscriber holds its handle, so
        // synchronous emissions already see any demand placed up front.
        (self.producer)(Emitter { state });

        subscription
    }
}

enum PendingTerminal {
    Complete,
    Error(FluxError),
}

enum Step<T> {
    Item(T),
    Finish,
    Fail(FluxError),
    Idle,
}

struct CreateQueue<T> {
    items: VecDeque<T>,
    terminal: Option<PendingTerminal>,
}

struct CreateState<T> {
    data: Mutex<CreateQueue<T>>,
    subscriber: Mutex<Box<dyn Subscriber<T>>>,
    demand: Demand,
    status: Status,
    gate: DrainGate,
}

impl<T: Send> CreateState<T> {
    fn drain(&self) {
        self.gate.run(|| self.drain_once());
    }

    fn drain_once(&self) {
        loop {
            if self.status.is_cancelled() {
                self.data.lock().items.clear();
                return;
            }
            let step = {
                let mut data = self.data.lock();
                if !data.items.is_empty() {
                    if self.demand.try_consume() {
                        match data.items.pop_front() {
                            Some(item) => Step::Item(item),
                            None => Step::Idle,
                        }
                    } else {
                        Step::Idle
                    }
                } else {
                    match data.terminal.take() {
                        Some(PendingTerminal::Complete) => Step::Finish,
                        Some(PendingTerminal::Error(error)) => Step::Fail(error),
                        None => Step::Idle,
                    }
                }
            };
            match step {
                Step::Item(item) => self.subscriber.lock().on_next(item),
                Step::Finish => {
                    if self.status.finish(StreamState::Completed) {
                        self.subscriber.lock().on_complete();
                    }
                    return;
                }
                Step::Fail(error) => {
                    if self.status.finish(StreamState::Errored) {
                        self.subscriber.lock().on_error(error);
                    }
                    return;
                }
                Step::Idle => return,
            }
        }
    }
}

impl<T: Send> SubscriptionLink for CreateState<T> {
    fn request(&self, n: u64) {
        self.demand.add(n);
        self.drain();
    }

    fn cancel(&self) {
        if self.status.finish(StreamState::Cancelled) {
            self.data.lock().items.clear();
        }
    }

    fn is_cancelled(&self) -> bool {
        self.status.is_cancelled()
    }
}
