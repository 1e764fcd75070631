// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! One-shot delays and element pacing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use efflux_core::{
    Demand, DrainGate, FluxError, Publisher, Status, StreamState, Subscriber, Subscription,
    SubscriptionLink,
};
use efflux_stream::{Flux, Mono};
use parking_lot::Mutex;

use crate::scheduler::{Scheduler, TaskHandle};

/// Completes with `0` once `duration` has elapsed, using the shared
/// scheduler.
///
/// The clock starts at subscription time, independently per subscriber. The
/// value is held until the subscriber has requested; cancellation before the
/// deadline cancels the timer task.
pub fn delay(duration: Duration) -> Mono<u64> {
    delay_with(duration, &Scheduler::shared())
}

/// [`delay`] on an explicit scheduler.
pub fn delay_with(duration: Duration, scheduler: &Scheduler) -> Mono<u64> {
    Mono::from_publisher(DelaySource {
        duration,
        scheduler: scheduler.clone(),
    })
}

struct DelaySource {
    duration: Duration,
    scheduler: Scheduler,
}

impl Publisher<u64> for DelaySource {
    fn subscribe(&self, mut subscriber: Box<dyn Subscriber<u64>>) -> Subscription {
        let state = Arc::new(DelayState {
            subscriber: Mutex::new(None),
            demand: Demand::new(),
            status: Status::new(),
            gate: DrainGate::new(),
            ready: AtomicBool::new(false),
            task: Mutex::new(None),
        });
        let subscription = Subscription::new(state.clone());
        subscriber.on_subscribe(subscription.clone());
        *state.subscriber.lock() = Some(subscriber);

        let armed = state.clone();
        let handle = self.scheduler.schedule_once(self.duration, move || {
            armed.ready.store(true, Ordering::Release);
            armed.drain();
        });
        if state.status.is_terminal() {
            handle.cancel();
        } else {
            *state.task.lock() = Some(handle);
        }

        subscription
    }
}

struct DelayState {
    subscriber: Mutex<Option<Box<dyn Subscriber<u64>>>>,
    demand: Demand,
    status: Status,
    gate: DrainGate,
    ready: AtomicBool,
    task: Mutex<Option<TaskHandle>>,
}

impl DelayState {
    fn drain(&self) {
        self.gate.run(|| {
            if !self.ready.load(Ordering::Acquire) || !self.demand.try_consume() {
                return;
            }
            if self.status.finish(StreamState::Completed) {
                if let Some(subscriber) = self.subscriber.lock().as_mut() {
                    subscriber.on_next(0);
                    subscriber.on_complete();
                }
            }
        });
    }
}

impl SubscriptionLink for DelayState {
    fn request(&self, n: u64) {
        self.demand.add(n);
        self.drain();
    }

    fn cancel(&self) {
        if self.status.finish(StreamState::Cancelled) {
            if let Some(task) = self.task.lock().take() {
                task.cancel();
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.status.is_cancelled()
    }
}

/// Pacing operators on [`Flux`].
pub trait DelayElementsExt<T: Send + 'static> {
    /// Spaces items at least `delay` apart on the shared scheduler.
    ///
    /// The stage pulls one upstream item at a time: it reserves one unit of
    /// downstream demand, requests a single item, delivers it `delay` after
    /// arrival and only then pulls the next. An upstream burst therefore
    /// arrives as a paced drip, never as a delayed burst. Errors skip the
    /// wait and arrive undelayed, dropping an item still in flight.
    /// Completion trails the last delivered item.
    fn delay_elements(self, delay: Duration) -> Flux<T>;

    /// [`DelayElementsExt::delay_elements`] on an explicit scheduler.
    fn delay_elements_with(self, delay: Duration, scheduler: &Scheduler) -> Flux<T>;
}

impl<T: Send + 'static> DelayElementsExt<T> for Flux<T> {
    fn delay_elements(self, delay: Duration) -> Flux<T> {
        self.delay_elements_with(delay, &Scheduler::shared())
    }

    fn delay_elements_with(self, delay: Duration, scheduler: &Scheduler) -> Flux<T> {
        Flux::from_publisher(DelayElementsOperator {
            source: self,
            delay,
            scheduler: scheduler.clone(),
        })
    }
}

struct DelayElementsOperator<T> {
    source: Flux<T>,
    delay: Duration,
    scheduler: Scheduler,
}

impl<T: Send + 'static> Publisher<T> for DelayElementsOperator<T> {
    fn subscribe(&self, subscriber: Box<dyn Subscriber<T>>) -> Subscription {
        let state = Arc::new(PacerState {
            downstream: Mutex::new(Some(subscriber)),
            inner: Mutex::new(PacerInner {
                upstream: None,
                pulling: false,
                delayed: false,
                in_flight: None,
                upstream_done: false,
            }),
            demand: Demand::new(),
            status: Status::new(),
            delay: self.delay,
            scheduler: self.scheduler.clone(),
        });
        // The upstream attaches first so that a request made from inside the
        // downstream's on_subscribe has somewhere to go. Nothing can flow
        // before that request, so the ordering is safe.
        self.source.subscribe_with(PacerSubscriber {
            state: state.clone(),
        });
        let subscription = Subscription::new(state.clone());
        if let Some(downstream) = state.downstream.lock().as_mut() {
            downstream.on_subscribe(subscription.clone());
        }
        subscription
    }
}

struct PacerState<T> {
    downstream: Mutex<Option<Box<dyn Subscriber<T>>>>,
    inner: Mutex<PacerInner>,
    demand: Demand,
    status: Status,
    delay: Duration,
    scheduler: Scheduler,
}

struct PacerInner {
    upstream: Option<Subscription>,
    /// One item has been requested upstream and not yet delivered downstream.
    pulling: bool,
    /// An item has arrived and is waiting out its delay.
    delayed: bool,
    /// Delivery task for the delayed item, kept for cancellation.
    in_flight: Option<TaskHandle>,
    upstream_done: bool,
}

impl<T: Send + 'static> PacerState<T> {
    /// Reserves one unit of downstream demand and asks upstream for the
    /// next item, unless a pull is already outstanding.
    fn pull(&self) {
        let upstream = {
            let mut inner = self.inner.lock();
            if !self.status.is_active() || inner.pulling || inner.upstream_done {
                return;
            }
            if !self.demand.try_consume() {
                return;
            }
            inner.pulling = true;
            inner.upstream.clone()
        };
        // Requested outside the lock; a synchronous source re-enters
        // on_next from this call.
        if let Some(upstream) = upstream {
            upstream.request(1);
        }
    }

    /// Runs on the timer thread when the in-flight item's deadline arrives.
    fn deliver(&self, item: T) {
        if self.status.is_active() {
            if let Some(downstream) = self.downstream.lock().as_mut() {
                downstream.on_next(item);
            }
        }
        let done = {
            let mut inner = self.inner.lock();
            inner.pulling = false;
            inner.delayed = false;
            inner.in_flight = None;
            inner.upstream_done
        };
        if done {
            self.complete();
        } else {
            self.pull();
        }
    }

    fn complete(&self) {
        if self.status.finish(StreamState::Completed) {
            if let Some(downstream) = self.downstream.lock().as_mut() {
                downstream.on_complete();
            }
        }
    }
}

impl<T: Send + 'static> SubscriptionLink for PacerState<T> {
    fn request(&self, n: u64) {
        self.demand.add(n);
        self.pull();
    }

    fn cancel(&self) {
        if self.status.finish(StreamState::Cancelled) {
            let mut inner = self.inner.lock();
            if let Some(task) = inner.in_flight.take() {
                task.cancel();
            }
            if let Some(upstream) = inner.upstream.take() {
                drop(inner);
                upstream.cancel();
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.status.is_cancelled()
    }
}

struct PacerSubscriber<T> {
    state: Arc<PacerState<T>>,
}

impl<T: Send + 'static> Subscriber<T> for PacerSubscriber<T> {
    fn on_subscribe(&mut self, subscription: Subscription) {
        self.state.inner.lock().upstream = Some(subscription);
    }

    fn on_next(&mut self, item: T) {
        if self.state.status.is_terminal() {
            return;
        }
        // Marked before scheduling so a completion racing the timer never
        // sees an idle pacer while the item is still owed.
        self.state.inner.lock().delayed = true;
        let state = self.state.clone();
        let handle = self
            .state
            .scheduler
            .schedule_once(self.state.delay, move || state.deliver(item));
        self.state.inner.lock().in_flight = Some(handle);
    }

    fn on_error(&mut self, error: FluxError) {
        // Errors skip the wait; an item mid-delay is dropped with its task.
        if self.state.status.finish(StreamState::Errored) {
            if let Some(task) = self.state.inner.lock().in_flight.take() {
                task.cancel();
            }
            if let Some(downstream) = self.state.downstream.lock().as_mut() {
                downstream.on_error(error);
            }
        }
    }

    fn on_complete(&mut self) {
        // A pull with no item behind it (the source ran dry) must not hold
        // completion back; only an item actually waiting out its delay does.
        // In that case deliver() completes after the item lands.
        let idle = {
            let mut inner = self.state.inner.lock();
            inner.upstream_done = true;
            !inner.delayed
        };
        if idle {
            self.state.complete();
        }
    }
}
