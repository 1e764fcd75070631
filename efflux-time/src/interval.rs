// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Periodic tick source.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use efflux_core::{
    Demand, FluxError, Publisher, Status, StreamState, Subscriber, Subscription, SubscriptionLink,
};
use efflux_stream::Flux;
use parking_lot::Mutex;

use crate::scheduler::{Scheduler, TaskHandle};

/// Sequence ticking every `period` on the shared scheduler.
///
/// Each subscription owns its own periodic task and counter, starting at 0.
/// The source never buffers: a tick that finds no outstanding demand
/// terminates the subscription with [`FluxError::Overflow`], so subscribers
/// must keep demand ahead of the tick rate (typically by requesting
/// unbounded). Cancellation and both terminal signals cancel the task.
pub fn interval(period: Duration) -> Flux<u64> {
    interval_with(period, period, &Scheduler::shared())
}

/// [`interval`] with an explicit initial delay and scheduler.
pub fn interval_with(initial_delay: Duration, period: Duration, scheduler: &Scheduler) -> Flux<u64> {
    Flux::from_publisher(IntervalSource {
        initial_delay,
        period,
        scheduler: scheduler.clone(),
    })
}

struct IntervalSource {
    initial_delay: Duration,
    period: Duration,
    scheduler: Scheduler,
}

impl Publisher<u64> for IntervalSource {
    fn subscribe(&self, mut subscriber: Box<dyn Subscriber<u64>>) -> Subscription {
        let state = Arc::new(IntervalState {
            subscriber: Mutex::new(None),
            demand: Demand::new(),
            status: Status::new(),
            counter: AtomicU64::new(0),
            task: Mutex::new(None),
        });
        let subscription = Subscription::new(state.clone());
        subscriber.on_subscribe(subscription.clone());
        // The slot is filled only after on_subscribe so an up-front request
        // lands before the first tick can observe the subscriber.
        *state.subscriber.lock() = Some(subscriber);

        let ticker = state.clone();
        let handle = self
            .scheduler
            .schedule_periodic(self.initial_delay, self.period, move || ticker.tick());
        if state.status.is_terminal() {
            handle.cancel();
        } else {
            *state.task.lock() = Some(handle);
        }

        subscription
    }
}

struct IntervalState {
    subscriber: Mutex<Option<Box<dyn Subscriber<u64>>>>,
    demand: Demand,
    status: Status,
    counter: AtomicU64,
    task: Mutex<Option<TaskHandle>>,
}

impl IntervalState {
    /// Runs on the timer thread, once per period.
    fn tick(&self) {
        if !self.status.is_active() {
            self.cancel_task();
            return;
        }
        if !self.demand.try_consume() {
            if self.status.finish(StreamState::Errored) {
                self.cancel_task();
                let error = FluxError::overflow("interval tick found no outstanding demand");
                tracing::warn!(%error, "interval terminated");
                if let Some(subscriber) = self.subscriber.lock().as_mut() {
                    subscriber.on_error(error);
                }
            }
            return;
        }
        let value = self.counter.fetch_add(1, Ordering::Relaxed);
        let mut slot = self.subscriber.lock();
        if !self.status.is_active() {
            return;
        }
        if let Some(subscriber) = slot.as_mut() {
            subscriber.on_next(value);
        }
    }

    fn cancel_task(&self) {
        if let Some(task) = self.task.lock().take() {
            task.cancel();
        }
    }
}

impl SubscriptionLink for IntervalState {
    fn request(&self, n: u64) {
        self.demand.add(n);
    }

    fn cancel(&self) {
        if self.status.finish(StreamState::Cancelled) {
            self.cancel_task();
        }
    }

    fn is_cancelled(&self) -> bool {
        self.status.is_cancelled()
    }
}
