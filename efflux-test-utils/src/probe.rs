// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A subscriber that records everything it is told.

use std::sync::Arc;
use std::time::{Duration, Instant};

use efflux_core::{Demand, FluxError, Signal, Subscriber, Subscription};
use parking_lot::{Condvar, Mutex};

/// Recording subscriber for driving publishers in tests.
///
/// Clones share one recording, so the usual pattern is to hand a clone to
/// `subscribe_with` and keep the original for assertions:
///
/// ```
/// use efflux_core::{Publisher, Subscriber, Subscription};
/// use efflux_test_utils::TestSubscriber;
///
/// struct One;
///
/// impl Publisher<u32> for One {
///     fn subscribe(&self, mut subscriber: Box<dyn Subscriber<u32>>) -> Subscription {
///         let subscription = Subscription::inert();
///         subscriber.on_subscribe(subscription.clone());
///         subscriber.on_next(42);
///         subscriber.on_complete();
///         subscription
///     }
/// }
///
/// let probe = TestSubscriber::unbounded();
/// One.subscribe(Box::new(probe.clone()));
///
/// assert_eq!(probe.values(), vec![42]);
/// assert!(probe.is_completed());
/// ```
///
/// Demand is configurable: [`TestSubscriber::unbounded`] asks for everything
/// up front, [`TestSubscriber::with_initial_demand`] places one bounded
/// request, and [`TestSubscriber::manual`] requests nothing until the test
/// calls [`TestSubscriber::request`]. The `await_*` methods block with a
/// timeout, for streams fed from another thread or a timer.
pub struct TestSubscriber<T> {
    shared: Arc<ProbeShared<T>>,
}

impl<T> Clone for TestSubscriber<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

struct ProbeShared<T> {
    initial_demand: u64,
    state: Mutex<ProbeState<T>>,
    changed: Condvar,
}

struct ProbeState<T> {
    signals: Vec<Signal<T>>,
    subscription: Option<Subscription>,
}

impl<T> TestSubscriber<T> {
    fn with_demand(initial_demand: u64) -> Self {
        Self {
            shared: Arc::new(ProbeShared {
                initial_demand,
                state: Mutex::new(ProbeState {
                    signals: Vec::new(),
                    subscription: None,
                }),
                changed: Condvar::new(),
            }),
        }
    }

    /// Probe that requests everything as soon as it is subscribed.
    pub fn unbounded() -> Self {
        Self::with_demand(Demand::UNBOUNDED)
    }

    /// Probe that places one bounded request of `n` on subscription.
    pub fn with_initial_demand(n: u64) -> Self {
        Self::with_demand(n)
    }

    /// Probe that requests nothing until told to.
    pub fn manual() -> Self {
        Self::with_demand(0)
    }

    /// Requests `n` more items through the recorded subscription.
    ///
    /// # Panics
    /// Panics when called before the probe was subscribed.
    pub fn request(&self, n: u64) {
        let subscription = self
            .shared
            .state
            .lock()
            .subscription
            .clone()
            .expect("probe is not subscribed yet");
        subscription.request(n);
    }

    /// Cancels the recorded subscription.
    ///
    /// # Panics
    /// Panics when called before the probe was subscribed.
    pub fn cancel(&self) {
        let subscription = self
            .shared
            .state
            .lock()
            .subscription
            .clone()
            .expect("probe is not subscribed yet");
        subscription.cancel();
    }

    /// Number of items received so far.
    pub fn count(&self) -> usize {
        self.shared
            .state
            .lock()
            .signals
            .iter()
            .filter(|signal| signal.is_next())
            .count()
    }

    /// The error that terminated the stream, if any.
    pub fn error(&self) -> Option<FluxError> {
        self.shared
            .state
            .lock()
            .signals
            .iter()
            .find_map(|signal| signal.as_error().cloned())
    }

    /// Returns `true` once `on_complete` was received.
    pub fn is_completed(&self) -> bool {
        self.shared
            .state
            .lock()
            .signals
            .iter()
            .any(|signal| signal.is_complete())
    }

    /// Returns `true` once either terminal signal was received.
    pub fn is_terminated(&self) -> bool {
        self.shared
            .state
            .lock()
            .signals
            .iter()
            .any(|signal| signal.is_terminal())
    }

    /// Blocks until `n` items have arrived. `false` on timeout.
    pub fn await_count(&self, n: usize, timeout: Duration) -> bool {
        self.await_while(timeout, |state| {
            state.signals.iter().filter(|signal| signal.is_next()).count() < n
        })
    }

    /// Blocks until the stream terminates. `false` on timeout.
    pub fn await_terminal(&self, timeout: Duration) -> bool {
        self.await_while(timeout, |state| {
            !state.signals.iter().any(|signal| signal.is_terminal())
        })
    }

    /// Blocks until the stream fails. `false` on timeout.
    pub fn await_error(&self, timeout: Duration) -> bool {
        self.await_while(timeout, |state| {
            !state.signals.iter().any(|signal| signal.is_error())
        })
    }

    fn await_while(&self, timeout: Duration, pending: impl Fn(&ProbeState<T>) -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock();
        while pending(&state) {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            if self
                .shared
                .changed
                .wait_for(&mut state, deadline - now)
                .timed_out()
                && pending(&state)
            {
                return false;
            }
        }
        true
    }
}

impl<T: Clone> TestSubscriber<T> {
    /// Every item received so far, in arrival order.
    pub fn values(&self) -> Vec<T> {
        self.shared
            .state
            .lock()
            .signals
            .iter()
            .filter_map(|signal| signal.as_next().cloned())
            .collect()
    }

    /// Every signal received so far, in arrival order.
    pub fn signals(&self) -> Vec<Signal<T>> {
        self.shared.state.lock().signals.clone()
    }
}

impl<T: Send> Subscriber<T> for TestSubscriber<T> {
    fn on_subscribe(&mut self, subscription: Subscription) {
        {
            let mut state = self.shared.state.lock();
            state.subscription = Some(subscription.clone());
        }
        if self.shared.initial_demand > 0 {
            subscription.request(self.shared.initial_demand);
        }
        self.shared.changed.notify_all();
    }

    fn on_next(&mut self, item: T) {
        self.shared.state.lock().signals.push(Signal::Next(item));
        self.shared.changed.notify_all();
    }

    fn on_error(&mut self, error: FluxError) {
        self.shared.state.lock().signals.push(Signal::Error(error));
        self.shared.changed.notify_all();
    }

    fn on_complete(&mut self) {
        self.shared.state.lock().signals.push(Signal::Complete);
        self.shared.changed.notify_all();
    }
}
