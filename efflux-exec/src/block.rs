// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Blocking drains with a mandatory timeout.

use std::sync::Arc;
use std::time::{Duration, Instant};

use efflux_core::{Demand, FluxError, Result, Subscriber, Subscription};
use efflux_stream::{Flux, Mono};
use parking_lot::{Condvar, Mutex};

/// Drains a sequence on the calling thread.
///
/// The timeout is not optional: a stream that never terminates would
/// otherwise park the caller forever. When the bound elapses the
/// subscription is cancelled and [`FluxError::Timeout`] is returned.
pub trait BlockingExt<T: Send + 'static> {
    /// Runs the sequence with unbounded demand and waits for its terminal
    /// signal, returning the last item seen, or `None` for an empty
    /// sequence.
    fn block_last(&self, timeout: Duration) -> Result<Option<T>>;

    /// Waits for the first item only, then cancels the rest of the
    /// sequence.
    fn block_first(&self, timeout: Duration) -> Result<Option<T>>;

    /// Alias for [`BlockingExt::block_last`]; reads naturally on a
    /// [`Mono`], where last and first coincide.
    fn block(&self, timeout: Duration) -> Result<Option<T>> {
        self.block_last(timeout)
    }
}

impl<T: Send + 'static> BlockingExt<T> for Flux<T> {
    fn block_last(&self, timeout: Duration) -> Result<Option<T>> {
        block_on_terminal(self, timeout, false)
    }

    fn block_first(&self, timeout: Duration) -> Result<Option<T>> {
        block_on_terminal(self, timeout, true)
    }
}

impl<T: Send + 'static> BlockingExt<T> for Mono<T> {
    fn block_last(&self, timeout: Duration) -> Result<Option<T>> {
        self.clone().into_flux().block_last(timeout)
    }

    fn block_first(&self, timeout: Duration) -> Result<Option<T>> {
        self.clone().into_flux().block_first(timeout)
    }
}

fn block_on_terminal<T: Send + 'static>(
    flux: &Flux<T>,
    timeout: Duration,
    first_only: bool,
) -> Result<Option<T>> {
    let shared = Arc::new(LatchShared {
        state: Mutex::new(LatchState {
            item: None,
            error: None,
            done: false,
        }),
        terminal: Condvar::new(),
    });

    let started = Instant::now();
    let subscription = flux.subscribe_with(LatchSubscriber {
        shared: shared.clone(),
        first_only,
        subscription: None,
    });

    let deadline = started + timeout;
    let mut state = shared.state.lock();
    while !state.done {
        if shared.terminal.wait_until(&mut state, deadline).timed_out() {
            drop(state);
            subscription.cancel();
            return Err(FluxError::timeout(started.elapsed()));
        }
    }
    match state.error.take() {
        Some(error) => Err(error),
        None => Ok(state.item.take()),
    }
}

struct LatchShared<T> {
    state: Mutex<LatchState<T>>,
    terminal: Condvar,
}

struct LatchState<T> {
    item: Option<T>,
    error: Option<FluxError>,
    done: bool,
}

impl<T> LatchShared<T> {
    fn finish(&self, error: Option<FluxError>) {
        let mut state = self.state.lock();
        if state.done {
            return;
        }
        state.done = true;
        state.error = error;
        drop(state);
        self.terminal.notify_all();
    }
}

struct LatchSubscriber<T> {
    shared: Arc<LatchShared<T>>,
    first_only: bool,
    subscription: Option<Subscription>,
}

impl<T: Send> Subscriber<T> for LatchSubscriber<T> {
    fn on_subscribe(&mut self, subscription: Subscription) {
        // Stored first: a synchronous source delivers the first item from
        // inside this request, and on_next needs the handle to cancel.
        self.subscription = Some(subscription.clone());
        subscription.request(if self.first_only {
            1
        } else {
            Demand::UNBOUNDED
        });
    }

    fn on_next(&mut self, item: T) {
        self.shared.state.lock().item = Some(item);
        if self.first_only {
            if let Some(subscription) = &self.subscription {
                subscription.cancel();
            }
            self.shared.finish(None);
        }
    }

    fn on_error(&mut self, error: FluxError) {
        self.shared.finish(Some(error));
    }

    fn on_complete(&mut self) {
        self.shared.finish(None);
    }
}
