// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Closure-based subscription adapters.

use efflux_core::{Demand, FluxError, Subscriber, Subscription};
use efflux_stream::{Flux, Mono};

/// Attaches closures to a sequence and starts it.
///
/// The returned [`Subscription`] can be kept to cancel later; dropping it
/// does not stop the stream.
pub trait SubscribeExt<T: Send + 'static> {
    /// Runs the sequence with unbounded demand, feeding each item to
    /// `on_next`.
    ///
    /// An error terminates the subscription and is logged through
    /// `tracing::error!`; it never escapes to the caller.
    fn subscribe<N>(&self, on_next: N) -> Subscription
    where
        N: FnMut(T) + Send + 'static;

    /// [`SubscribeExt::subscribe`] with explicit error and completion
    /// callbacks.
    fn subscribe_callbacks<N, E, C>(&self, on_next: N, on_error: E, on_complete: C) -> Subscription
    where
        N: FnMut(T) + Send + 'static,
        E: FnMut(FluxError) + Send + 'static,
        C: FnMut() + Send + 'static;

    /// Consumer-paced subscription: requests `batch` items up front and
    /// requests `batch` more every time that many have been consumed.
    ///
    /// The producer therefore never runs more than `batch` items ahead of
    /// `on_next`. A `batch` of zero is treated as one.
    fn subscribe_bounded<N>(&self, batch: u64, on_next: N) -> Subscription
    where
        N: FnMut(T) + Send + 'static;
}

impl<T: Send + 'static> SubscribeExt<T> for Flux<T> {
    fn subscribe<N>(&self, on_next: N) -> Subscription
    where
        N: FnMut(T) + Send + 'static,
    {
        self.subscribe_with(CallbackSubscriber {
            on_next,
            on_error: log_unhandled,
            on_complete: || {},
        })
    }

    fn subscribe_callbacks<N, E, C>(&self, on_next: N, on_error: E, on_complete: C) -> Subscription
    where
        N: FnMut(T) + Send + 'static,
        E: FnMut(FluxError) + Send + 'static,
        C: FnMut() + Send + 'static,
    {
        self.subscribe_with(CallbackSubscriber {
            on_next,
            on_error,
            on_complete,
        })
    }

    fn subscribe_bounded<N>(&self, batch: u64, on_next: N) -> Subscription
    where
        N: FnMut(T) + Send + 'static,
    {
        self.subscribe_with(BoundedSubscriber {
            batch: batch.max(1),
            consumed: 0,
            subscription: None,
            on_next,
        })
    }
}

impl<T: Send + 'static> SubscribeExt<T> for Mono<T> {
    fn subscribe<N>(&self, on_next: N) -> Subscription
    where
        N: FnMut(T) + Send + 'static,
    {
        self.subscribe_with(CallbackSubscriber {
            on_next,
            on_error: log_unhandled,
            on_complete: || {},
        })
    }

    fn subscribe_callbacks<N, E, C>(&self, on_next: N, on_error: E, on_complete: C) -> Subscription
    where
        N: FnMut(T) + Send + 'static,
        E: FnMut(FluxError) + Send + 'static,
        C: FnMut() + Send + 'static,
    {
        self.subscribe_with(CallbackSubscriber {
            on_next,
            on_error,
            on_complete,
        })
    }

    fn subscribe_bounded<N>(&self, batch: u64, on_next: N) -> Subscription
    where
        N: FnMut(T) + Send + 'static,
    {
        self.subscribe_with(BoundedSubscriber {
            batch: batch.max(1),
            consumed: 0,
            subscription: None,
            on_next,
        })
    }
}

fn log_unhandled(error: FluxError) {
    tracing::error!(%error, "unhandled stream error");
}

struct CallbackSubscriber<N, E, C> {
    on_next: N,
    on_error: E,
    on_complete: C,
}

impl<T, N, E, C> Subscriber<T> for CallbackSubscriber<N, E, C>
where
    T: Send,
    N: FnMut(T) + Send,
    E: FnMut(FluxError) + Send,
    C: FnMut() + Send,
{
    fn on_subscribe(&mut self, subscription: Subscription) {
        subscription.request(Demand::UNBOUNDED);
    }

    fn on_next(&mut self, item: T) {
        (self.on_next)(item);
    }

    fn on_error(&mut self, error: FluxError) {
        (self.on_error)(error);
    }

    fn on_complete(&mut self) {
        (self.on_complete)();
    }
}

struct BoundedSubscriber<N> {
    batch: u64,
    consumed: u64,
    subscription: Option<Subscription>,
    on_next: N,
}

impl<T, N> Subscriber<T> for BoundedSubscriber<N>
where
    T: Send,
    N: FnMut(T) + Send,
{
    fn on_subscribe(&mut self, subscription: Subscription) {
        subscription.request(self.batch);
        self.subscription = Some(subscription);
    }

    fn on_next(&mut self, item: T) {
        (self.on_next)(item);
        self.consumed += 1;
        if self.consumed == self.batch {
            self.consumed = 0;
            if let Some(subscription) = &self.subscription {
                subscription.request(self.batch);
            }
        }
    }

    fn on_error(&mut self, error: FluxError) {
        log_unhandled(error);
    }

    fn on_complete(&mut self) {}
}
