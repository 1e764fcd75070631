// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Side-effect hooks observing a stream without altering it.

use std::sync::Arc;

use efflux_core::{FluxError, Publisher, Subscriber, Subscription};

use crate::flux::Flux;

pub(crate) type NextHook<T> = Arc<dyn Fn(&T) + Send + Sync>;
pub(crate) type ErrorHook = Arc<dyn Fn(&FluxError) + Send + Sync>;
pub(crate) type CompleteHook = Arc<dyn Fn() + Send + Sync>;

/// Hook set attached by the `tap` family. Unset hooks cost nothing.
pub(crate) struct TapHooks<T> {
    pub(crate) on_next: Option<NextHook<T>>,
    pub(crate) on_error: Option<ErrorHook>,
    pub(crate) on_complete: Option<CompleteHook>,
}

impl<T> TapHooks<T> {
    pub(crate) fn none() -> Self {
        Self {
            on_next: None,
            on_error: None,
            on_complete: None,
        }
    }
}

impl<T> Clone for TapHooks<T> {
    fn clone(&self) -> Self {
        Self {
            on_next: self.on_next.clone(),
            on_error: self.on_error.clone(),
            on_complete: self.on_complete.clone(),
        }
    }
}

/// Runs the hooks before forwarding each signal unchanged.
pub(crate) struct TapOperator<T> {
    source: Flux<T>,
    hooks: TapHooks<T>,
}

impl<T> TapOperator<T> {
    pub(crate) fn new(source: Flux<T>, hooks: TapHooks<T>) -> Self {
        Self { source, hooks }
    }
}

impl<T: Send + 'static> Publisher<T> for TapOperator<T> {
    fn subscribe(&self, subscriber: Box<dyn Subscriber<T>>) -> Subscription {
        self.source.subscribe_with(TapSubscriber {
            downstream: subscriber,
            hooks: self.hooks.clone(),
        })
    }
}

struct TapSubscriber<T> {
    downstream: Box<dyn Subscriber<T>>,
    hooks: TapHooks<T>,
}

impl<T: Send + 'static> Subscriber<T> for TapSubscriber<T> {
    fn on_subscribe(&mut self, subscription: Subscription) {
        self.downstream.on_subscribe(subscription);
    }

    fn on_next(&mut self, item: T) {
        if let Some(hook) = &self.hooks.on_next {
            hook(&item);
        }
        self.downstream.on_next(item);
    }

    fn on_error(&mut self, error: FluxError) {
        if let Some(hook) = &self.hooks.on_error {
            hook(&error);
        }
        self.downstream.on_error(error);
    }

    fn on_complete(&mut self) {
        if let Some(hook) = &self.hooks.on_complete {
            hook();
        }
        self.downstream.on_complete();
    }
}
