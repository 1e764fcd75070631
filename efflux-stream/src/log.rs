// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Signal logging through `tracing`.

use std::sync::Arc;

use efflux_core::{FluxError, Publisher, Subscriber, Subscription, SubscriptionLink};

use crate::flux::Flux;

/// Logs every protocol event seen at this point of the pipeline under a
/// stream name, then forwards it unchanged. Both directions are covered:
/// downstream signals and the `request`/`cancel` calls travelling back up.
/// Lifecycle events log at `info`, items at `debug`, failures at `error`.
pub(crate) struct LogOperator<T> {
    source: Flux<T>,
    name: Arc<str>,
}

impl<T> LogOperator<T> {
    pub(crate) fn new(source: Flux<T>, name: impl Into<String>) -> Self {
        Self {
            source,
            name: name.into().into(),
        }
    }
}

impl<T> Publisher<T> for LogOperator<T>
where
    T: std::fmt::Debug + Send + 'static,
{
    fn subscribe(&self, subscriber: Box<dyn Subscriber<T>>) -> Subscription {
        self.source.subscribe_with(LogSubscriber {
            downstream: subscriber,
            name: self.name.clone(),
        })
    }
}

struct LogSubscriber<T> {
    downstream: Box<dyn Subscriber<T>>,
    name: Arc<str>,
}

impl<T> Subscriber<T> for LogSubscriber<T>
where
    T: std::fmt::Debug + Send,
{
    fn on_subscribe(&mut self, subscription: Subscription) {
        tracing::info!(stream = %self.name, "on_subscribe");
        // The handle is wrapped so demand flowing back up is logged too.
        self.downstream.on_subscribe(Subscription::new(Arc::new(LogLink {
            upstream: subscription,
            name: self.name.clone(),
        })));
    }

    fn on_next(&mut self, item: T) {
        tracing::debug!(stream = %self.name, item = ?item, "on_next");
        self.downstream.on_next(item);
    }

    fn on_error(&mut self, error: FluxError) {
        tracing::error!(stream = %self.name, %error, "on_error");
        self.downstream.on_error(error);
    }

    fn on_complete(&mut self) {
        tracing::info!(stream = %self.name, "on_complete");
        self.downstream.on_complete();
    }
}

struct LogLink {
    upstream: Subscription,
    name: Arc<str>,
}

impl SubscriptionLink for LogLink {
    fn request(&self, n: u64) {
        tracing::info!(stream = %self.name, n, "request");
        self.upstream.request(n);
    }

    fn cancel(&self) {
        tracing::info!(stream = %self.name, "cancel");
        self.upstream.cancel();
    }

    fn is_cancelled(&self) -> bool {
        self.upstream.is_cancelled()
    }
}
