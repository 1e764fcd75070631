// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The consumer side of the stream contract.

use crate::error::FluxError;
use crate::subscription::Subscription;

/// Receiver of a stream's signals.
///
/// A subscriber sees exactly one [`Subscriber::on_subscribe`], then any
/// number of [`Subscriber::on_next`] calls, then at most one terminal call,
/// either [`Subscriber::on_error`] or [`Subscriber::on_complete`]. Signals
/// are serialized: implementations never see two callbacks at once.
///
/// Items only flow after the subscriber spends demand through the
/// [`Subscription`] it was handed. A subscriber that never calls
/// [`Subscription::request`] receives no items.
///
/// # Examples
/// ```
/// use efflux_core::{FluxError, Subscriber, Subscription};
///
/// /// Consumes items in batches of two, requesting the next batch only
/// /// once the current one has been processed.
/// struct Batched {
///     subscription: Option<Subscription>,
///     in_flight: u64,
/// }
///
/// impl Subscriber<u32> for Batched {
///     fn on_subscribe(&mut self, subscription: Subscription) {
///         subscription.request(2);
///         self.in_flight = 2;
///         self.subscription = Some(subscription);
///     }
///
///     fn on_next(&mut self, item: u32) {
///         println!("got {item}");
///         self.in_flight -= 1;
///         if self.in_flight == 0 {
///             if let Some(subscription) = &self.subscription {
///                 subscription.request(2);
///             }
///             self.in_flight = 2;
///         }
///     }
///
///     fn on_error(&mut self, error: FluxError) {
///         eprintln!("failed: {error}");
///     }
///
///     fn on_complete(&mut self) {
///         println!("done");
///     }
/// }
/// ```
pub trait Subscriber<T>: Send {
    /// Called exactly once, before any other signal, with the handle that
    /// paces this stream.
    fn on_subscribe(&mut self, subscription: Subscription);

    /// Called once per item, never exceeding the demand requested so far.
    fn on_next(&mut self, item: T);

    /// Called at most once when the stream fails. Terminal.
    fn on_error(&mut self, error: FluxError);

    /// Called at most once when the stream finishes normally. Terminal.
    fn on_complete(&mut self);
}

impl<T, S> Subscriber<T> for Box<S>
where
    S: Subscriber<T> + ?Sized,
{
    fn on_subscribe(&mut self, subscription: Subscription) {
        (**self).on_subscribe(subscription)
    }

    fn on_next(&mut self, item: T) {
        (**self).on_next(item)
    }

    fn on_error(&mut self, error: FluxError) {
        (**self).on_error(error)
    }

    fn on_complete(&mut self) {
        (**self).on_complete()
    }
}
