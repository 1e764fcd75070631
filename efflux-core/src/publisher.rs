// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The producer side of the stream contract.

use crate::subscriber::Subscriber;
use crate::subscription::Subscription;

/// Source of a stream of `T` items.
///
/// Publishers are cold: each [`Publisher::subscribe`] call starts an
/// independent run of the sequence with its own pacing state, so two
/// subscribers to the same publisher never share demand or position.
///
/// Implementations must hand the subscriber its [`Subscription`] through
/// [`Subscriber::on_subscribe`] before any other signal, must never emit
/// more items than were requested, and must deliver at most one terminal
/// signal.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use efflux_core::{Publisher, Subscriber, Subscription};
///
/// /// A source that finishes without producing anything.
/// struct Silence;
///
/// impl Publisher<String> for Silence {
///     fn subscribe(&self, mut subscriber: Box<dyn Subscriber<String>>) -> Subscription {
///         let subscription = Subscription::inert();
///         subscriber.on_subscribe(subscription.clone());
///         subscriber.on_complete();
///         subscription
///     }
/// }
///
/// let publisher: Arc<dyn Publisher<String>> = Arc::new(Silence);
/// # let _ = publisher;
/// ```
pub trait Publisher<T>: Send + Sync {
    /// Attaches `subscriber` to a fresh run of this sequence.
    ///
    /// The returned [`Subscription`] is the same handle the subscriber
    /// receives in [`Subscriber::on_subscribe`]; callers that only want to
    /// cancel from outside can keep it and ignore the callback copy.
    fn subscribe(&self, subscriber: Box<dyn Subscriber<T>>) -> Subscription;
}
