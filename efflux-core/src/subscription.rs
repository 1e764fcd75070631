// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The control channel from a subscriber back to its producer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Producer-side implementation behind a [`Subscription`] handle.
///
/// Every source and every demand-owning operator implements this trait once
/// per subscriber. Implementations must tolerate calls from any thread,
/// including re-entrant `request` calls made from inside
/// [`Subscriber::on_next`](crate::Subscriber::on_next).
pub trait SubscriptionLink: Send + Sync {
    /// Registers demand for `n` more items. `n` is never zero.
    fn request(&self, n: u64);

    /// Asks the producer to stop. Must be idempotent and must not fail.
    fn cancel(&self);

    /// Returns `true` once [`SubscriptionLink::cancel`] has taken effect.
    fn is_cancelled(&self) -> bool;
}

/// Handle through which a subscriber paces and stops its stream.
///
/// Handed to the subscriber in
/// [`Subscriber::on_subscribe`](crate::Subscriber::on_subscribe). Cloning is
/// cheap and clones control the same producer, so a handle can be kept for
/// later cancellation while another copy drives demand.
///
/// # Behavior
/// - [`Subscription::request`] ignores `n == 0`.
/// - [`Subscription::cancel`] is idempotent; signals already in flight may
///   still arrive, but nothing new is produced.
/// - After a terminal signal every method becomes a no-op.
///
/// # Examples
/// ```
/// use efflux_core::Subscription;
///
/// let subscription = Subscription::inert();
/// subscription.request(8);
/// subscription.cancel();
/// subscription.cancel(); // idempotent
/// ```
#[derive(Clone)]
pub struct Subscription {
    link: Arc<dyn SubscriptionLink>,
}

impl Subscription {
    /// Wraps a producer-side link into a subscriber-facing handle.
    pub fn new(link: Arc<dyn SubscriptionLink>) -> Self {
        Self { link }
    }

    /// A handle connected to nothing.
    ///
    /// Used by sources that terminate at subscription time and still owe the
    /// subscriber a handle first.
    pub fn inert() -> Self {
        Self {
            link: Arc::new(InertLink),
        }
    }

    /// Requests `n` more items from the producer.
    ///
    /// Requests accumulate; they do not replace earlier ones. A request for
    /// `u64::MAX` switches the stream to unbounded mode.
    ///
    /// # Arguments
    /// * `n` - Number of additional items wanted; `0` is ignored
    pub fn request(&self, n: u64) {
        if n == 0 {
            return;
        }
        self.link.request(n);
    }

    /// Tells the producer to stop emitting and release its resources.
    ///
    /// Safe to call any number of times and safe to call concurrently with
    /// incoming signals.
    pub fn cancel(&self) {
        self.link.cancel();
    }

    /// Returns `true` once this subscription has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.link.is_cancelled()
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

struct InertLink;

impl SubscriptionLink for InertLink {
    fn request(&self, _n: u64) {}

    fn cancel(&self) {}

    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Re-entrancy guard that serializes a producer's drain loop.
///
/// Emitting into `on_next` can synchronously trigger another `request`,
/// which would recurse back into the same drain. The gate collapses those
/// re-entrant calls into extra passes of a single flat loop: the first
/// caller keeps draining until every missed wake-up has been absorbed, and
/// every other caller returns immediately.
#[derive(Debug, Default)]
pub struct DrainGate {
    wip: AtomicU64,
}

impl DrainGate {
    /// Creates an idle gate.
    pub fn new() -> Self {
        Self {
            wip: AtomicU64::new(0),
        }
    }

    /// Runs `work` if no other caller is currently inside the gate.
    ///
    /// `work` is invoked once, then once more for every wake-up that arrived
    /// while it ran. Callers that lose the race return without running
    /// anything; their wake-up is counted and honored by the winner.
    pub fn run(&self, work: impl FnMut()) {
        if self.wip.fetch_add(1, Ordering::AcqRel) != 0 {
            return;
        }
        self.resume(work);
    }

    /// Claims the gate without running anything yet.
    ///
    /// Returns `true` when the caller now owns the gate and must follow up
    /// with [`DrainGate::resume`]. Producers claim the gate before invoking
    /// `on_subscribe` so that a `request` made from inside the callback is
    /// parked as a wake-up instead of starting a nested drain.
    pub fn enter(&self) -> bool {
        self.wip.fetch_add(1, Ordering::AcqRel) == 0
    }

    /// Drains an ownership claim taken with [`DrainGate::enter`].
    ///
    /// Runs `work` once, then once more for every wake-up parked while it
    /// ran. Must only be called after `enter` returned `true`.
    pub fn resume(&self, mut work: impl FnMut()) {
        let mut absorbed = 1;
        loop {
            work();
            let remaining = self.wip.fetch_sub(absorbed, Ordering::AcqRel) - absorbed;
            if remaining == 0 {
                return;
            }
            absorbed = remaining;
        }
    }
}
