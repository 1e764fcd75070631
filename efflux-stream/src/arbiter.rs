// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Demand-carrying subscription that survives upstream swaps.

use efflux_core::{Demand, Status, StreamState, Subscription, SubscriptionLink};
use parking_lot::Mutex;

/// The single subscription handed downstream by operators that subscribe to
/// a source more than once (retry, repeat, fallback switching).
///
/// Tracks how much of the downstream's demand the finished upstreams already
/// produced; when a replacement upstream arrives it is asked for exactly the
/// remainder, so the downstream never sees more items than it requested.
pub(crate) struct SubscriptionArbiter {
    inner: Mutex<ArbiterInner>,
    status: Status,
}

struct ArbiterInner {
    current: Option<Subscription>,
    outstanding: u64,
}

impl SubscriptionArbiter {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(ArbiterInner {
                current: None,
                outstanding: 0,
            }),
            status: Status::new(),
        }
    }

    /// Installs the next upstream and forwards the unspent demand to it.
    pub(crate) fn set_upstream(&self, subscription: Subscription) {
        if self.status.is_cancelled() {
            subscription.cancel();
            return;
        }
        let due = {
            let mut inner = self.inner.lock();
            inner.current = Some(subscription.clone());
            inner.outstanding
        };
        if self.status.is_cancelled() {
            // Lost a race with cancel; make sure the new upstream stops too.
            if let Some(current) = self.inner.lock().current.take() {
                current.cancel();
            }
            return;
        }
        if due > 0 {
            subscription.request(due);
        }
    }

    /// Records items delivered downstream, shrinking the unspent demand.
    pub(crate) fn note_produced(&self, count: u64) {
        let mut inner = self.inner.lock();
        if inner.outstanding != Demand::UNBOUNDED {
            inner.outstanding = inner.outstanding.saturating_sub(count);
        }
    }
}

impl SubscriptionLink for SubscriptionArbiter {
    fn request(&self, n: u64) {
        let target = {
            let mut inner = self.inner.lock();
            inner.outstanding = inner.outstanding.saturating_add(n);
            inner.current.clone()
        };
        if let Some(upstream) = target {
            upstream.request(n);
        }
    }

    fn cancel(&self) {
        if self.status.finish(StreamState::Cancelled) {
            let current = self.inner.lock().current.take();
            if let Some(current) = current {
                current.cancel();
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.status.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingLink {
        requested: AtomicU64,
        cancelled: AtomicBool,
    }

    impl SubscriptionLink for CountingLink {
        fn request(&self, n: u64) {
            self.requested.fetch_add(n, Ordering::AcqRel);
        }

        fn cancel(&self) {
            self.cancelled.store(true, Ordering::Release);
        }

        fn is_cancelled(&self) -> bool {
            self.cancelled.load(Ordering::Acquire)
        }
    }

    #[test]
    fn replacement_upstream_receives_only_unspent_demand() {
        let arbiter = SubscriptionArbiter::new();
        let first = Arc::new(CountingLink::default());
        let second = Arc::new(CountingLink::default());

        arbiter.set_upstream(Subscription::new(first.clone()));
        arbiter.request(5);
        arbiter.note_produced(2);
        arbiter.set_upstream(Subscription::new(second.clone()));

        assert_eq!(first.requested.load(Ordering::Acquire), 5);
        assert_eq!(second.requested.load(Ordering::Acquire), 3);
    }

    #[test]
    fn demand_placed_between_upstreams_is_forwarded_on_install() {
        let arbiter = SubscriptionArbiter::new();
        arbiter.request(4);

        let upstream = Arc::new(CountingLink::default());
        arbiter.set_upstream(Subscription::new(upstream.clone()));

        assert_eq!(upstream.requested.load(Ordering::Acquire), 4);
    }

    #[test]
    fn cancel_reaches_the_current_upstream() {
        let arbiter = SubscriptionArbiter::new();
        let upstream = Arc::new(CountingLink::default());
        arbiter.set_upstream(Subscription::new(upstream.clone()));

        arbiter.cancel();

        assert!(upstream.cancelled.load(Ordering::Acquire));
        assert!(arbiter.is_cancelled());
    }

    #[test]
    fn upstreams_installed_after_cancel_are_cancelled_immediately() {
        let arbiter = SubscriptionArbiter::new();
        arbiter.cancel();

        let late = Arc::new(CountingLink::default());
        arbiter.set_upstream(Subscription::new(late.clone()));

        assert!(late.cancelled.load(Ordering::Acquire));
    }

    #[test]
    fn unbounded_demand_stays_unbounded_across_production() {
        let arbiter = SubscriptionArbiter::new();
        arbiter.request(u64::MAX);
        arbiter.note_produced(10);

        let upstream = Arc::new(CountingLink::default());
        arbiter.set_upstream(Subscription::new(upstream.clone()));

        assert_eq!(upstream.requested.load(Ordering::Acquire), u64::MAX);
    }
}
