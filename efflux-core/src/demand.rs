// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Outstanding-demand accounting shared between a producer and the
//! subscription handle its subscriber holds.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counter of items requested but not yet delivered.
///
/// Subscribers deposit demand with [`Demand::add`] (via
/// [`Subscription::request`](crate::Subscription::request)) and producers
/// withdraw it one item at a time with [`Demand::try_consume`] before each
/// emission. [`Demand::UNBOUNDED`] acts as a sticky saturation point: once a
/// subscriber asks for everything, further bookkeeping is skipped.
///
/// # Behavior
/// - `add` saturates at [`Demand::UNBOUNDED`] instead of wrapping.
/// - `try_consume` never blocks; it reports whether one unit was available.
/// - Consuming from an unbounded counter leaves it unbounded.
#[derive(Debug, Default)]
pub struct Demand {
    pending: AtomicU64,
}

impl Demand {
    /// Sentinel meaning "the subscriber wants every item you can produce".
    pub const UNBOUNDED: u64 = u64::MAX;

    /// Creates a counter with no outstanding demand.
    pub fn new() -> Self {
        Self {
            pending: AtomicU64::new(0),
        }
    }

    /// Adds `n` units of demand and returns the level before the deposit.
    ///
    /// A return value of `0` tells the caller the producer may have gone
    /// idle and needs a wake-up. Saturates at [`Demand::UNBOUNDED`].
    pub fn add(&self, n: u64) -> u64 {
        let mut current = self.pending.load(Ordering::Acquire);
        loop {
            if current == Self::UNBOUNDED {
                return current;
            }
            let next = current.saturating_add(n);
            match self.pending.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(previous) => return previous,
                Err(actual) => current = actual,
            }
        }
    }

    /// Attempts to withdraw one unit of demand.
    ///
    /// Returns `true` when a unit was available (or the counter is
    /// unbounded) and the producer may emit one item, `false` when the
    /// subscriber has not requested anything.
    pub fn try_consume(&self) -> bool {
        let mut current = self.pending.load(Ordering::Acquire);
        loop {
            if current == Self::UNBOUNDED {
                return true;
            }
            if current == 0 {
                return false;
            }
            match self.pending.compare_exchange_weak(
                current,
                current - 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    /// Current outstanding demand.
    pub fn get(&self) -> u64 {
        self.pending.load(Ordering::Acquire)
    }

    /// Returns `true` once the counter has saturated to unbounded.
    pub fn is_unbounded(&self) -> bool {
        self.get() == Self::UNBOUNDED
    }
}
