// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The multi-valued sequence type.

use std::sync::Arc;

use efflux_core::{FluxError, Publisher, Result, Subscriber, Subscription};

use crate::collect::CollectListOperator;
use crate::create::{CreateSource, Emitter};
use crate::fallback::{OnErrorResume, SwitchIfEmpty};
use crate::filter::FilterOperator;
use crate::flat_map::{FlatMapOperator, DEFAULT_CONCURRENCY, DEFAULT_PREFETCH};
use crate::from_iter::IterSource;
use crate::immediate::{EmptySource, ErrorSource};
use crate::limit_rate::LimitRateOperator;
use crate::log::LogOperator;
use crate::map::{MapOperator, TryMapOperator};
use crate::mono::Mono;
use crate::resubscribe::{Resubscribe, Retrigger};
use crate::take::TakeOperator;
use crate::tap::{TapHooks, TapOperator};
use crate::zip::ZipOperator;

/// A cold, demand-driven sequence of zero or more items.
///
/// A `Flux` describes a pipeline; nothing runs until a subscriber attaches
/// and requests items. Every subscription starts the sequence from the
/// beginning with its own pacing state, and items are never produced faster
/// than the subscriber asked for them.
///
/// Cloning a `Flux` clones the description, not a running stream: both
/// clones subscribe independently.
///
/// # Examples
/// ```
/// use efflux_stream::Flux;
/// use efflux_test_utils::TestSubscriber;
///
/// let names = Flux::from_iter(["ada", "grace", "edsger"])
///     .map(|name: &str| name.to_uppercase())
///     .filter(|name| name.len() > 3);
///
/// let probe = TestSubscriber::unbounded();
/// names.subscribe_with(probe.clone());
///
/// assert_eq!(probe.values(), vec!["GRACE".to_string(), "EDSGER".to_string()]);
/// assert!(probe.is_completed());
/// ```
pub struct Flux<T> {
    source: Arc<dyn Publisher<T>>,
}

impl<T> Clone for Flux<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
        }
    }
}

impl<T: Send + 'static> Flux<T> {
    /// Wraps an existing publisher into a `Flux`.
    ///
    /// The publisher must honor the demand contract: `on_subscribe` before
    /// anything else (and before `subscribe` returns), items only against
    /// requested demand, at most one terminal signal.
    pub fn from_publisher(publisher: impl Publisher<T> + 'static) -> Self {
        Self {
            source: Arc::new(publisher),
        }
    }

    /// Sequence that emits every element of a collection, in order.
    ///
    /// The collection is cloned for each subscriber, which is what makes the
    /// sequence cold and safely re-subscribable (`retry`, `repeat`, multiple
    /// independent consumers).
    ///
    /// # Examples
    /// ```
    /// use efflux_stream::Flux;
    /// use efflux_test_utils::TestSubscriber;
    ///
    /// let probe = TestSubscriber::unbounded();
    /// Flux::from_iter(vec![1, 2, 3]).subscribe_with(probe.clone());
    ///
    /// assert_eq!(probe.values(), vec![1, 2, 3]);
    /// ```
    pub fn from_iter<C>(items: C) -> Self
    where
        C: IntoIterator<Item = T> + Clone + Send + Sync + 'static,
        C::IntoIter: Send,
    {
        Self::from_publisher(IterSource::new(items))
    }

    /// Sequence of exactly one item.
    pub fn just(item: T) -> Self
    where
        T: Clone + Sync,
    {
        Self::from_publisher(IterSource::new(Some(item)))
    }

    /// Sequence that completes without emitting.
    ///
    /// Completion is signalled on the subscriber's first request, never
    /// inside `subscribe` itself.
    pub fn empty() -> Self {
        Self::from_publisher(EmptySource)
    }

    /// Sequence that fails every subscriber with a clone of `error`.
    pub fn error(error: FluxError) -> Self {
        Self::from_publisher(ErrorSource::new(error))
    }

    /// Sequence driven programmatically through an [`Emitter`].
    ///
    /// `producer` runs once per subscriber, after the subscriber has
    /// received its subscription. The emitter may be moved to another
    /// thread or captured by a timer; items pushed ahead of demand are
    /// buffered and the first terminal signal wins.
    ///
    /// # Examples
    /// ```
    /// use efflux_stream::Flux;
    /// use efflux_test_utils::TestSubscriber;
    ///
    /// let ticks = Flux::create(|emitter| {
    ///     for n in 0..3 {
    ///         emitter.next(n);
    ///     }
    ///     emitter.complete();
    /// });
    ///
    /// let probe = TestSubscriber::unbounded();
    /// ticks.subscribe_with(probe.clone());
    ///
    /// assert_eq!(probe.values(), vec![0, 1, 2]);
    /// assert!(probe.is_completed());
    /// ```
    pub fn create<F>(producer: F) -> Self
    where
        F: Fn(Emitter<T>) + Send + Sync + 'static,
    {
        Self::from_publisher(CreateSource::new(producer))
    }

    /// Transforms every item with `mapper`.
    ///
    /// One item in, one item out: demand flows through unchanged.
    ///
    /// # Arguments
    /// * `mapper` - Infallible transformation applied to each item
    ///
    /// # See Also
    /// * [`Flux::try_map`] for transformations that can reject an item
    pub fn map<U, F>(self, mapper: F) -> Flux<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Flux::from_publisher(MapOperator::new(self, mapper))
    }

    /// Transforms every item with a fallible `mapper`.
    ///
    /// The first `Err` cancels the upstream and terminates the sequence
    /// with that error; items mapped before the failure stay delivered.
    ///
    /// # Examples
    /// ```
    /// use efflux_core::FluxError;
    /// use efflux_stream::Flux;
    /// use efflux_test_utils::TestSubscriber;
    ///
    /// let parsed = Flux::from_iter(["2", "7", "x", "9"])
    ///     .try_map(|raw: &str| {
    ///         raw.parse::<i32>()
    ///             .map_err(|_| FluxError::processing(format!("not a number: {raw}")))
    ///     });
    ///
    /// let probe = TestSubscriber::unbounded();
    /// parsed.subscribe_with(probe.clone());
    ///
    /// assert_eq!(probe.values(), vec![2, 7]);
    /// assert!(probe.error().is_some());
    /// ```
    pub fn try_map<U, F>(self, mapper: F) -> Flux<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Result<U> + Send + Sync + 'static,
    {
        Flux::from_publisher(TryMapOperator::new(self, mapper))
    }

    /// Keeps only the items matching `predicate`.
    ///
    /// Every dropped item is re-requested from the upstream, so downstream
    /// demand is spent exclusively on items that were actually delivered.
    pub fn filter<P>(self, predicate: P) -> Flux<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Flux::from_publisher(FilterOperator::new(self, predicate))
    }

    /// Passes through at most `limit` items, then completes.
    ///
    /// The upstream is cancelled the moment the limit is reached.
    pub fn take(self, limit: u64) -> Flux<T> {
        if limit == 0 {
            return Flux::empty();
        }
        Flux::from_publisher(TakeOperator::new(self, limit))
    }

    /// Maps each item to an inner sequence and merges the inner items.
    ///
    /// Up to 32 inner sequences run at once and each is prefetched 32 items
    /// at a time; use [`Flux::flat_map_with`] to tune both numbers.
    ///
    /// # Examples
    /// ```
    /// use efflux_stream::Flux;
    /// use efflux_test_utils::TestSubscriber;
    ///
    /// let letters = Flux::from_iter(vec!["ab", "cd"])
    ///     .flat_map(|pair: &str| Flux::from_iter(pair.chars().collect::<Vec<_>>()));
    ///
    /// let probe = TestSubscriber::unbounded();
    /// letters.subscribe_with(probe.clone());
    ///
    /// let mut seen = probe.values();
    /// seen.sort_unstable();
    /// assert_eq!(seen, vec!['a', 'b', 'c', 'd']);
    /// ```
    pub fn flat_map<U, F>(self, mapper: F) -> Flux<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Flux<U> + Send + Sync + 'static,
    {
        self.flat_map_with(mapper, DEFAULT_CONCURRENCY, DEFAULT_PREFETCH)
    }

    /// [`Flux::flat_map`] with explicit bounds.
    ///
    /// # Arguments
    /// * `mapper` - Builds the inner sequence for each item
    /// * `concurrency` - How many inner sequences may be active at once
    /// * `prefetch` - Items requested up front from each inner sequence
    ///
    /// Both bounds are clamped to at least 1. Memory usage stays within
    /// `concurrency * prefetch` buffered items.
    pub fn flat_map_with<U, F>(self, mapper: F, concurrency: u64, prefetch: u64) -> Flux<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Flux<U> + Send + Sync + 'static,
    {
        Flux::from_publisher(FlatMapOperator::new(self, mapper, concurrency, prefetch))
    }

    /// Pairs this sequence with another, item by item.
    ///
    /// The n-th output is `combiner(left_n, right_n)`. Demand is forwarded
    /// to both sides in lockstep, and the output completes as soon as the
    /// shorter side is exhausted; the longer side is then cancelled.
    ///
    /// # Examples
    /// ```
    /// use efflux_stream::Flux;
    /// use efflux_test_utils::TestSubscriber;
    ///
    /// let indexed = Flux::from_iter(vec!["a", "b", "c"])
    ///     .zip_with(Flux::range(1, 100), |name, index| format!("{index}:{name}"));
    ///
    /// let probe = TestSubscriber::unbounded();
    /// indexed.subscribe_with(probe.clone());
    ///
    /// assert_eq!(probe.values(), vec!["1:a", "2:b", "3:c"]);
    /// assert!(probe.is_completed());
    /// ```
    pub fn zip_with<B, O, F>(self, other: impl Into<Flux<B>>, combiner: F) -> Flux<O>
    where
        B: Send + 'static,
        O: Send + 'static,
        F: Fn(T, B) -> O + Send + Sync + 'static,
    {
        Flux::from_publisher(ZipOperator::new(self, other.into(), combiner))
    }

    /// Gathers every item into one `Vec`, emitted on completion.
    ///
    /// The upstream is drained with unbounded demand. An upstream error
    /// discards the partial buffer and fails the resulting [`Mono`].
    pub fn collect_list(self) -> Mono<Vec<T>> {
        Mono::wrap(Flux::from_publisher(CollectListOperator::new(self)))
    }

    /// Expects exactly one item.
    ///
    /// Fails with [`FluxError::Empty`] when the sequence completes without
    /// items and with a processing error when it holds more than one.
    pub fn single(self) -> Mono<T> {
        self.collect_list().try_map(|mut items| {
            if items.len() > 1 {
                return Err(FluxError::processing(format!(
                    "expected exactly one item, found {}",
                    items.len()
                )));
            }
            items.pop().ok_or(FluxError::Empty)
        })
    }

    /// Shields the upstream from large requests by pulling fixed batches.
    ///
    /// The upstream sees an initial request of `prefetch` and steady
    /// replenishment as items are consumed, regardless of what the
    /// downstream asks for.
    pub fn limit_rate(self, prefetch: u64) -> Flux<T> {
        Flux::from_publisher(LimitRateOperator::new(self, prefetch))
    }

    /// Resubscribes to the sequence after an error, up to `attempts` times.
    ///
    /// `retry(2)` therefore runs at most three attempts in total. Demand
    /// carries across attempts: items already delivered are subtracted and
    /// the replacement upstream is asked only for the remainder. The error
    /// of the final attempt is the one delivered downstream.
    ///
    /// # Examples
    /// ```
    /// use std::sync::atomic::{AtomicU32, Ordering};
    /// use std::sync::Arc;
    /// use efflux_core::FluxError;
    /// use efflux_stream::Flux;
    /// use efflux_test_utils::TestSubscriber;
    ///
    /// let attempts = Arc::new(AtomicU32::new(0));
    /// let counter = attempts.clone();
    /// let flaky = Flux::<u32>::create(move |emitter| {
    ///     counter.fetch_add(1, Ordering::SeqCst);
    ///     emitter.error(FluxError::source("connection reset"));
    /// });
    ///
    /// let probe = TestSubscriber::unbounded();
    /// flaky.retry(2).subscribe_with(probe.clone());
    ///
    /// assert_eq!(attempts.load(Ordering::SeqCst), 3);
    /// assert!(probe.error().is_some());
    /// ```
    pub fn retry(self, attempts: u64) -> Flux<T> {
        Flux::from_publisher(Resubscribe::new(self, Retrigger::Error, attempts))
    }

    /// Replays the sequence after it completes, `times` extra rounds.
    pub fn repeat(self, times: u64) -> Flux<T> {
        Flux::from_publisher(Resubscribe::new(self, Retrigger::Complete, times))
    }

    /// Switches to the sequence built by `fallback` when this one fails.
    ///
    /// The factory receives the error, so the replacement can depend on
    /// what went wrong. Errors raised by the fallback itself propagate.
    pub fn on_error_resume<F>(self, fallback: F) -> Flux<T>
    where
        F: Fn(&FluxError) -> Flux<T> + Send + Sync + 'static,
    {
        Flux::from_publisher(OnErrorResume::new(self, fallback))
    }

    /// Replaces an error with one final item, then completes.
    pub fn on_error_return(self, value: T) -> Flux<T>
    where
        T: Clone + Sync,
    {
        self.on_error_resume(move |_| Flux::just(value.clone()))
    }

    /// Substitutes `alternative` when this sequence completes empty.
    pub fn switch_if_empty(self, alternative: Flux<T>) -> Flux<T> {
        Flux::from_publisher(SwitchIfEmpty::new(self, alternative))
    }

    /// Emits `value` when this sequence completes empty.
    pub fn default_if_empty(self, value: T) -> Flux<T>
    where
        T: Clone + Sync,
    {
        self.switch_if_empty(Flux::just(value))
    }

    /// Observes each item without consuming it.
    ///
    /// The hook runs before the item is forwarded downstream.
    pub fn tap<F>(self, hook: F) -> Flux<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let mut hooks = TapHooks::none();
        hooks.on_next = Some(Arc::new(hook));
        Flux::from_publisher(TapOperator::new(self, hooks))
    }

    /// Observes the error terminating the sequence, if any.
    pub fn tap_error<F>(self, hook: F) -> Flux<T>
    where
        F: Fn(&FluxError) + Send + Sync + 'static,
    {
        let mut hooks = TapHooks::none();
        hooks.on_error = Some(Arc::new(hook));
        Flux::from_publisher(TapOperator::new(self, hooks))
    }

    /// Observes normal completion.
    pub fn tap_complete<F>(self, hook: F) -> Flux<T>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut hooks = TapHooks::none();
        hooks.on_complete = Some(Arc::new(hook));
        Flux::from_publisher(TapOperator::new(self, hooks))
    }

    /// Observes termination of either kind, error or completion.
    pub fn tap_terminate<F>(self, hook: F) -> Flux<T>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let hook = Arc::new(hook);
        let mut hooks = TapHooks::none();
        let on_error = hook.clone();
        hooks.on_error = Some(Arc::new(move |_| on_error()));
        hooks.on_complete = Some(hook);
        Flux::from_publisher(TapOperator::new(self, hooks))
    }

    /// Logs every signal passing this point under `name` via `tracing`.
    pub fn log(self, name: impl Into<String>) -> Flux<T>
    where
        T: std::fmt::Debug,
    {
        Flux::from_publisher(LogOperator::new(self, name))
    }

    /// Attaches a subscriber and starts a fresh run of the sequence.
    ///
    /// The returned [`Subscription`] is the same handle the subscriber
    /// receives in `on_subscribe`.
    pub fn subscribe_with<S>(&self, subscriber: S) -> Subscription
    where
        S: Subscriber<T> + 'static,
    {
        self.source.subscribe(Box::new(subscriber))
    }
}

impl Flux<i64> {
    /// Sequence counting `count` integers up from `start`.
    ///
    /// # Examples
    /// ```
    /// use efflux_stream::Flux;
    /// use efflux_test_utils::TestSubscriber;
    ///
    /// let probe = TestSubscriber::unbounded();
    /// Flux::range(1, 4).subscribe_with(probe.clone());
    ///
    /// assert_eq!(probe.values(), vec![1, 2, 3, 4]);
    /// ```
    pub fn range(start: i64, count: u32) -> Flux<i64> {
        let end = start.saturating_add(i64::from(count));
        Flux::from_iter(start..end)
    }
}

impl<T: Send + 'static> Publisher<T> for Flux<T> {
    fn subscribe(&self, subscriber: Box<dyn Subscriber<T>>) -> Subscription {
        self.source.subscribe(subscriber)
    }
}
