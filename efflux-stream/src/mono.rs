// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The zero-or-one sequence type.

use efflux_core::{FluxError, Publisher, Result, Subscriber, Subscription};

use crate::from_fn::FnSource;
use crate::flux::Flux;

/// A cold, demand-driven sequence of at most one item.
///
/// A `Mono` is a [`Flux`] with the extra promise that no subscriber will ever
/// see a second `on_next`. Everything else carries over: nothing runs until a
/// subscriber attaches, each subscription is an independent execution, and
/// the single item still waits for demand.
///
/// Operators that could break the promise (repeating, flattening into many)
/// live on [`Flux`]; convert with [`Mono::into_flux`] when a pipeline needs
/// them.
///
/// # Examples
/// ```
/// use efflux_stream::Mono;
/// use efflux_test_utils::TestSubscriber;
///
/// let greeting = Mono::just("hola").map(|s| s.to_uppercase());
///
/// let probe = TestSubscriber::unbounded();
/// greeting.subscribe_with(probe.clone());
///
/// assert_eq!(probe.values(), vec!["HOLA".to_string()]);
/// assert!(probe.is_completed());
/// ```
pub struct Mono<T> {
    inner: Flux<T>,
}

impl<T> Clone for Mono<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Send + 'static> Mono<T> {
    /// Adopts a flux that is known to emit at most one item.
    ///
    /// Callers are responsible for the at-most-one invariant; this is how
    /// aggregating operators such as `collect_list` type their output.
    pub(crate) fn wrap(inner: Flux<T>) -> Self {
        Self { inner }
    }

    /// Sequence of exactly one item.
    pub fn just(item: T) -> Self
    where
        T: Clone + Sync,
    {
        Self::wrap(Flux::just(item))
    }

    /// Sequence that completes without emitting.
    pub fn empty() -> Self {
        Self::wrap(Flux::empty())
    }

    /// Sequence that fails every subscriber with a clone of `error`.
    pub fn error(error: FluxError) -> Self {
        Self::wrap(Flux::error(error))
    }

    /// Adopts a custom publisher that emits at most one item.
    ///
    /// The at-most-one invariant is the caller's to uphold; it is how
    /// external sources such as timers type their single result.
    pub fn from_publisher(publisher: impl Publisher<T> + 'static) -> Self {
        Self::wrap(Flux::from_publisher(publisher))
    }

    /// Sequence producing its item lazily, once per subscriber.
    ///
    /// `producer` runs on the subscriber's first request, so side effects
    /// and failures happen per subscription, not at assembly time.
    ///
    /// # Examples
    /// ```
    /// use efflux_stream::Mono;
    /// use efflux_test_utils::TestSubscriber;
    ///
    /// let stamped = Mono::from_fn(|| Ok(std::process::id()));
    ///
    /// let probe = TestSubscriber::unbounded();
    /// stamped.subscribe_with(probe.clone());
    ///
    /// assert_eq!(probe.values().len(), 1);
    /// ```
    pub fn from_fn<F>(producer: F) -> Self
    where
        F: Fn() -> Result<T> + Send + Sync + 'static,
    {
        Self::wrap(Flux::from_publisher(FnSource::new(producer)))
    }

    /// Transforms the item with `mapper`.
    pub fn map<U, F>(self, mapper: F) -> Mono<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Mono::wrap(self.inner.map(mapper))
    }

    /// Transforms the item with a fallible `mapper`.
    ///
    /// An `Err` terminates the sequence with that error.
    pub fn try_map<U, F>(self, mapper: F) -> Mono<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Result<U> + Send + Sync + 'static,
    {
        Mono::wrap(self.inner.try_map(mapper))
    }

    /// Keeps the item only when `predicate` holds; completes empty otherwise.
    pub fn filter<P>(self, predicate: P) -> Mono<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Mono::wrap(self.inner.filter(predicate))
    }

    /// Maps the item to another `Mono` and flattens the result.
    pub fn flat_map<U, F>(self, mapper: F) -> Mono<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Mono<U> + Send + Sync + 'static,
    {
        Mono::wrap(self.inner.flat_map(move |item| mapper(item).into_flux()))
    }

    /// Maps the item to a [`Flux`] and flattens into a multi-item sequence.
    pub fn flat_map_many<U, F>(self, mapper: F) -> Flux<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Flux<U> + Send + Sync + 'static,
    {
        self.inner.flat_map(mapper)
    }

    /// Combines this item with the item of `other`.
    ///
    /// Empty on either side means an empty result; the other side is
    /// cancelled as soon as that is known.
    ///
    /// # Examples
    /// ```
    /// use efflux_stream::Mono;
    /// use efflux_test_utils::TestSubscriber;
    ///
    /// let pair = Mono::just("ada").zip_with(Mono::just(1815), |name, year| (name, year));
    ///
    /// let probe = TestSubscriber::unbounded();
    /// pair.subscribe_with(probe.clone());
    ///
    /// assert_eq!(probe.values(), vec![("ada", 1815)]);
    /// ```
    pub fn zip_with<B, O, F>(self, other: Mono<B>, combiner: F) -> Mono<O>
    where
        B: Send + 'static,
        O: Send + 'static,
        F: Fn(T, B) -> O + Send + Sync + 'static,
    {
        Mono::wrap(self.inner.zip_with(other, combiner))
    }

    /// Substitutes `alternative` when this sequence completes empty.
    pub fn switch_if_empty(self, alternative: Mono<T>) -> Mono<T> {
        Mono::wrap(self.inner.switch_if_empty(alternative.into_flux()))
    }

    /// Emits `value` when this sequence completes empty.
    pub fn default_if_empty(self, value: T) -> Mono<T>
    where
        T: Clone + Sync,
    {
        Mono::wrap(self.inner.default_if_empty(value))
    }

    /// Fails with the error built by `f` when this sequence completes empty.
    ///
    /// This is how a required-but-missing value becomes a stream-level
    /// error instead of a silent empty completion.
    ///
    /// # Examples
    /// ```
    /// use efflux_core::FluxError;
    /// use efflux_stream::Mono;
    /// use efflux_test_utils::TestSubscriber;
    ///
    /// let missing = Mono::<String>::empty().error_if_empty(|| FluxError::Empty);
    ///
    /// let probe = TestSubscriber::unbounded();
    /// missing.subscribe_with(probe.clone());
    ///
    /// assert!(probe.error().is_some_and(|e| e.is_empty_sequence()));
    /// ```
    pub fn error_if_empty<F>(self, f: F) -> Mono<T>
    where
        F: Fn() -> FluxError + Send + Sync + 'static,
    {
        let raise = Flux::from_publisher(FnSource::new(move || -> Result<T> { Err(f()) }));
        Mono::wrap(self.inner.switch_if_empty(raise))
    }

    /// Switches to the `Mono` built by `fallback` when this one fails.
    pub fn on_error_resume<F>(self, fallback: F) -> Mono<T>
    where
        F: Fn(&FluxError) -> Mono<T> + Send + Sync + 'static,
    {
        Mono::wrap(
            self.inner
                .on_error_resume(move |error| fallback(error).into_flux()),
        )
    }

    /// Replaces an error with `value`.
    pub fn on_error_return(self, value: T) -> Mono<T>
    where
        T: Clone + Sync,
    {
        Mono::wrap(self.inner.on_error_return(value))
    }

    /// Observes the item without consuming it.
    pub fn tap<F>(self, hook: F) -> Mono<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Mono::wrap(self.inner.tap(hook))
    }

    /// Logs every signal passing this point under `name` via `tracing`.
    pub fn log(self, name: impl Into<String>) -> Mono<T>
    where
        T: std::fmt::Debug,
    {
        Mono::wrap(self.inner.log(name))
    }

    /// Widens this sequence back into a [`Flux`].
    pub fn into_flux(self) -> Flux<T> {
        self.inner
    }

    /// Attaches a subscriber and starts a fresh run of the sequence.
    pub fn subscribe_with<S>(&self, subscriber: S) -> Subscription
    where
        S: Subscriber<T> + 'static,
    {
        self.inner.subscribe_with(subscriber)
    }
}

impl<T: Send + 'static> From<Mono<T>> for Flux<T> {
    fn from(mono: Mono<T>) -> Self {
        mono.into_flux()
    }
}

impl<T: Send + 'static> Publisher<T> for Mono<T> {
    fn subscribe(&self, subscriber: Box<dyn Subscriber<T>>) -> Subscription {
        self.inner.subscribe(subscriber)
    }
}
