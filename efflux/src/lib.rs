// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Efflux
//!
//! A demand-driven reactive stream library: composable [`Flux`] and [`Mono`]
//! sequences with explicit backpressure, timer-driven sources and adapters
//! into the async ecosystem.
//!
//! ## Overview
//!
//! Nothing in efflux runs until someone subscribes, and nothing is emitted
//! until that subscriber asks for it. A [`Subscription`] carries the two
//! control signals, `request(n)` and `cancel`, from the consumer back to
//! the producer, so a slow consumer paces the whole pipeline instead of
//! buffering behind it.
//!
//! - [`Flux<T>`]: a sequence of zero or more items.
//! - [`Mono<T>`]: a sequence of at most one item.
//! - [`interval`] / [`delay`]: sequences driven by a timer thread.
//! - [`SubscribeExt`] / [`BlockingExt`] / [`StreamBridgeExt`]: the
//!   consumption boundary (callbacks, blocking drains, `futures::Stream`).
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use efflux::prelude::*;
//!
//! let total = Flux::range(1, 10)
//!     .filter(|n| n % 2 == 0)
//!     .map(|n| n * n)
//!     .collect_list()
//!     .map(|squares| squares.into_iter().sum::<i64>())
//!     .block(Duration::from_secs(1));
//!
//! assert_eq!(total.unwrap(), Some(220));
//! ```

// Re-export the protocol contract
pub use efflux_core::{
    Demand, FluxError, Publisher, Result, Signal, Subscriber, Subscription,
};

// Re-export the sequence types
pub use efflux_stream::{Emitter, Flux, Mono};

// Re-export time-driven sources
pub use efflux_time::{delay, delay_with, interval, interval_with, DelayElementsExt, Scheduler};

// Re-export the consumption boundary
pub use efflux_exec::{BlockingExt, FluxStream, StreamBridgeExt, SubscribeExt};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        delay, interval, BlockingExt, DelayElementsExt, Emitter, Flux, FluxError, Mono, Publisher,
        Subscriber, Subscription, StreamBridgeExt, SubscribeExt,
    };
}
