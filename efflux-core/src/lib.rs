// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Core contract for the efflux reactive-stream engine.
//!
//! This crate defines the protocol every other efflux crate builds on:
//!
//! - [`Publisher`] produces items for exactly one [`Subscriber`] per
//!   subscription and never outruns the demand that subscriber signalled.
//! - [`Subscriber`] consumes signals in the fixed order `on_subscribe`,
//!   zero or more `on_next`, then at most one of `on_error` / `on_complete`.
//! - [`Subscription`] is the subscriber's control channel: `request(n)`
//!   deposits demand, `cancel()` stops the stream.
//!
//! The remaining types are the shared mechanics producers use to honor that
//! contract: [`Demand`] accounts for outstanding requests, [`Status`] makes
//! terminal signals mutually exclusive, [`DrainGate`] serializes emission
//! loops against re-entrant requests, and [`Signal`] reifies events for
//! probes and queues. Errors travel as [`FluxError`].

mod demand;
mod error;
mod publisher;
mod signal;
mod status;
mod subscriber;
mod subscription;

pub use demand::Demand;
pub use error::{FluxError, Result};
pub use publisher::Publisher;
pub use signal::Signal;
pub use status::{Status, StreamState};
pub use subscriber::Subscriber;
pub use subscription::{DrainGate, Subscription, SubscriptionLink};
