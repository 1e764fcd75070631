// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Composable sequence types and operators for the efflux engine.
//!
//! The two public values are [`Flux`] (zero or more items) and [`Mono`] (at
//! most one). Both are cold descriptions of a pipeline: combinators stack
//! operator stages, and nothing runs until a subscriber attaches and
//! requests items.
//!
//! ```
//! use efflux_stream::Flux;
//! use efflux_test_utils::TestSubscriber;
//!
//! let evens = Flux::range(1, 6).filter(|n| n % 2 == 0).map(|n| n * 10);
//!
//! let probe = TestSubscriber::unbounded();
//! evens.subscribe_with(probe.clone());
//!
//! assert_eq!(probe.values(), vec![20, 40, 60]);
//! ```
//!
//! Every operator keeps its state per subscription, so a `Flux` can be
//! subscribed (or retried) any number of times without cross-talk. Demand
//! flows upstream stage by stage; stages that drop or buffer items
//! compensate so the subscriber's requests always count delivered items.

mod arbiter;
mod collect;
mod create;
mod fallback;
mod filter;
mod flat_map;
mod flux;
mod from_fn;
mod from_iter;
mod immediate;
mod limit_rate;
mod log;
mod map;
mod mono;
mod resubscribe;
mod take;
mod tap;
mod zip;

pub use create::Emitter;
pub use flux::Flux;
pub use mono::Mono;
