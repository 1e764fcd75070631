// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Time-driven sources and operators for the efflux engine.
//!
//! A [`Scheduler`] is a dedicated timer thread; [`interval`] turns its ticks
//! into a `Flux<u64>`, [`delay`] into a one-shot `Mono<u64>`, and
//! [`DelayElementsExt::delay_elements`] paces an existing sequence. All of
//! them tie their timer tasks to the subscription: cancellation or a
//! terminal signal cancels the underlying task, never leaving a recurring
//! timer behind.
//!
//! ```
//! use std::time::Duration;
//! use efflux_time::interval;
//! use efflux_test_utils::TestSubscriber;
//!
//! let probe = TestSubscriber::unbounded();
//! interval(Duration::from_millis(10)).subscribe_with(probe.clone());
//!
//! assert!(probe.await_count(3, Duration::from_secs(5)));
//! probe.cancel();
//! assert_eq!(&probe.values()[..3], &[0, 1, 2]);
//! ```

mod delay;
mod interval;
mod scheduler;

pub use delay::{delay, delay_with, DelayElementsExt};
pub use interval::{interval, interval_with};
pub use scheduler::{Scheduler, TaskHandle};
