// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Consumption adapters for efflux streams.
//!
//! Everything in [`efflux_stream`] is lazy; this crate is where sequences
//! actually run. [`SubscribeExt`] attaches closures, [`BlockingExt`] drains
//! a sequence on the calling thread with a mandatory timeout, and
//! [`StreamBridgeExt`] hands a sequence to async code as a
//! [`futures::Stream`].
//!
//! ```
//! use std::time::Duration;
//! use efflux_exec::BlockingExt;
//! use efflux_stream::Flux;
//!
//! let last = Flux::range(1, 5)
//!     .map(|n| n * n)
//!     .block_last(Duration::from_secs(1));
//!
//! assert_eq!(last.unwrap(), Some(25));
//! ```

mod block;
mod stream_bridge;
mod subscribe;

pub use block::BlockingExt;
pub use stream_bridge::{FluxStream, StreamBridgeExt};
pub use subscribe::SubscribeExt;
