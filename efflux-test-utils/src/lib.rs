// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test tooling shared by the efflux crates.
//!
//! [`TestSubscriber`] is a recording probe that plugs into any publisher and
//! exposes what it saw; [`test_data`] holds the small user/comment domain
//! the tests and examples share.

mod probe;
pub mod test_data;

pub use probe::TestSubscriber;
