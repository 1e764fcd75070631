// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Consumer-paced flow control: the subscriber decides the batch size and
//! the producer never runs ahead of it.
//!
//! The `log` stage prints every protocol event, so the output shows the
//! `request(5)` batches interleaved with the items they pull through.
//!
//! Run with: `cargo run --example backpressure`

use efflux::prelude::*;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();

    let inventory = Flux::range(1, 20)
        .map(|id| format!("item-{id:03}"))
        .log("inventory");

    // Five items per request: the producer pauses after each batch until
    // the subscriber has consumed it.
    inventory.subscribe_bounded(5, |item| {
        println!("shelved {item}");
    });
}
