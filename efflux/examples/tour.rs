// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A first walk through the operator surface: build a pipeline, subscribe,
//! and let demand pull the items through.
//!
//! Run with: `cargo run --example tour`

use std::time::Duration;

use anyhow::Result;
use efflux::prelude::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let names = Flux::from_iter(["ada", "grace", "edsger", "barbara", "tony"]);

    // Nothing has run yet; the pipeline below is only a description.
    let numbered = names
        .map(|name| name.to_uppercase())
        .filter(|name| name.len() > 3)
        .zip_with(Flux::range(1, 10), |name, position| {
            format!("{position}. {name}")
        });

    // Subscribing is what sets it in motion.
    SubscribeExt::subscribe(&numbered, |line| println!("{line}"));

    // The same pipeline can be drained into a list instead.
    let lengths = Flux::from_iter(["ada", "grace", "edsger"])
        .map(|name| name.len())
        .collect_list()
        .block(Duration::from_secs(1))?;
    println!("name lengths: {lengths:?}");

    // A Mono carries at most one item through the same operators.
    let greeting = Mono::just("hello")
        .map(|s| format!("{s}, efflux"))
        .block(Duration::from_secs(1))?;
    println!("{}", greeting.unwrap_or_default());

    Ok(())
}
