// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Pacing a finite sequence against the timer: zip a name list with an
//! interval so one name arrives per tick.
//!
//! Run with: `cargo run --example ticker`

use std::time::Duration;

use anyhow::Result;
use efflux::prelude::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let names = Flux::from_iter(["mercury", "venus", "earth", "mars"]);

    // zip pulls one item from each side per pair, so the interval paces
    // the names: nothing is printed faster than one per 300ms.
    let paced = interval(Duration::from_millis(300))
        .zip_with(names, |tick, name| format!("t+{tick}: {name}"));

    let last = paced
        .tap(|line| println!("{line}"))
        .block_last(Duration::from_secs(5))?;

    println!("done, last line: {last:?}");
    Ok(())
}
