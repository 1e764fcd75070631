// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Bridging a callback world into a stream with `Flux::create`: a producer
//! thread pushes readings through an `Emitter`, and the subscriber receives
//! them as ordinary stream signals.
//!
//! Run with: `cargo run --example emitter`

use std::time::Duration;

use efflux::prelude::*;

#[derive(Debug, Clone)]
struct Reading {
    sensor: &'static str,
    value: f64,
}

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let readings = Flux::create(|emitter: Emitter<Reading>| {
        std::thread::spawn(move || {
            for n in 0..8 {
                if emitter.is_cancelled() {
                    return;
                }
                emitter.next(Reading {
                    sensor: "boiler-2",
                    value: 60.0 + f64::from(n) * 1.5,
                });
                std::thread::sleep(Duration::from_millis(100));
            }
            emitter.complete();
        });
    });

    let (finished, done) = std::sync::mpsc::channel();
    readings.subscribe_callbacks(
        |reading| println!("{}: {:.1} C", reading.sensor, reading.value),
        |error| eprintln!("sensor feed failed: {error}"),
        move || {
            let _ = finished.send(());
        },
    );

    // The signals arrive on the producer thread; wait for its end.
    let _ = done.recv_timeout(Duration::from_secs(5));
}
