// Copyright 2026 Tomás Arrieta <tomas.arrieta@efflux-rs.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A service-layer sketch: an in-memory product catalog whose every
//! operation returns a `Flux` or `Mono`, the shape a reactive repository
//! exposes to its callers. Storage here is a mutex-guarded map; only the
//! signatures matter.
//!
//! Run with: `cargo run --example catalog`

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use efflux::prelude::*;

#[derive(Debug, Clone)]
struct Product {
    id: u32,
    name: String,
    category: String,
    price_cents: u64,
}

#[derive(Clone, Default)]
struct Catalog {
    products: Arc<Mutex<BTreeMap<u32, Product>>>,
}

impl Catalog {
    fn find_all(&self) -> Flux<Product> {
        let products = self.products.clone();
        // Snapshot lazily, at subscription time, so late saves are visible.
        Mono::from_fn(move || {
            Ok(products
                .lock()
                .map(|map| map.values().cloned().collect::<Vec<_>>())
                .unwrap_or_default())
        })
        .flat_map_many(|items| Flux::from_iter(items))
    }

    fn find_by_id(&self, id: u32) -> Mono<Product> {
        let products = self.products.clone();
        Mono::from_fn(move || {
            products
                .lock()
                .ok()
                .and_then(|map| map.get(&id).cloned())
                .ok_or_else(|| FluxError::source(format!("product {id} not found")))
        })
    }

    fn find_by_category(&self, category: &str) -> Flux<Product> {
        let category = category.to_string();
        self.find_all().filter(move |p| p.category == category)
    }

    fn save(&self, product: Product) -> Mono<Product> {
        let products = self.products.clone();
        Mono::from_fn(move || {
            if let Ok(mut map) = products.lock() {
                map.insert(product.id, product.clone());
            }
            Ok(product.clone())
        })
    }

    fn delete(&self, id: u32) -> Mono<u32> {
        let products = self.products.clone();
        Mono::from_fn(move || {
            products
                .lock()
                .ok()
                .and_then(|mut map| map.remove(&id))
                .map(|removed| removed.id)
                .ok_or_else(|| FluxError::source(format!("product {id} not found")))
        })
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    let timeout = Duration::from_secs(1);
    let catalog = Catalog::default();

    // Seed the catalog; each save is a lazy Mono that runs when drained.
    for (id, name, category, price_cents) in [
        (1, "espresso beans", "coffee", 1250),
        (2, "drip grinder", "gear", 8900),
        (3, "colombia single origin", "coffee", 1580),
        (4, "kettle", "gear", 4500),
    ] {
        catalog
            .save(Product {
                id,
                name: name.to_string(),
                category: category.to_string(),
                price_cents,
            })
            .block(timeout)?;
    }

    let coffee_names = catalog
        .find_by_category("coffee")
        .map(|p| p.name)
        .collect_list()
        .block(timeout)?;
    println!("coffee shelf: {coffee_names:?}");

    let kettle = catalog.find_by_id(4).block(timeout)?;
    println!("product 4: {kettle:?}");

    // A missing product surfaces as a stream error, recoverable in-band.
    let fallback = catalog
        .find_by_id(99)
        .map(|p| p.name)
        .on_error_return("(discontinued)".to_string())
        .block(timeout)?;
    println!("product 99: {fallback:?}");

    catalog.delete(2).block(timeout)?;
    let remaining = catalog
        .find_all()
        .map(|p| format!("{} ({} cents)", p.name, p.price_cents))
        .collect_list()
        .block(timeout)?;
    println!("after delete: {remaining:?}");

    Ok(())
}
