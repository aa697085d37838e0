// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Walks through three navigations to the same page.
//!
//! - The first visit misses the cache and waits for the origin.
//! - The second visit shows the cached list at once while the origin is asked again
//!   in the background; the live view swaps to the fresh list when it arrives.
//! - After a mutation invalidates the page, the third visit misses again.
//!
//! Run with `RUST_LOG=debug` to see every cache step.

use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use serde_json::{Value, json};
use swrcache::{
    AdapterRegistry, AdapterSource, ExecutionContext, Host, LiveBinder, LoadError, LoadOptions, LoadOutcome, MemoryStore,
    SwrView, decache_action, load_through_cache,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

static ORIGIN_CALLS: AtomicUsize = AtomicUsize::new(0);

struct Console;

impl Host for Console {
    fn navigate(&self, location: &str) {
        println!("-> navigating to {location}");
    }

    fn report(&self, error: LoadError) {
        println!("!! background refresh failed: {error}");
    }
}

/// Pretends to be a slow origin that gains one user per call.
async fn fetch_users() -> LoadOutcome {
    let call = ORIGIN_CALLS.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let users: Vec<Value> = ["Leanne", "Ervin", "Clementine", "Patricia"]
        .iter()
        .take(call + 1)
        .map(|name| json!(name))
        .collect();
    LoadOutcome::Fresh(Value::Array(users))
}

fn render(users: &Value) -> String {
    format!("users: {users}")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let registry = AdapterRegistry::with_memory();
    registry.configure(ExecutionContext::Client, || AdapterSource::store(MemoryStore::new()))?;

    let binder = LiveBinder::with_registry(&registry, Console);
    let url = Url::parse("https://example.com/users")?;
    let options = LoadOptions::new().registry(&registry);

    println!("first visit");
    let envelope = load_through_cache(&url, fetch_users, options.clone()).await?;
    println!("  {}", render(binder.on_envelope(&envelope).data()));

    println!("second visit");
    let envelope = load_through_cache(&url, fetch_users, options.clone()).await?;
    let rendered = SwrView::from(&envelope).render(render);
    println!("  interim {}", rendered.current());
    binder.on_envelope(&envelope);
    println!("  final   {}", rendered.settle().await?);
    binder.settled().await;
    if let Some(current) = binder.current() {
        println!("  live    {}", render(&current));
    }

    println!("mutation");
    decache_action(&url, || async { println!("  adding a user") }, options.clone()).await?;

    println!("third visit");
    let envelope = load_through_cache(&url, fetch_users, options).await?;
    println!("  {} (revalidating: {})", render(binder.on_envelope(&envelope).data()), envelope.is_revalidating());

    println!("origin was called {} times", ORIGIN_CALLS.load(Ordering::SeqCst));
    Ok(())
}
