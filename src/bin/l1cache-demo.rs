//! l1cache Demo
//!
//! Walks one entry through fresh, stale, expired and reclaimed on the system
//! clock, logging what each lookup sees.

use clap::Parser;
use l1cache::{Lookup, Store, StoreConfig, Ttl};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// l1cache Demo - TTL store walkthrough
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Janitor interval in milliseconds
    #[arg(long, default_value_t = 1000)]
    cleanup_interval_ms: u64,

    /// Hard expiration of the demo entry in milliseconds
    #[arg(long, default_value_t = 2000)]
    expire_after_ms: u64,

    /// Freshness window of the demo entry in milliseconds
    #[arg(long, default_value_t = 500)]
    fresh_for_ms: u64,
}

fn describe(lookup: &Lookup<u64>) -> String {
    match lookup {
        Lookup::Fresh(entry) => format!("fresh ({})", entry.value()),
        Lookup::Stale(entry) => format!("stale ({})", entry.value()),
        Lookup::Absent => "absent".to_string(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("l1cache=debug".parse()?))
        .init();

    let args = Args::parse();
    let interval = Duration::from_millis(args.cleanup_interval_ms);
    let expire_after = Duration::from_millis(args.expire_after_ms);
    let fresh_for = Duration::from_millis(args.fresh_for_ms);

    let store: Store<u64> = Store::new(StoreConfig::default().with_cleanup_interval(interval))?;

    store.set_with_ttl("x", 42, Ttl::expire_after(expire_after).with_fresh_for(fresh_for));
    info!(key = "x", "Inserted: {}", describe(&store.load("x")));

    tokio::time::sleep(fresh_for).await;
    info!(key = "x", "After freshness window: {}", describe(&store.load("x")));

    tokio::time::sleep(expire_after.saturating_sub(fresh_for)).await;
    info!(
        key = "x",
        resident = store.is_resident("x"),
        "After expiration: {}",
        describe(&store.load("x"))
    );

    store.set_with_ttl("y", 7, Ttl::expire_after(fresh_for));
    tokio::time::sleep(fresh_for + interval * 2).await;
    info!(key = "y", resident = store.is_resident("y"), "After janitor ticks");

    info!("{}", store.metrics().summary());
    store.shutdown();

    Ok(())
}
