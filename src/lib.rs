//! l1cache - In-Process TTL Cache
//!
//! A thread-safe key-value store meant to sit in front of a remote cache tier.
//! Entries carry a hard expiration and an optional, shorter freshness window;
//! a per-store janitor task reclaims outdated entries in the background.
//!
//! ```rust,no_run
//! use l1cache::{Lookup, Store, StoreConfig, Ttl};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> l1cache::Result<()> {
//!     let config = StoreConfig::default().with_cleanup_interval(Duration::from_secs(30));
//!     let store: Store<String> = Store::new(config)?;
//!
//!     let ttl = Ttl::expire_after(Duration::from_secs(300)).with_fresh_for(Duration::from_secs(60));
//!     store.set_with_ttl("user:123", "John Doe".to_string(), ttl);
//!
//!     match store.load("user:123") {
//!         Lookup::Fresh(entry) => println!("fresh: {}", entry.value()),
//!         Lookup::Stale(entry) => println!("stale, refresh soon: {}", entry.value()),
//!         Lookup::Absent => println!("miss"),
//!     }
//!
//!     store.shutdown();
//!     Ok(())
//! }
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod metrics;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{StoreConfig, MAX_CLEANUP_INTERVAL};
pub use error::{Error, Result};
pub use metrics::MetricsSnapshot;
pub use storage::{Entry, Lookup, Store, Ttl};
