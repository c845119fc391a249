//! Storage Engine
//!
//! In-memory key-value store with per-entry expiration and a background janitor.

mod entry;
mod janitor;
mod store;

pub use entry::{Entry, Ttl};
pub use store::{Lookup, Store};
