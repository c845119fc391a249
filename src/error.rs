//! Error Types
//!
//! Construction-time failures. Lookups, overwrites and deletes never fail.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A zero interval would make the janitor spin
    #[error("cleanup interval must be greater than zero, got {0:?}")]
    InvalidCleanupInterval(Duration),
    #[error("cleanup interval {interval:?} exceeds the maximum of {max:?}")]
    CleanupIntervalTooLong { interval: Duration, max: Duration },
    #[error("shard amount must be a power of two greater than one, got {0}")]
    InvalidShardAmount(usize),
    #[error("no tokio runtime available to spawn the janitor; build the store inside a runtime")]
    NoRuntime,
}

pub type Result<T> = std::result::Result<T, Error>;
