//! Store Configuration

use std::time::Duration;

use crate::error::{Error, Result};

/// Longest accepted janitor interval. Timer deadlines past this risk
/// overflowing the runtime clock.
pub const MAX_CLEANUP_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Period between janitor scans
    pub cleanup_interval: Duration,

    /// Number of map shards (None = let DashMap decide)
    pub shard_amount: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: Duration::from_secs(10),
            shard_amount: None,
        }
    }
}

impl StoreConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the janitor interval
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Set the number of map shards
    pub fn with_shard_amount(mut self, shards: usize) -> Self {
        self.shard_amount = Some(shards);
        self
    }

    /// Reject values the store cannot run with.
    ///
    /// DashMap panics on a shard amount that is not a power of two above one,
    /// so that is caught here instead.
    pub fn validate(&self) -> Result<()> {
        if self.cleanup_interval.is_zero() {
            return Err(Error::InvalidCleanupInterval(self.cleanup_interval));
        }
        if self.cleanup_interval > MAX_CLEANUP_INTERVAL {
            return Err(Error::CleanupIntervalTooLong {
                interval: self.cleanup_interval,
                max: MAX_CLEANUP_INTERVAL,
            });
        }
        if let Some(shards) = self.shard_amount {
            if shards < 2 || !shards.is_power_of_two() {
                return Err(Error::InvalidShardAmount(shards));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.cleanup_interval, Duration::from_secs(10));
        assert_eq!(config.shard_amount, None);
        assert_ok!(config.validate());
    }

    #[test]
    fn test_builder_chaining() {
        let config = StoreConfig::new()
            .with_cleanup_interval(Duration::from_millis(250))
            .with_shard_amount(16);
        assert_eq!(config.cleanup_interval, Duration::from_millis(250));
        assert_eq!(config.shard_amount, Some(16));
        assert_ok!(config.validate());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = StoreConfig::new().with_cleanup_interval(Duration::ZERO);
        let err = assert_err!(config.validate());
        assert_eq!(err, Error::InvalidCleanupInterval(Duration::ZERO));
    }

    #[test]
    fn test_huge_interval_rejected() {
        let too_long = [
            Duration::MAX,
            Duration::from_secs(u64::MAX),
            MAX_CLEANUP_INTERVAL + Duration::from_nanos(1),
        ];
        for interval in too_long {
            let config = StoreConfig::new().with_cleanup_interval(interval);
            let err = assert_err!(config.validate());
            assert_eq!(
                err,
                Error::CleanupIntervalTooLong {
                    interval,
                    max: MAX_CLEANUP_INTERVAL
                }
            );
        }

        let config = StoreConfig::new().with_cleanup_interval(MAX_CLEANUP_INTERVAL);
        assert_ok!(config.validate());
    }

    #[test]
    fn test_bad_shard_amounts_rejected() {
        for shards in [0, 1, 3, 12] {
            let config = StoreConfig::new().with_shard_amount(shards);
            assert_eq!(config.validate(), Err(Error::InvalidShardAmount(shards)));
        }
    }
}
