//! Concurrent In-Memory TTL Store
//!
//! Sharded hashmap using DashMap: operations on different keys never wait on a
//! store-wide lock, and each entry is replaced or removed as a unit.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, trace};

use super::entry::{Entry, Ttl};
use super::janitor::Janitor;
use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::metrics::{MetricsSnapshot, StoreMetrics};

/// Outcome of [`Store::load`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    /// Present and inside its freshness window
    Fresh(Entry<V>),
    /// Present, past its freshness window, not yet expired
    Stale(Entry<V>),
    /// Never stored, deleted, or expired
    Absent,
}

impl<V> Lookup<V> {
    pub fn is_found(&self) -> bool {
        !matches!(self, Lookup::Absent)
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Lookup::Fresh(_))
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Lookup::Stale(_))
    }

    pub fn entry(&self) -> Option<&Entry<V>> {
        match self {
            Lookup::Fresh(entry) | Lookup::Stale(entry) => Some(entry),
            Lookup::Absent => None,
        }
    }

    pub fn into_entry(self) -> Option<Entry<V>> {
        match self {
            Lookup::Fresh(entry) | Lookup::Stale(entry) => Some(entry),
            Lookup::Absent => None,
        }
    }
}

/// State shared by all handles of a store and, weakly, by its janitor
#[derive(Debug)]
pub(super) struct StoreInner<V> {
    data: DashMap<String, Entry<V>>,
    clock: Arc<dyn Clock>,
    pub(super) metrics: StoreMetrics,
    cleanup_interval: Duration,
    shutdown: CancellationToken,
    janitor: Mutex<Option<JoinHandle<()>>>,
}

impl<V> StoreInner<V> {
    /// Remove every entry that is outdated at the time the scan starts.
    ///
    /// Candidates are collected under per-shard read locks, then removed one by
    /// one with a conditional remove, so an entry overwritten after the
    /// snapshot survives.
    pub(super) fn delete_expired(&self) -> usize {
        let now = self.clock.now();

        let candidates: Vec<String> = self
            .data
            .iter()
            .filter(|entry| entry.value().is_outdated_at(now))
            .map(|entry| entry.key().clone())
            .collect();

        let removed = candidates
            .iter()
            .filter(|key| {
                self.data
                    .remove_if(key.as_str(), |_, entry| entry.is_outdated_at(now))
                    .is_some()
            })
            .count();

        self.metrics.record_reclaimed(removed);
        removed
    }
}

impl<V> Drop for StoreInner<V> {
    fn drop(&mut self) {
        // Last handle gone; let the janitor exit
        self.shutdown.cancel();
    }
}

/// Thread-safe in-memory key-value store with per-entry expiration.
///
/// Cloning yields another handle to the same data. Each store owns one
/// janitor task that reclaims outdated entries every cleanup interval, until
/// [`Store::shutdown`] is called or the last handle is dropped.
#[derive(Debug)]
pub struct Store<V> {
    inner: Arc<StoreInner<V>>,
}

impl<V> Clone for Store<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> Store<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create an empty store on the system clock and start its janitor.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: StoreConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }

    /// Create an empty store reading time from `clock`
    pub fn with_clock(config: StoreConfig, clock: impl Clock) -> Result<Self> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;

        let data = match config.shard_amount {
            Some(shards) => DashMap::with_shard_amount(shards),
            None => DashMap::new(),
        };

        let inner = Arc::new(StoreInner {
            data,
            clock: Arc::new(clock),
            metrics: StoreMetrics::new(),
            cleanup_interval: config.cleanup_interval,
            shutdown: CancellationToken::new(),
            janitor: Mutex::new(None),
        });

        let janitor = Janitor::new(
            Arc::downgrade(&inner),
            config.cleanup_interval,
            inner.shutdown.clone(),
        )
        .spawn(&runtime);
        *inner.janitor.lock() = Some(janitor);

        Ok(Self { inner })
    }

    /// Insert or overwrite; visible to lookups as soon as this returns
    #[inline]
    pub fn set(&self, key: impl Into<String>, entry: Entry<V>) {
        self.inner.data.insert(key.into(), entry);
    }

    /// Insert a value whose windows start now, by the store's clock
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Ttl) {
        let entry = Entry::with_ttl(value, ttl, self.inner.clock.now());
        self.set(key, entry);
    }

    /// Get entry by key, None if absent or expired
    pub fn get(&self, key: &str) -> Option<Entry<V>> {
        let now = self.inner.clock.now();
        let found = self.fetch(key, now);
        match &found {
            Some(entry) if entry.is_outdated_at(now) => {
                self.inner.metrics.record_stale_hit()
            }
            Some(_) => self.inner.metrics.record_hit(),
            None => self.inner.metrics.record_miss(),
        }
        found
    }

    /// Like [`Store::get`], but tells a fresh entry from a stale one
    pub fn load(&self, key: &str) -> Lookup<V> {
        let now = self.inner.clock.now();
        let Some(entry) = self.fetch(key, now) else {
            self.inner.metrics.record_miss();
            return Lookup::Absent;
        };

        if entry.is_outdated_at(now) {
            self.inner.metrics.record_stale_hit();
            Lookup::Stale(entry)
        } else {
            self.inner.metrics.record_hit();
            Lookup::Fresh(entry)
        }
    }

    fn fetch(&self, key: &str, now: DateTime<Utc>) -> Option<Entry<V>> {
        let entry = self.inner.data.get(key)?;

        if !entry.is_expired_at(now) {
            return Some(entry.value().clone());
        }

        // Release the shard read lock before taking the write lock
        drop(entry);
        if self
            .inner
            .data
            .remove_if(key, |_, entry| entry.is_expired_at(now))
            .is_some()
        {
            trace!(key, "Removed expired entry on read");
            self.inner.metrics.record_reclaimed(1);
        }
        None
    }

    /// Delete key, returns true if it was stored (expired or not)
    #[inline]
    pub fn delete(&self, key: &str) -> bool {
        self.inner.data.remove(key).is_some()
    }

    /// Remove outdated entries, returns count of removed keys.
    ///
    /// This is what the janitor runs on every tick.
    pub fn delete_expired(&self) -> usize {
        self.inner.delete_expired()
    }

    /// Check if key exists and is not expired
    pub fn contains_key(&self, key: &str) -> bool {
        let now = self.inner.clock.now();
        self.inner
            .data
            .get(key)
            .map(|entry| !entry.is_expired_at(now))
            .unwrap_or(false)
    }

    /// Check if key is physically stored, expired or not
    pub fn is_resident(&self, key: &str) -> bool {
        self.inner.data.contains_key(key)
    }

    /// Keys not yet expired
    pub fn keys(&self) -> Vec<String> {
        let now = self.inner.clock.now();
        self.inner
            .data
            .iter()
            .filter(|entry| !entry.value().is_expired_at(now))
            .map(|entry| entry.key().clone())
            .collect()
    }
}

impl<V> Store<V> {
    /// Number of stored keys (including expired - approximate)
    pub fn len(&self) -> usize {
        self.inner.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.data.is_empty()
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.inner.data.clear();
    }

    pub fn cleanup_interval(&self) -> Duration {
        self.inner.cleanup_interval
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    /// Stop the janitor after its current scan. Entries stay readable and
    /// [`Store::delete_expired`] still works when called directly.
    pub fn shutdown(&self) {
        if !self.inner.shutdown.is_cancelled() {
            info!("Store shutdown requested");
        }
        self.inner.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    /// False once the janitor task has exited or been joined
    pub fn is_janitor_running(&self) -> bool {
        self.inner
            .janitor
            .lock()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Shut down and wait for the janitor task to exit
    pub async fn shutdown_and_wait(&self) {
        self.shutdown();

        let handle = self.inner.janitor.lock().take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                error!(error = %err, "Janitor task failed");
            }
        }
    }
}
