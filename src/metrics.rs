//! Store Metrics
//!
//! Lookup outcome counters and reclamation totals.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by every handle of one store
#[derive(Debug, Default)]
pub struct StoreMetrics {
    /// Lookups that found a fresh entry
    hits: AtomicU64,
    /// Lookups that found an outdated but unexpired entry
    stale_hits: AtomicU64,
    /// Lookups that found nothing visible
    misses: AtomicU64,
    /// Entries removed after going outdated or expired
    reclaimed: AtomicU64,
    /// Completed janitor scans
    janitor_runs: AtomicU64,
}

/// Point-in-time copy of [`StoreMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub hits: u64,
    pub stale_hits: u64,
    pub misses: u64,
    pub reclaimed: u64,
    pub janitor_runs: u64,
}

impl StoreMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_stale_hit(&self) {
        self.stale_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reclaimed(&self, count: usize) {
        self.reclaimed.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_janitor_run(&self) {
        self.janitor_runs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            stale_hits: self.stale_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            reclaimed: self.reclaimed.load(Ordering::Relaxed),
            janitor_runs: self.janitor_runs.load(Ordering::Relaxed),
        }
    }
}

impl MetricsSnapshot {
    /// Share of lookups that returned an entry, stale or not
    pub fn hit_ratio(&self) -> f64 {
        let found = self.hits + self.stale_hits;
        let total = found + self.misses;
        if total == 0 {
            return 0.0;
        }
        found as f64 / total as f64
    }

    pub fn summary(&self) -> String {
        format!(
            "Lookups: hits={} stale={} misses={} (ratio {:.2}) | Reclaimed: {} in {} scans",
            self.hits,
            self.stale_hits,
            self.misses,
            self.hit_ratio(),
            self.reclaimed,
            self.janitor_runs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics() {
        let metrics = StoreMetrics::new();

        metrics.record_hit();
        metrics.record_hit();
        metrics.record_stale_hit();
        metrics.record_miss();
        metrics.record_reclaimed(3);
        metrics.record_reclaimed(0);
        metrics.record_janitor_run();

        let snap = metrics.snapshot();
        assert_eq!(snap.hits, 2);
        assert_eq!(snap.stale_hits, 1);
        assert_eq!(snap.misses, 1);
        assert_eq!(snap.reclaimed, 3);
        assert_eq!(snap.janitor_runs, 1);
        assert!((snap.hit_ratio() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_ratio() {
        assert_eq!(MetricsSnapshot::default().hit_ratio(), 0.0);
    }
}
