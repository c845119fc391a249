//! Janitor
//!
//! Background task that periodically removes outdated entries from a Store.

use std::sync::Weak;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::store::StoreInner;

/// Reclamation task bound to one store.
///
/// Holds the store weakly: once every handle is gone there is nothing left to
/// clean and the loop ends.
pub(super) struct Janitor<V> {
    store: Weak<StoreInner<V>>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl<V> Janitor<V>
where
    V: Send + Sync + 'static,
{
    pub(super) fn new(
        store: Weak<StoreInner<V>>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            store,
            interval,
            shutdown,
        }
    }

    /// Run until cancelled or the store is dropped.
    ///
    /// The first scan happens one interval after start. A scan that overruns
    /// pushes the next tick back instead of queueing a burst.
    pub(super) async fn run(self) {
        let Some(start) = Instant::now().checked_add(self.interval) else {
            warn!("Cleanup interval {:?} out of timer range, janitor not started", self.interval);
            return;
        };
        let mut ticker = interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Janitor started, interval: {:?}", self.interval);

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let Some(store) = self.store.upgrade() else {
                break;
            };
            let removed = store.delete_expired();
            store.metrics.record_janitor_run();
            if removed > 0 {
                debug!(removed = removed, "Reclaimed outdated entries");
            }
        }

        info!("Janitor stopped");
    }

    /// Spawn the janitor on `runtime`
    pub(super) fn spawn(self, runtime: &Handle) -> JoinHandle<()> {
        runtime.spawn(self.run())
    }
}

#[cfg(test)]
mod tests {
    use crate::clock::ManualClock;
    use crate::config::StoreConfig;
    use crate::storage::{Entry, Store};
    use std::time::Duration;

    const TICK: Duration = Duration::from_secs(1);

    fn store_with_tick() -> (Store<i32>, ManualClock) {
        let clock = ManualClock::at_unix(1_000);
        let config = StoreConfig::new().with_cleanup_interval(TICK);
        let store = Store::with_clock(config, clock.clone()).unwrap();
        (store, clock)
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_cleanup_runs() {
        let (store, clock) = store_with_tick();
        store.set("expire1", Entry::new(1).with_expiration_unix(1_001));
        store.set("expire2", Entry::new(2).with_expiration_unix(1_001));
        store.set("keep", Entry::new(3).with_expiration_unix(2_000));

        clock.advance(Duration::from_secs(2));
        assert_eq!(store.len(), 3);

        tokio::time::sleep(TICK + Duration::from_millis(500)).await;

        assert_eq!(store.len(), 1);
        assert!(store.contains_key("keep"));
        assert_eq!(store.metrics().reclaimed, 2);
        assert!(store.metrics().janitor_runs >= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_expiration_survives_many_ticks() {
        let (store, clock) = store_with_tick();
        store.set("forever", Entry::new(42));

        for _ in 0..5 {
            clock.advance(Duration::from_secs(3600));
            tokio::time::sleep(TICK).await;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert!(store.metrics().janitor_runs >= 5);
        assert_eq!(store.get("forever").map(Entry::into_value), Some(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_worked_example() {
        let (store, clock) = store_with_tick();
        store.set("x", Entry::new(42).with_expiration_unix(1_002));

        // now + 1
        clock.advance(TICK);
        tokio::time::sleep(TICK).await;
        assert_eq!(store.get("x").map(Entry::into_value), Some(42));

        // now + 3: invisible, not yet scanned
        clock.advance(Duration::from_secs(2));
        assert!(!store.contains_key("x"));
        assert!(store.is_resident("x"));

        // now + 4, after one more tick
        clock.advance(TICK);
        tokio::time::sleep(TICK + Duration::from_millis(500)).await;
        assert!(!store.is_resident("x"));
        assert_eq!(store.get("x"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_cleanup_task() {
        let (store, clock) = store_with_tick();
        store.set("k", Entry::new(1).with_expiration_unix(1_001));

        store.shutdown();
        clock.advance(Duration::from_secs(10));
        tokio::time::sleep(TICK * 5).await;

        assert!(store.is_resident("k"));
        assert_eq!(store.metrics().janitor_runs, 0);

        // Manual reclamation still works
        assert_eq!(store.delete_expired(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_multiple_stores_independent_cleanup() {
        let clock = ManualClock::at_unix(1_000);
        let fast: Store<i32> = Store::with_clock(
            StoreConfig::new().with_cleanup_interval(Duration::from_millis(50)),
            clock.clone(),
        )
        .unwrap();
        let slow: Store<i32> = Store::with_clock(
            StoreConfig::new().with_cleanup_interval(Duration::from_secs(60)),
            clock.clone(),
        )
        .unwrap();

        fast.set("expire", Entry::new(1).with_expiration_unix(1_001));
        slow.set("expire", Entry::new(1).with_expiration_unix(1_001));
        clock.advance(Duration::from_secs(2));

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(!fast.is_resident("expire"));
        assert!(slow.is_resident("expire"));
    }
}
