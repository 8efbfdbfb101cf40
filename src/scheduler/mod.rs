//! Refresh scheduling: a background task owns the scrape-and-cache cycle,
//! driven by an interval timer and a cancellation token.
//!
//! One cycle refreshes each dataset inside its own failure boundary — a dead
//! stock page never blocks the events refresh, and vice versa. A failed
//! dataset leaves its cache slot untouched, so readers keep the stale
//! snapshot until the next tick (stale-but-available beats unavailable).
//! Ticks that land while a cycle is still running are skipped, not queued;
//! cycles never overlap.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::cache::CacheStore;
use crate::scraper::DataSource;

pub struct Refresher {
    source: Arc<dyn DataSource>,
    cache: CacheStore,
}

/// Per-dataset outcome of one cycle, for logs and the one-shot CLI mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleOutcome {
    pub stock_refreshed: bool,
    pub events_refreshed: bool,
}

impl Refresher {
    pub fn new(source: Arc<dyn DataSource>, cache: CacheStore) -> Self {
        Self { source, cache }
    }

    /// One full refresh cycle: stock, then events.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let stock_refreshed = match self.source.fetch_stock().await {
            Ok(snapshot) => {
                self.cache.set_stock(snapshot).await;
                info!("Stock cache updated");
                true
            }
            Err(e) => {
                error!("Stock refresh failed, keeping previous slot: {:#}", e);
                false
            }
        };

        let events_refreshed = match self.source.fetch_events().await {
            Ok(collection) => {
                info!("Events cache updated ({} events)", collection.events.len());
                self.cache.set_events(collection).await;
                true
            }
            Err(e) => {
                error!("Events refresh failed, keeping previous slot: {:#}", e);
                false
            }
        };

        CycleOutcome {
            stock_refreshed,
            events_refreshed,
        }
    }

    /// Tick loop: one cycle immediately at startup, then one per interval,
    /// until the token is cancelled. An in-flight cycle finishes its cache
    /// write (the slot swap is atomic) before the loop observes cancellation.
    pub async fn run(self, period: Duration, shutdown: CancellationToken) {
        // tokio's interval panics on a zero period; a misconfigured
        // refresh_interval_secs = 0 gets floored instead of crashing serve.
        let period = if period.is_zero() {
            warn!("Refresh period of zero clamped to 1s");
            Duration::from_secs(1)
        } else {
            period
        };

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Refresh scheduler started (period {:?})", period);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Refresh scheduler shutting down");
                    return;
                }
                _ = ticker.tick() => {
                    let outcome = self.run_cycle().await;
                    info!(
                        "Cycle done: stock {}, events {}",
                        if outcome.stock_refreshed { "ok" } else { "failed" },
                        if outcome.events_refreshed { "ok" } else { "failed" },
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use chrono::Utc;
    use tokio_test::assert_ok;

    use crate::models::{EventCollection, EventRecord, StockSnapshot};

    struct StubSource {
        stock_ok: bool,
        events_ok: bool,
    }

    #[async_trait]
    impl DataSource for StubSource {
        async fn fetch_stock(&self) -> Result<StockSnapshot> {
            if self.stock_ok {
                Ok(StockSnapshot {
                    previous_close: "601.04".into(),
                    market_open: "599.50".into(),
                    last_updated: Utc::now(),
                })
            } else {
                Err(anyhow!("stock page down"))
            }
        }

        async fn fetch_events(&self) -> Result<EventCollection> {
            if self.events_ok {
                Ok(EventCollection {
                    events: vec![EventRecord {
                        event_title: Some("Rust Meetup".into()),
                        event_date_time: None,
                        location: None,
                        address: None,
                        description: "Description not found.".into(),
                    }],
                    last_updated: Utc::now(),
                })
            } else {
                Err(anyhow!("listing page down"))
            }
        }
    }

    fn refresher(stock_ok: bool, events_ok: bool, cache: CacheStore) -> Refresher {
        Refresher::new(Arc::new(StubSource { stock_ok, events_ok }), cache)
    }

    #[tokio::test]
    async fn successful_cycle_fills_both_slots() {
        let cache = CacheStore::new();
        let outcome = refresher(true, true, cache.clone()).run_cycle().await;

        assert!(outcome.stock_refreshed && outcome.events_refreshed);
        assert!(cache.stock().await.is_some());
        assert_eq!(cache.events().await.unwrap().events.len(), 1);
    }

    #[tokio::test]
    async fn stock_failure_does_not_block_events() {
        let cache = CacheStore::new();
        let outcome = refresher(false, true, cache.clone()).run_cycle().await;

        assert!(!outcome.stock_refreshed);
        assert!(outcome.events_refreshed);
        assert!(cache.stock().await.is_none());
        assert!(cache.events().await.is_some());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_the_stale_slot() {
        let cache = CacheStore::new();

        // First cycle succeeds and seeds both slots.
        refresher(true, true, cache.clone()).run_cycle().await;
        let stale = cache.stock().await.unwrap();
        let events_before = cache.events_updated_at().await.unwrap();

        // Second cycle: stock down, events still fine.
        refresher(false, true, cache.clone()).run_cycle().await;

        assert_eq!(cache.stock().await.unwrap(), stale);
        assert!(cache.events_updated_at().await.unwrap() >= events_before);
    }

    #[tokio::test]
    async fn cancelled_scheduler_stops() {
        let cache = CacheStore::new();
        let token = CancellationToken::new();
        let handle = tokio::spawn(
            refresher(true, true, cache.clone()).run(Duration::from_secs(3600), token.clone()),
        );

        // Let the startup cycle run, then cancel.
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
        tokio_test::assert_ok!(handle.await);

        assert!(cache.stock().await.is_some());
    }

    #[tokio::test]
    async fn zero_period_is_clamped_not_a_panic() {
        let cache = CacheStore::new();
        let token = CancellationToken::new();
        let handle = tokio::spawn(
            refresher(true, true, cache.clone()).run(Duration::ZERO, token.clone()),
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
        tokio_test::assert_ok!(handle.await);

        assert!(cache.stock().await.is_some());
    }
}
