//! In-process cache: one slot per dataset, replaced wholesale on a
//! successful refresh.
//!
//! Single writer (the scheduler), many readers (API handlers). A reader
//! either sees the last complete snapshot or nothing; it can never observe a
//! half-written slot because the whole `Slot` goes in under one write lock.
//! Constructed once in `main` and cloned into whoever needs it — there is no
//! ambient global.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::{EventCollection, StockSnapshot};

/// One dataset's cached state: payload plus the refresh timestamp, written
/// together.
#[derive(Debug, Clone)]
pub struct Slot<T> {
    pub data: T,
    pub last_updated: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct CacheStore {
    stock: Arc<RwLock<Option<Slot<StockSnapshot>>>>,
    events: Arc<RwLock<Option<Slot<EventCollection>>>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn stock(&self) -> Option<StockSnapshot> {
        self.stock.read().await.as_ref().map(|s| s.data.clone())
    }

    pub async fn events(&self) -> Option<EventCollection> {
        self.events.read().await.as_ref().map(|s| s.data.clone())
    }

    pub async fn stock_updated_at(&self) -> Option<DateTime<Utc>> {
        self.stock.read().await.as_ref().map(|s| s.last_updated)
    }

    pub async fn events_updated_at(&self) -> Option<DateTime<Utc>> {
        self.events.read().await.as_ref().map(|s| s.last_updated)
    }

    pub async fn set_stock(&self, data: StockSnapshot) {
        *self.stock.write().await = Some(Slot {
            data,
            last_updated: Utc::now(),
        });
    }

    pub async fn set_events(&self, data: EventCollection) {
        *self.events.write().await = Some(Slot {
            data,
            last_updated: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(close: &str) -> StockSnapshot {
        StockSnapshot {
            previous_close: close.into(),
            market_open: "599.50".into(),
            last_updated: Utc::now(),
        }
    }

    #[tokio::test]
    async fn empty_store_serves_nothing() {
        let cache = CacheStore::new();
        assert!(cache.stock().await.is_none());
        assert!(cache.events().await.is_none());
        assert!(cache.stock_updated_at().await.is_none());
    }

    #[tokio::test]
    async fn write_replaces_the_whole_slot() {
        let cache = CacheStore::new();

        cache.set_stock(snapshot("100.00")).await;
        let first = cache.stock_updated_at().await.unwrap();

        cache.set_stock(snapshot("200.00")).await;
        let read = cache.stock().await.unwrap();
        assert_eq!(read.previous_close, "200.00");
        assert!(cache.stock_updated_at().await.unwrap() >= first);
    }

    #[tokio::test]
    async fn datasets_are_independent() {
        let cache = CacheStore::new();
        cache.set_stock(snapshot("100.00")).await;

        assert!(cache.stock().await.is_some());
        assert!(cache.events().await.is_none());
    }

    #[tokio::test]
    async fn clones_share_the_same_slots() {
        let cache = CacheStore::new();
        let handle = cache.clone();

        cache.set_stock(snapshot("100.00")).await;
        assert!(handle.stock().await.is_some());
    }
}
