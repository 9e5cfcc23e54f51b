//! In-memory per-symbol record cache with a TTL checked against an injected clock.

use std::collections::HashMap;
use std::sync::Arc;

use time::Duration;

use crate::clock::Clock;
use crate::{StockRecord, UtcDateTime};

#[derive(Debug, Clone)]
struct CacheEntry {
    record: StockRecord,
    expires_at: UtcDateTime,
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<String, CacheEntry>,
    ttl: Duration,
}

impl CacheInner {
    fn get(&self, symbol: &str, now: UtcDateTime) -> Option<StockRecord> {
        self.map.get(symbol).and_then(|entry| {
            if now < entry.expires_at {
                Some(entry.record.clone())
            } else {
                None
            }
        })
    }

    fn put(&mut self, record: StockRecord, now: UtcDateTime) {
        let Some(expires_at) = now.checked_add(self.ttl) else {
            return;
        };
        self.map
            .insert(record.symbol().to_owned(), CacheEntry { record, expires_at });
    }

    fn clear_expired(&mut self, now: UtcDateTime) {
        self.map.retain(|_, entry| entry.expires_at > now);
    }
}

/// Short-lived cache of normalized records, keyed by symbol.
///
/// A zero TTL disables the cache.
#[derive(Clone)]
pub struct QuoteCache {
    inner: Arc<tokio::sync::RwLock<CacheInner>>,
    clock: Arc<dyn Clock>,
}

impl QuoteCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner {
                map: HashMap::new(),
                ttl,
            })),
            clock,
        }
    }

    pub fn disabled(clock: Arc<dyn Clock>) -> Self {
        Self::new(Duration::ZERO, clock)
    }

    /// Returns the cached record for `symbol` unless it is missing or expired.
    pub async fn get(&self, symbol: &str) -> Option<StockRecord> {
        let store = self.inner.read().await;
        store.get(symbol, self.clock.now())
    }

    pub async fn put(&self, record: StockRecord) {
        let mut store = self.inner.write().await;
        if store.ttl <= Duration::ZERO {
            return;
        }
        store.put(record, self.clock.now());
    }

    pub async fn clear_expired(&self) {
        let mut store = self.inner.write().await;
        store.clear_expired(self.clock.now());
    }

    pub async fn clear(&self) {
        self.inner.write().await.map.clear();
    }

    /// Number of entries, including expired ones not yet cleared.
    pub async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }

    pub async fn is_disabled(&self) -> bool {
        self.inner.read().await.ttl <= Duration::ZERO
    }
}
