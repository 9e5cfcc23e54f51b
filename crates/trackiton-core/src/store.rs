//! Durable key/value persistence for the fetch ledger.
//!
//! [`KeyValueStore`] models browser-style local storage: string keys mapping to
//! string blobs. [`LedgerStore`] keeps the whole [`FetchLedger`] under a single
//! key and replaces it on every save.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use crate::{FetchLedger, StoreError, UtcDateTime};

/// Key holding the serialized ledger.
pub const LEDGER_KEY: &str = "stockData";
/// Key of the superseded timestamp-only scheme (epoch milliseconds).
pub const LEGACY_TIMESTAMP_KEY: &str = "lastFetchTimestamp";

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// String key/value storage that survives process restarts.
pub trait KeyValueStore: Send + Sync {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>>;

    fn set<'a>(&'a self, key: &'a str, value: String) -> StoreFuture<'a, ()>;

    fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()>;
}

/// Process-local store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
        Box::pin(async move { Ok(self.entries().get(key).cloned()) })
    }

    fn set<'a>(&'a self, key: &'a str, value: String) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.entries().insert(key.to_owned(), value);
            Ok(())
        })
    }

    fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.entries().remove(key);
            Ok(())
        })
    }
}

/// One file per key under a root directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash never leaves a half-written value behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", urlencoding::encode(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
        Box::pin(async move {
            match tokio::fs::read_to_string(self.path_for(key)).await {
                Ok(value) => Ok(Some(value)),
                Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(error) => Err(StoreError::Io(error)),
            }
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: String) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            tokio::fs::create_dir_all(&self.root).await?;
            let path = self.path_for(key);
            let staging = path.with_extension("json.tmp");
            tokio::fs::write(&staging, value).await?;
            tokio::fs::rename(&staging, &path).await?;
            Ok(())
        })
    }

    fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            match tokio::fs::remove_file(self.path_for(key)).await {
                Ok(()) => Ok(()),
                Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(error) => Err(StoreError::Io(error)),
            }
        })
    }
}

/// Ledger persistence on top of a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct LedgerStore<S> {
    store: S,
}

impl<S: KeyValueStore> LedgerStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Replaces the stored ledger and drops the legacy timestamp key.
    pub async fn save(&self, ledger: &FetchLedger) -> Result<(), StoreError> {
        let raw = serde_json::to_string(ledger)?;
        self.store.set(LEDGER_KEY, raw).await?;
        self.store.remove(LEGACY_TIMESTAMP_KEY).await?;
        debug!(records = ledger.len(), fetched_at = %ledger.fetched_at(), "ledger saved");
        Ok(())
    }

    /// Reads the ledger, reporting malformed bytes as [`StoreError::Corrupt`].
    pub async fn try_load(&self) -> Result<Option<FetchLedger>, StoreError> {
        let Some(raw) = self.store.get(LEDGER_KEY).await? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|error| StoreError::Corrupt {
                key: LEDGER_KEY.to_owned(),
                reason: error.to_string(),
            })
    }

    /// Reads the ledger; missing, unreadable or malformed data is a cache miss.
    pub async fn load(&self) -> Option<FetchLedger> {
        match self.try_load().await {
            Ok(ledger) => ledger,
            Err(error) => {
                warn!(%error, "stored ledger unusable, treating as cache miss");
                None
            }
        }
    }

    /// Fetch instant of the stored ledger, falling back to the legacy timestamp key.
    pub async fn last_fetch_time(&self) -> Option<UtcDateTime> {
        if let Some(ledger) = self.load().await {
            return Some(ledger.fetched_at());
        }

        let raw = match self.store.get(LEGACY_TIMESTAMP_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(error) => {
                warn!(%error, "legacy fetch timestamp unreadable");
                return None;
            }
        };

        match raw.trim().parse::<i64>().map(UtcDateTime::from_unix_millis) {
            Ok(Ok(instant)) => Some(instant),
            _ => {
                warn!(value = %raw, "legacy fetch timestamp is malformed");
                None
            }
        }
    }

    /// Moves the stored ledger's fetch instant forward to `now` without touching its records.
    ///
    /// Returns `false` when there is no usable ledger. The instant never moves backwards.
    pub async fn touch(&self, now: UtcDateTime) -> Result<bool, StoreError> {
        let Some(ledger) = self.load().await else {
            return Ok(false);
        };
        let fetched_at = ledger.fetched_at().max(now);
        self.save(&ledger.with_fetched_at(fetched_at)).await?;
        Ok(true)
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(LEDGER_KEY).await?;
        self.store.remove(LEGACY_TIMESTAMP_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{QuotePoint, StockRecord};

    fn ledger(fetched_at: &str) -> FetchLedger {
        let record = StockRecord::from_series(
            "AAPL",
            "Apple Inc.",
            vec![
                QuotePoint::new("2024-01-10 09:35:00", 180.0),
                QuotePoint::new("2024-01-10 16:00:00", 186.5),
            ],
        )
        .expect("valid record");
        FetchLedger::new(vec![record], UtcDateTime::parse(fetched_at).expect("valid"))
    }

    #[tokio::test]
    async fn load_on_empty_store_is_none() {
        let store = LedgerStore::new(MemoryStore::new());
        assert!(store.load().await.is_none());
        assert!(store.last_fetch_time().await.is_none());
    }

    #[tokio::test]
    async fn save_then_load_returns_same_ledger() {
        let store = LedgerStore::new(MemoryStore::new());
        let saved = ledger("2024-01-10T21:00:00.123Z");

        store.save(&saved).await.expect("save");

        assert_eq!(store.load().await, Some(saved));
    }

    #[tokio::test]
    async fn malformed_bytes_are_a_cache_miss() {
        let memory = MemoryStore::new();
        memory
            .set(LEDGER_KEY, String::from("{not json"))
            .await
            .expect("set");
        let store = LedgerStore::new(memory);

        assert!(matches!(store.try_load().await, Err(StoreError::Corrupt { .. })));
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn out_of_order_series_is_a_cache_miss() {
        let memory = MemoryStore::new();
        let raw = r#"{"records":[{"symbol":"AAPL","name":"AAPL","series":[{"timestamp":"2024-01-10 16:00:00","price":200.0},{"timestamp":"2024-01-10 09:35:00","price":100.0}]}],"fetchedAt":"2024-01-10T12:00:00Z"}"#;
        memory.set(LEDGER_KEY, raw.to_owned()).await.expect("set");
        let store = LedgerStore::new(memory);

        assert!(matches!(store.try_load().await, Err(StoreError::Corrupt { .. })));
        assert!(store.load().await.is_none());
        assert!(store.last_fetch_time().await.is_none());
    }

    #[tokio::test]
    async fn legacy_timestamp_is_read_when_no_ledger_exists() {
        let memory = MemoryStore::new();
        memory
            .set(LEGACY_TIMESTAMP_KEY, String::from("1704920400000"))
            .await
            .expect("set");
        let store = LedgerStore::new(memory);

        let last = store.last_fetch_time().await.expect("legacy timestamp");
        assert_eq!(last.format_rfc3339(), "2024-01-10T21:00:00Z");
    }

    #[tokio::test]
    async fn saving_a_ledger_supersedes_legacy_key() {
        let memory = MemoryStore::new();
        memory
            .set(LEGACY_TIMESTAMP_KEY, String::from("1"))
            .await
            .expect("set");
        let store = LedgerStore::new(memory.clone());

        store.save(&ledger("2024-01-10T21:00:00Z")).await.expect("save");

        assert_eq!(memory.get(LEGACY_TIMESTAMP_KEY).await.expect("get"), None);
    }

    #[tokio::test]
    async fn touch_never_moves_backwards() {
        let store = LedgerStore::new(MemoryStore::new());
        store.save(&ledger("2024-01-10T21:00:00Z")).await.expect("save");

        let earlier = UtcDateTime::parse("2024-01-10T20:00:00Z").expect("valid");
        assert!(store.touch(earlier).await.expect("touch"));
        assert_eq!(
            store.last_fetch_time().await.map(UtcDateTime::format_rfc3339),
            Some(String::from("2024-01-10T21:00:00Z"))
        );

        let later = UtcDateTime::parse("2024-01-11T11:00:00Z").expect("valid");
        store.touch(later).await.expect("touch");
        assert_eq!(store.last_fetch_time().await, Some(later));
    }

    #[tokio::test]
    async fn touch_without_ledger_is_a_no_op() {
        let store = LedgerStore::new(MemoryStore::new());
        assert!(!store.touch(UtcDateTime::now()).await.expect("touch"));
    }

    #[tokio::test]
    async fn file_store_round_trips_and_removes() {
        let temp = tempfile::tempdir().expect("tempdir");
        let files = FileStore::new(temp.path().join("storage"));

        assert_eq!(files.get("stockData").await.expect("get"), None);
        files.set("stockData", String::from("{}")).await.expect("set");
        assert_eq!(files.get("stockData").await.expect("get"), Some(String::from("{}")));

        files.remove("stockData").await.expect("remove");
        files.remove("stockData").await.expect("second remove is fine");
        assert_eq!(files.get("stockData").await.expect("get"), None);
    }

    #[tokio::test]
    async fn file_store_keys_cannot_escape_root() {
        let temp = tempfile::tempdir().expect("tempdir");
        let files = FileStore::new(temp.path());

        files.set("../escape", String::from("x")).await.expect("set");

        let path = files.path_for("../escape");
        assert_eq!(path.parent(), Some(temp.path()));
    }
}
