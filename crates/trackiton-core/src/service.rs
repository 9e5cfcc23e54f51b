//! Per-symbol fetching and sequential batch refreshes.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::ApiRequest;
use crate::cache::QuoteCache;
use crate::clock::Clock;
use crate::config::TrackerConfig;
use crate::fetcher::BackoffFetcher;
use crate::http_client::HttpClient;
use crate::normalize::{company_name, normalize_with_interval};
use crate::{FetchError, StockRecord};

/// A symbol skipped during a batch, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolFailure {
    pub symbol: String,
    pub error: FetchError,
}

/// Result of one pass over a symbol list: whatever succeeded plus per-symbol failures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub records: Vec<StockRecord>,
    pub failures: Vec<SymbolFailure>,
}

impl BatchOutcome {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Fetches normalized records from the upstream API through the backoff
/// fetcher and the in-memory cache.
#[derive(Clone)]
pub struct StockService {
    config: TrackerConfig,
    fetcher: BackoffFetcher,
    cache: QuoteCache,
}

impl StockService {
    pub fn new(config: TrackerConfig, http_client: Arc<dyn HttpClient>, clock: Arc<dyn Clock>) -> Self {
        let fetcher = BackoffFetcher::new(http_client, config.retry)
            .with_timeout_ms(config.request_timeout_ms);
        let ttl = time::Duration::try_from(config.cache_ttl).unwrap_or(time::Duration::ZERO);
        let cache = QuoteCache::new(ttl, clock);

        Self {
            config,
            fetcher,
            cache,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn cache(&self) -> &QuoteCache {
        &self.cache
    }

    /// Fetches and normalizes one symbol, serving a fresh cache entry when present.
    ///
    /// # Errors
    ///
    /// [`FetchError::ConfigMissing`] is returned before any request when no API
    /// key is configured; otherwise fetch and normalization errors propagate.
    pub async fn fetch_stock(&self, symbol: &str) -> Result<StockRecord, FetchError> {
        self.fetch_stock_tracked(symbol).await.map(|(record, _)| record)
    }

    /// Like [`fetch_stock`](Self::fetch_stock), also reporting whether upstream was called.
    async fn fetch_stock_tracked(&self, symbol: &str) -> Result<(StockRecord, bool), FetchError> {
        let api_key = self.config.require_api_key()?;

        if let Some(cached) = self.cache.get(symbol).await {
            debug!(symbol, "using cached record");
            return Ok((cached, false));
        }

        info!(symbol, "fetching intraday series");
        let url = ApiRequest::intraday(symbol, self.config.interval).url(&self.config.base_url, api_key);
        let payload = self.fetcher.fetch(&url).await?;
        let mut record = normalize_with_interval(symbol, &payload, self.config.interval)?;

        if self.config.resolve_names && record.name() == symbol {
            if let Some(name) = self.resolve_name(symbol, api_key).await {
                record = record.with_name(name);
            }
        }

        self.cache.put(record.clone()).await;
        Ok((record, true))
    }

    async fn resolve_name(&self, symbol: &str, api_key: &str) -> Option<String> {
        let url = ApiRequest::overview(symbol).url(&self.config.base_url, api_key);
        match self.fetcher.fetch(&url).await {
            Ok(payload) => company_name(&payload),
            Err(error) => {
                warn!(symbol, %error, "company name lookup failed, keeping symbol as name");
                None
            }
        }
    }

    /// Fetches `symbols` one after another, pausing `symbol_delay` after every
    /// symbol freshly fetched from upstream, except the last one.
    ///
    /// Per-symbol failures are logged and collected; only a fatal error such as
    /// [`FetchError::ConfigMissing`] aborts the batch.
    pub async fn fetch_many(&self, symbols: &[String]) -> Result<BatchOutcome, FetchError> {
        info!(count = symbols.len(), "starting batch fetch");
        let mut outcome = BatchOutcome::default();

        for (index, symbol) in symbols.iter().enumerate() {
            let called_upstream = match self.fetch_stock_tracked(symbol).await {
                Ok((record, called_upstream)) => {
                    outcome.records.push(record);
                    called_upstream
                }
                Err(error) if error.is_fatal() => return Err(error),
                Err(error) => {
                    warn!(symbol = %symbol, %error, "skipping symbol");
                    outcome.failures.push(SymbolFailure {
                        symbol: symbol.clone(),
                        error,
                    });
                    false
                }
            };

            let is_last = index + 1 == symbols.len();
            if called_upstream && !is_last && !self.config.symbol_delay.is_zero() {
                tokio::time::sleep(self.config.symbol_delay).await;
            }
        }

        info!(
            fetched = outcome.records.len(),
            failed = outcome.failures.len(),
            "batch fetch finished"
        );
        Ok(outcome)
    }
}
