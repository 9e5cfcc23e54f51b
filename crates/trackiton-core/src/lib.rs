//! # Trackiton Core
//!
//! Data refresh, caching and persistence for the trackiton stock dashboard.
//!
//! ## Overview
//!
//! On load, the stored ledger is served while the twice-daily schedule says it
//! is current. Otherwise every configured symbol is fetched in turn with
//! bounded exponential backoff, normalized into a [`StockRecord`], and the
//! successful records are written back as one [`FetchLedger`].
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Upstream request URLs and key redaction |
//! | [`cache`] | In-memory per-symbol TTL cache |
//! | [`clock`] | Injected wall clock |
//! | [`config`] | Runtime configuration |
//! | [`dashboard`] | Load/refresh coordination with a single-flight gate |
//! | [`domain`] | Domain models (QuotePoint, StockRecord, FetchLedger) |
//! | [`error`] | Core error types |
//! | [`fetcher`] | HTTP GET with retry and exponential backoff |
//! | [`http_client`] | HTTP client abstraction |
//! | [`normalize`] | Raw payload to [`StockRecord`] |
//! | [`rate_limit`] | Rate-limit and premium-tier detection |
//! | [`retry`] | Retry and backoff policy |
//! | [`schedule`] | Twice-daily refresh schedule |
//! | [`selection`] | Comparison chart selection |
//! | [`service`] | Per-symbol and batch fetching |
//! | [`store`] | Key/value persistence of the ledger |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use trackiton_core::{Dashboard, FileStore, ReqwestHttpClient, StockService, SystemClock, TrackerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TrackerConfig::from_env();
//!     let store = FileStore::new(config.storage_dir());
//!     let clock = Arc::new(SystemClock);
//!     let service = StockService::new(config, Arc::new(ReqwestHttpClient::new()), clock.clone());
//!
//!     let state = Dashboard::new(service, store, clock).load().await?;
//!     for record in &state.records {
//!         println!("{} {:.2} ({:+.2}%)", record.symbol(), record.price(), record.change_percent());
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod http_client;
pub mod normalize;
pub mod rate_limit;
pub mod retry;
pub mod schedule;
pub mod selection;
pub mod service;
pub mod store;

pub use api::{ApiFunction, ApiRequest};
pub use cache::QuoteCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::TrackerConfig;
pub use dashboard::{Dashboard, DashboardState, DataSource, ScheduleStatus};
pub use domain::{parse_series_timestamp, FetchLedger, Interval, QuotePoint, StockRecord, UtcDateTime};
pub use error::{FetchError, FetchErrorKind, StoreError, ValidationError};
pub use fetcher::BackoffFetcher;
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, RecordedCall, ReqwestHttpClient,
    ScriptedHttpClient,
};
pub use normalize::{company_name, normalize, normalize_with_interval};
pub use rate_limit::is_limited;
pub use retry::{Backoff, RetryConfig};
pub use schedule::RefreshSchedule;
pub use selection::Selection;
pub use service::{BatchOutcome, StockService, SymbolFailure};
pub use store::{FileStore, KeyValueStore, LedgerStore, MemoryStore};
