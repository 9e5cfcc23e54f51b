//! Runtime configuration, resolved from the environment with builder overrides.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::api::DEFAULT_BASE_URL;
use crate::retry::RetryConfig;
use crate::schedule::RefreshSchedule;
use crate::{FetchError, Interval, ValidationError};

pub const API_KEY_ENV: &str = "TRACKITON_ALPHAVANTAGE_API_KEY";
pub const FALLBACK_API_KEY_ENV: &str = "ALPHA_VANTAGE_API_KEY";
pub const BASE_URL_ENV: &str = "TRACKITON_BASE_URL";
pub const HOME_ENV: &str = "TRACKITON_HOME";

/// Symbols tracked when none are configured, one per industry.
pub const DEFAULT_SYMBOLS: [&str; 5] = ["AAPL", "JPM", "JNJ", "WMT", "XOM"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub interval: Interval,
    pub symbols: Vec<String>,
    pub retry: RetryConfig,
    /// Pause after each fetched symbol to stay under the per-minute quota.
    pub symbol_delay: Duration,
    /// TTL of the in-memory per-symbol cache; zero disables it.
    pub cache_ttl: Duration,
    pub request_timeout_ms: u64,
    /// Issue an extra `OVERVIEW` call per symbol to resolve its company name.
    pub resolve_names: bool,
    /// Daily UTC trigger times after which stored data is stale.
    pub schedule: RefreshSchedule,
    pub home: PathBuf,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_owned(),
            interval: Interval::default(),
            symbols: DEFAULT_SYMBOLS.iter().map(|s| (*s).to_owned()).collect(),
            retry: RetryConfig::default(),
            symbol_delay: Duration::from_secs(2),
            cache_ttl: Duration::from_secs(30),
            request_timeout_ms: 10_000,
            resolve_names: false,
            schedule: RefreshSchedule::default(),
            home: PathBuf::from(".trackiton"),
        }
    }
}

impl TrackerConfig {
    /// Defaults overlaid with `TRACKITON_*` environment variables.
    pub fn from_env() -> Self {
        let api_key = non_blank_var(API_KEY_ENV).or_else(|| non_blank_var(FALLBACK_API_KEY_ENV));
        let base_url = non_blank_var(BASE_URL_ENV).unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());

        Self {
            api_key,
            base_url,
            home: resolve_home(),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_symbols<I, T>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.symbols = symbols.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_symbol_delay(mut self, symbol_delay: Duration) -> Self {
        self.symbol_delay = symbol_delay;
        self
    }

    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    pub fn with_resolve_names(mut self, resolve_names: bool) -> Self {
        self.resolve_names = resolve_names;
        self
    }

    pub fn with_schedule(mut self, schedule: RefreshSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = home.into();
        self
    }

    /// The configured API key, or [`FetchError::ConfigMissing`] when absent or blank.
    pub fn require_api_key(&self) -> Result<&str, FetchError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(FetchError::ConfigMissing)
    }

    /// Directory backing the file key/value store.
    pub fn storage_dir(&self) -> PathBuf {
        self.home.join("storage")
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.symbols.is_empty() {
            return Err(ValidationError::EmptySymbolList);
        }
        if self.symbols.iter().any(|symbol| symbol.trim().is_empty()) {
            return Err(ValidationError::EmptySymbol);
        }
        self.retry.validate()
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn resolve_home() -> PathBuf {
    if let Some(path) = env::var_os(HOME_ENV) {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".trackiton");
    }

    PathBuf::from(".trackiton")
}
