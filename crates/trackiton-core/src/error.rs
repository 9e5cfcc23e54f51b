use thiserror::Error;

/// Validation errors raised while building configuration and domain values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol list cannot be empty")]
    EmptySymbolList,
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
    #[error("refresh schedule must contain at least one trigger")]
    EmptySchedule,
    #[error("trigger time must be HH:MM in UTC: '{value}'")]
    InvalidTriggerTime { value: String },
    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
    #[error("invalid interval '{value}', expected one of 1min, 5min, 15min, 30min, 60min")]
    InvalidInterval { value: String },
}

/// Classification of fetch failures, used for exit codes and propagation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    ConfigMissing,
    RateLimited,
    NetworkFailure,
    NoDataAvailable,
    InvalidPayload,
}

/// Failures produced while fetching and normalizing upstream data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("API key is not configured; set TRACKITON_ALPHAVANTAGE_API_KEY")]
    ConfigMissing,

    #[error("API rate limit reached after {attempts} attempt(s)")]
    RateLimited { attempts: u32 },

    #[error("network failure after {attempts} attempt(s): {message}")]
    NetworkFailure { attempts: u32, message: String },

    #[error("no data available for {symbol}")]
    NoDataAvailable { symbol: String },

    #[error("invalid payload for {symbol}: {reason}")]
    InvalidPayload { symbol: String, reason: String },
}

impl FetchError {
    pub fn invalid_payload(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPayload {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }

    pub fn no_data(symbol: impl Into<String>) -> Self {
        Self::NoDataAvailable {
            symbol: symbol.into(),
        }
    }

    pub const fn kind(&self) -> FetchErrorKind {
        match self {
            Self::ConfigMissing => FetchErrorKind::ConfigMissing,
            Self::RateLimited { .. } => FetchErrorKind::RateLimited,
            Self::NetworkFailure { .. } => FetchErrorKind::NetworkFailure,
            Self::NoDataAvailable { .. } => FetchErrorKind::NoDataAvailable,
            Self::InvalidPayload { .. } => FetchErrorKind::InvalidPayload,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self.kind() {
            FetchErrorKind::ConfigMissing => "fetch.config_missing",
            FetchErrorKind::RateLimited => "fetch.rate_limited",
            FetchErrorKind::NetworkFailure => "fetch.network_failure",
            FetchErrorKind::NoDataAvailable => "fetch.no_data_available",
            FetchErrorKind::InvalidPayload => "fetch.invalid_payload",
        }
    }

    /// A failure that must abort a whole refresh cycle instead of skipping one symbol.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::ConfigMissing)
    }

    /// Message suitable for the dashboard's error state.
    pub fn user_message(&self) -> String {
        match self {
            Self::ConfigMissing => String::from(
                "API key is not configured. Set TRACKITON_ALPHAVANTAGE_API_KEY and try again.",
            ),
            Self::RateLimited { .. } => String::from(
                "API rate limit reached. Please try again in a few minutes or upgrade to a premium API key.",
            ),
            Self::NetworkFailure { .. } => String::from("Error fetching stock data."),
            Self::NoDataAvailable { symbol } => format!("No data available for {symbol}."),
            Self::InvalidPayload { symbol, .. } => {
                format!("Received malformed data for {symbol}.")
            }
        }
    }
}

/// Errors raised by the key/value persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("stored value under '{key}' is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_missing_config_is_fatal() {
        assert!(FetchError::ConfigMissing.is_fatal());
        assert!(!FetchError::RateLimited { attempts: 3 }.is_fatal());
        assert!(!FetchError::no_data("AAPL").is_fatal());
    }

    #[test]
    fn rate_limit_message_suggests_waiting_or_upgrading() {
        let message = FetchError::RateLimited { attempts: 3 }.user_message();
        assert!(message.contains("try again in a few minutes"));
        assert!(message.contains("premium"));
    }

    #[test]
    fn codes_follow_kind() {
        let error = FetchError::NetworkFailure {
            attempts: 2,
            message: String::from("connection reset"),
        };
        assert_eq!(error.kind(), FetchErrorKind::NetworkFailure);
        assert_eq!(error.code(), "fetch.network_failure");
    }
}
