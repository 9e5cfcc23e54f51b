use thiserror::Error;
use trackiton_core::{FetchError, StoreError, ValidationError};

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Fetch(FetchError::ConfigMissing) => 2,
            Self::Fetch(_) => 3,
            Self::Store(_) => 4,
            Self::Serialization(_) => 4,
        }
    }

    /// Message for stderr; fetch errors use their dashboard wording.
    pub fn user_message(&self) -> String {
        match self {
            Self::Fetch(error) => error.user_message(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_a_configuration_failure() {
        assert_eq!(CliError::Fetch(FetchError::ConfigMissing).exit_code(), 2);
        assert_eq!(CliError::Fetch(FetchError::RateLimited { attempts: 3 }).exit_code(), 3);
    }

    #[test]
    fn store_failures_have_their_own_code() {
        let corrupt = StoreError::Corrupt {
            key: String::from("stockData"),
            reason: String::from("eof"),
        };
        assert_eq!(CliError::Store(corrupt).exit_code(), 4);
        assert_eq!(CliError::Validation(ValidationError::EmptySymbolList).exit_code(), 2);
    }
}
