//! Retry policy with deterministic exponential backoff.

use std::time::Duration;

use crate::ValidationError;

/// Backoff strategy between fetch attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Doubles the delay after every attempt: `base * 2^attempt`, capped at `max`.
    Exponential {
        /// Delay after the first failed attempt.
        base: Duration,
        /// Upper bound for any single delay.
        max: Duration,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_secs(1),
            max: Duration::from_secs(60),
        }
    }
}

impl Backoff {
    /// Delay to wait after the failed attempt with 0-based index `attempt`.
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Exponential { base, max } => {
                let scale = 2_u32.checked_pow(attempt).unwrap_or(u32::MAX);
                base.checked_mul(scale).unwrap_or(max).min(max)
            }
        }
    }
}

/// Bounded retry configuration for a single upstream fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// The backoff strategy to use between attempts.
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::default(),
        }
    }
}

impl RetryConfig {
    /// Exponential backoff starting at `base_delay`.
    pub fn exponential(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Exponential {
                base: base_delay,
                max: Duration::from_secs(60).max(base_delay),
            },
        }
    }

    /// Single attempt, never sleeps.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_attempts == 0 {
            return Err(ValidationError::ZeroAttempts);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_backoff_doubles_without_jitter() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(100),
            max: Duration::from_secs(1),
        };

        assert_eq!(backoff.delay(0), Duration::from_millis(100));
        assert_eq!(backoff.delay(1), Duration::from_millis(200));
        assert_eq!(backoff.delay(2), Duration::from_millis(400));
        assert_eq!(backoff.delay(3), Duration::from_millis(800));
        assert_eq!(backoff.delay(4), Duration::from_secs(1)); // capped
    }

    #[test]
    fn test_exponential_backoff_saturates_on_huge_attempts() {
        let backoff = Backoff::Exponential {
            base: Duration::from_secs(1),
            max: Duration::from_secs(60),
        };

        assert_eq!(backoff.delay(64), Duration::from_secs(60));
    }

    #[test]
    fn test_default_retry_config() {
        let config = RetryConfig::default();

        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(2));
    }

    #[test]
    fn test_exponential_config_keeps_cap_above_base() {
        let config = RetryConfig::exponential(4, Duration::from_secs(90));

        assert_eq!(config.max_attempts, 4);
        assert_eq!(config.delay_for_attempt(0), Duration::from_secs(90));
        assert_eq!(config.delay_for_attempt(3), Duration::from_secs(90));
    }

    #[test]
    fn test_zero_attempts_is_invalid() {
        let config = RetryConfig::exponential(0, Duration::from_millis(10));
        assert_eq!(config.validate(), Err(ValidationError::ZeroAttempts));
        assert!(RetryConfig::no_retry().validate().is_ok());
    }
}
