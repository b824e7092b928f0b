use crate::engine::ExecutionConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delay inserted before each retry attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Backoff {
    /// Retry immediately
    None,

    /// Same delay before every retry
    Fixed { delay_ms: u64 },

    /// Doubling delay starting at `base_ms`, capped at `max_ms`
    Exponential { base_ms: u64, max_ms: u64 },
}

impl Backoff {
    /// Delay before retry number `retry` (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        match self {
            Backoff::None => Duration::ZERO,
            Backoff::Fixed { delay_ms } => Duration::from_millis(*delay_ms),
            Backoff::Exponential { base_ms, max_ms } => {
                let shift = retry.saturating_sub(1).min(32);
                let delay = base_ms.saturating_mul(1u64 << shift);
                Duration::from_millis(delay.min(*max_ms))
            }
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::None
    }
}

/// Per-frame, per-stage retry policy.
///
/// A frame that fails at a stage is resubmitted to that same stage up to
/// `max_retries` more times before it is dropped. Other frames of the batch
/// and other stages are unaffected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Single attempt, no retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Backoff::None,
        }
    }

    pub fn from_config(config: &ExecutionConfig) -> Self {
        if !config.retry_on_error {
            return Self::none();
        }
        Self {
            max_retries: config.max_retries,
            backoff: config.retry_backoff.clone(),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_backoff_caps() {
        let backoff = Backoff::Exponential {
            base_ms: 10,
            max_ms: 50,
        };
        assert_eq!(backoff.delay_for(1), Duration::from_millis(10));
        assert_eq!(backoff.delay_for(2), Duration::from_millis(20));
        assert_eq!(backoff.delay_for(3), Duration::from_millis(40));
        assert_eq!(backoff.delay_for(4), Duration::from_millis(50));
        assert_eq!(backoff.delay_for(60), Duration::from_millis(50));
    }

    #[test]
    fn test_policy_disabled_without_retry_flag() {
        let config = ExecutionConfig {
            max_retries: 5,
            ..ExecutionConfig::default()
        };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.max_retries, 0);
        assert_eq!(policy.max_attempts(), 1);
    }

    #[test]
    fn test_policy_from_config() {
        let config = ExecutionConfig::default()
            .with_retries(2)
            .with_retry_backoff(Backoff::Fixed { delay_ms: 5 });
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.backoff.delay_for(1), Duration::from_millis(5));
    }
}
