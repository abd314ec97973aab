//! Retry policy for transient HTTP failures

use crate::config::HttpConfig;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub backoff_factor: Duration,
    pub retry_statuses: Vec<u16>,
}

pub trait BackoffPolicy {
    fn delay_for_attempt(&self, attempt: u32) -> Duration;
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&HttpConfig::default())
    }
}

impl From<&HttpConfig> for RetryPolicy {
    fn from(http: &HttpConfig) -> Self {
        Self {
            max_retries: http.retries,
            backoff_factor: Duration::from_millis(http.backoff_factor_ms),
            retry_statuses: http.retry_statuses.clone(),
        }
    }
}

impl RetryPolicy {
    #[inline]
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }
}

impl BackoffPolicy for RetryPolicy {
    /// `factor * 2^(attempt-1)` for 1-based `attempt`
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        self.backoff_factor.saturating_mul(1u32 << exp)
    }
}
