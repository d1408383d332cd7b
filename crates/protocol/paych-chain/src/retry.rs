//! Exponential backoff with jitter.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::WaitConfig;
use crate::error::{ChainError, ChainResult};

/// Backoff schedule for polling and retrying chain calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt)
    max_attempts: u32,
    /// Delay before the first retry
    base_delay: Duration,
    /// Upper bound on any single delay
    max_delay: Duration,
}

impl RetryPolicy {
    /// Create a new retry policy.
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// Polling schedule from a wait config.
    pub fn from_wait_config(config: &WaitConfig) -> Self {
        Self::new(config.lookup_attempts, config.poll_base, config.poll_max)
    }

    /// Delay before attempt `attempt` (0-indexed).
    ///
    /// `base_delay * 2^(attempt-1)`, capped at `max_delay`, then +-25% jitter.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let multiplier = 2u32.checked_pow(attempt - 1).unwrap_or(u32::MAX);
        let capped = std::cmp::min(self.base_delay.saturating_mul(multiplier), self.max_delay);

        let capped_ms = capped.as_millis() as u64;
        let jitter_range = capped_ms / 4;
        if jitter_range == 0 {
            return capped;
        }
        let jitter = rand::random::<u64>() % (jitter_range * 2);
        Duration::from_millis(
            capped_ms
                .saturating_sub(jitter_range)
                .saturating_add(jitter),
        )
    }

    /// Run `operation`, retrying retryable errors up to `max_attempts` times.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> ChainResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ChainResult<T>>,
    {
        let mut attempt = 0;
        loop {
            let delay = self.delay_for_attempt(attempt);
            if !delay.is_zero() {
                debug!(attempt, ?delay, "Retrying after delay");
                sleep(delay).await;
            }

            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt + 1 < self.max_attempts => {
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Retryable chain error, will retry"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_wait_config(&WaitConfig::default())
    }
}
