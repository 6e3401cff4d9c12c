use super::errors::OllamaError;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::models::RetryConfig;

/// Retry policy for transient Ollama errors
///
/// Backoff doubles with each retry up to `max_backoff_ms`. Only errors for
/// which [`OllamaError::is_transient`] holds are retried.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts (0 disables retries)
    max_retries: u32,
    /// Initial backoff duration in milliseconds
    initial_backoff_ms: u64,
    /// Maximum backoff duration in milliseconds
    max_backoff_ms: u64,
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff_ms,
            max_backoff_ms,
        }
    }

    /// A policy that never retries.
    pub const fn none() -> Self {
        Self::new(0, 0, 0)
    }

    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Execute an operation with exponential backoff retry logic
    ///
    /// # Returns
    /// * `Ok(T)` - Operation succeeded
    /// * `Err(OllamaError)` - Permanent error, or last error after all retries
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, OllamaError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, OllamaError>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        debug!(retries = attempt, "request succeeded after retries");
                    }
                    return Ok(result);
                }
                Err(err) => {
                    if self.should_retry(&err, attempt) {
                        let backoff = self.calculate_backoff(attempt);
                        warn!(
                            attempt = attempt + 1,
                            error = %err,
                            backoff_ms = backoff.as_millis() as u64,
                            "transient error, retrying"
                        );

                        sleep(backoff).await;
                        attempt += 1;
                    } else {
                        if attempt >= self.max_retries && err.is_transient() {
                            warn!(attempts = attempt + 1, error = %err, "giving up after retries");
                        } else {
                            debug!(error = %err, "permanent error, not retrying");
                        }
                        return Err(err);
                    }
                }
            }
        }
    }

    /// Formula: min(initial_backoff * 2^attempt, max_backoff)
    fn calculate_backoff(&self, attempt: u32) -> Duration {
        let backoff_ms = self
            .initial_backoff_ms
            .saturating_mul(2_u64.saturating_pow(attempt))
            .min(self.max_backoff_ms);

        Duration::from_millis(backoff_ms)
    }

    fn should_retry(&self, error: &OllamaError, attempt: u32) -> bool {
        attempt < self.max_retries && error.is_transient()
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.max_retries,
            config.initial_backoff_ms,
            config.max_backoff_ms,
        )
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}
