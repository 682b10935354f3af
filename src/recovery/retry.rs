//! Retry policy with exponential backoff
//!
//! Bounded retry strategy:
//! - Attempts: `max_attempts` in total, the first included
//! - Delay: base · 2^(attempt − 1), capped at `max_delay_ms`
//! - Jitter: optional ±25% random variation
//! - Only transient errors are retried; everything else returns at once

use crate::config::RecoveryConfig;
use crate::errors::Result;
use crate::recovery::ErrorRecovery;
use async_trait::async_trait;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry-with-backoff recovery policy
#[derive(Debug, Default)]
pub struct RetryRecovery {
    config: RecoveryConfig,
    /// Retries performed across all operations
    retries: AtomicUsize,
}

impl RetryRecovery {
    pub fn new(config: RecoveryConfig) -> Self {
        Self {
            config,
            retries: AtomicUsize::new(0),
        }
    }

    /// Delay before retry number `retry` (1-based)
    fn calculate_delay(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(31);
        let exponential = self
            .config
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(exponent));
        let delay_ms = exponential.min(self.config.max_delay_ms);

        let final_delay = if self.config.jitter {
            let jitter = (delay_ms / 4) as f64;
            let random_jitter = (rand::random::<f64>() * 2.0 - 1.0) * jitter;
            (delay_ms as f64 + random_jitter).max(0.0) as u64
        } else {
            delay_ms
        };

        Duration::from_millis(final_delay)
    }

    /// Upper bound on total sleep time across one operation, ignoring jitter
    pub fn max_total_wait_time(&self) -> Duration {
        let total_ms = (1..self.config.max_attempts.max(1))
            .map(|retry| {
                let exponent = (retry - 1).min(31);
                self.config
                    .base_delay_ms
                    .saturating_mul(2u64.saturating_pow(exponent))
                    .min(self.config.max_delay_ms)
            })
            .sum();
        Duration::from_millis(total_ms)
    }

    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts
    }

    /// Retries performed so far
    pub fn retry_count(&self) -> usize {
        self.retries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ErrorRecovery for RetryRecovery {
    async fn execute<T, F, Fut>(&self, service_name: &str, mut operation: F) -> Result<T>
    where
        T: Send,
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) if attempt >= max_attempts => {
                    warn!(
                        service = service_name,
                        attempts = attempt,
                        error = %err,
                        "retries exhausted"
                    );
                    return Err(err);
                }
                Err(err) => {
                    let delay = self.calculate_delay(attempt);
                    debug!(
                        service = service_name,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying transient failure"
                    );
                    self.retries.fetch_add(1, Ordering::SeqCst);
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
