use crate::config::Config;
use crate::gateway::GatewayError;
use std::future::Future;
use tokio::time::{sleep, Duration};

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self { max_retries, base_delay }
    }

    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_retries, config.retry_base_delay)
    }

    /// Backoff before retry number `attempt` (1-based): base, 2x base, 4x base...
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.saturating_sub(1).min(16))
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// policy's retries are used up. The last error is returned on exhaustion.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, operation: &str, mut op: F) -> Result<T, GatewayError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GatewayError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                attempt += 1;
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    "{} failed (attempt {}/{}): {}, retrying in {:?}",
                    operation,
                    attempt,
                    policy.max_retries + 1,
                    e,
                    delay
                );
                sleep(delay).await;
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::error!("{} failed after {} attempts: {}", operation, attempt + 1, e);
                }
                return Err(e);
            }
        }
    }
}
