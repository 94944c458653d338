use std::time::Duration;
use std::future::Future;

use serde::{Deserialize, Serialize};
use super::classification::ErrorClassification;
use super::types::RemediatorError;
use tracing::warn;

impl ErrorClassification {
    /// Calculate the retry delay for this error classification based on the
    /// current attempt number (0-indexed).
    ///
    /// - RateLimitError: base * 2^(attempt + 1), no jitter, capped at max
    /// - Default: exponential backoff base * 2^attempt + random jitter (0-base), capped at max
    pub fn retry_delay(&self, attempt: u32, config: &RetryConfig) -> Duration {
        let base = config.base_delay_ms as f64;
        let max = config.max_delay_ms as f64;
        // Any exponent past this is already far beyond max
        let exponent = attempt.min(62) as i32;
        let millis = match self.error_type {
            "RateLimitError" => base * 2.0_f64.powi(exponent + 1),
            _ => {
                let jitter: f64 = rand::random::<f64>() * base;
                base * 2.0_f64.powi(exponent) + jitter
            }
        };
        Duration::from_millis(millis.min(max) as u64)
    }
}

/// Retry configuration for remote calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryConfig {
    /// No waiting between attempts. Used by tests and dry runs against fakes.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 60_000,
        }
    }
}

/// Execute an async operation with retry logic.
///
/// Retries only if the error is classified as retryable and we haven't
/// exceeded max_retries.
pub async fn with_retry<F, Fut, T>(
    operation_name: &str,
    config: &RetryConfig,
    mut factory: F,
) -> Result<T, RemediatorError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RemediatorError>>,
{
    let max_attempts = config.max_retries.saturating_add(1);

    let mut last_error = None;

    for attempt in 0..max_attempts {
        match factory().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                let classification = e.classify();

                if !classification.retryable || attempt + 1 >= max_attempts {
                    if classification.retryable {
                        warn!(
                            operation = operation_name,
                            attempt = attempt + 1,
                            max = max_attempts,
                            "Max retries exhausted"
                        );
                    }
                    return Err(e);
                }

                let delay = classification.retry_delay(attempt, config);
                warn!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    max = max_attempts,
                    error_type = classification.error_type,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Retrying after error"
                );

                tokio::time::sleep(delay).await;
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| RemediatorError::Fatal("Retry loop exited unexpectedly".into())))
}
