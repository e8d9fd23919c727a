//! Retry logic for transient collaborator failures
//!
//! A single analysis call may retry at the transport level (network blips,
//! 5xx, rate-limit pushback); a phase that still fails after that is recorded
//! as an absent signal and never retried at the pipeline level.

use crate::types::ServiceError;
use std::time::Duration;

/// Retry an operation with exponential backoff on transient errors.
///
/// Non-transient errors return immediately. The final transient error is
/// returned once `max_attempts` is exhausted.
///
/// # Arguments
/// * `operation_name` - Name for logging (e.g. "web search", "asset upload")
/// * `max_attempts` - Total attempts including the first
/// * `base_delay` - Delay before the second attempt; doubles each retry
/// * `operation` - Async closure performing the call
pub async fn retry_transient<F, Fut, T>(
    operation_name: &str,
    max_attempts: u32,
    base_delay: Duration,
    mut operation: F,
) -> Result<T, ServiceError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, ServiceError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut delay = base_delay;

    for attempt in 1..=max_attempts {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::debug!(
                        operation = operation_name,
                        attempt,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(err) if err.is_transient() && attempt < max_attempts => {
                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    max_attempts,
                    error = %err,
                    backoff_ms = delay.as_millis() as u64,
                    "Transient failure, backing off"
                );
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
            }
            Err(err) => {
                if attempt > 1 {
                    tracing::error!(
                        operation = operation_name,
                        attempt,
                        error = %err,
                        "Operation failed after retries"
                    );
                }
                return Err(err);
            }
        }
    }

    // 1..=max_attempts always returns from inside the loop
    unreachable!("retry loop exited without returning")
}
