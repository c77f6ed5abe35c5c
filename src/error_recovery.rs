// src/error_recovery.rs
//! Retry with exponential backoff for upload and API operations.

use crate::error::AppError;
use std::time::Duration;

/// Retries an async operation with exponential backoff.
///
/// The operation runs at most `max_attempts` times. After each failure except
/// the last, the task sleeps for the current delay, which starts at
/// `initial_delay` and doubles up to `max_delay`.
pub async fn retry_with_backoff<F, T, Fut>(
    operation: F,
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, AppError>>,
{
    retry_with_backoff_when(operation, max_attempts, initial_delay, max_delay, |_| true).await
}

/// Like [`retry_with_backoff`], but gives up at the first error for which
/// `should_retry` returns false.
pub async fn retry_with_backoff_when<F, T, Fut, P>(
    mut operation: F,
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
    should_retry: P,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, AppError>>,
    P: Fn(&AppError) -> bool,
{
    let mut delay = initial_delay;
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if !should_retry(&e) => {
                log::warn!("Attempt {}/{} failed permanently: {}", attempt, max_attempts, e);
                return Err(e);
            }
            Err(e) => {
                if attempt < max_attempts {
                    log::warn!(
                        "Attempt {}/{} failed ({}), retrying after {:?}",
                        attempt,
                        max_attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;

                    // Exponential backoff with cap
                    delay = std::cmp::min(delay * 2, max_delay);
                }
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| AppError::InternalError {
        message: "Retry failed with no error".to_string(),
        source: None,
    }))
}

/// Retries with the upload policy: 3 attempts, 1 second base delay, and only
/// for transient failures.
pub async fn retry_upload<F, T, Fut>(operation: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, AppError>>,
{
    use crate::constants::{UPLOAD_MAX_ATTEMPTS, UPLOAD_RETRY_BASE_DELAY, UPLOAD_RETRY_MAX_DELAY};
    retry_with_backoff_when(
        operation,
        UPLOAD_MAX_ATTEMPTS,
        UPLOAD_RETRY_BASE_DELAY,
        UPLOAD_RETRY_MAX_DELAY,
        AppError::is_retryable,
    )
    .await
}
