//! Retry logic for transient failures
//!
//! The walker retries a whole page whenever a retryable error surfaces. The
//! default [`RetryConfig`] waits a fixed five seconds and never gives up; the
//! same driver also supports capped attempts, exponential backoff and jitter.
//!
//! # Example
//!
//! ```no_run
//! use plugin_crawler::retry::{IsRetryable, with_retry};
//! use plugin_crawler::config::RetryConfig;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     Transient,
//!     Permanent,
//! }
//!
//! impl std::fmt::Display for MyError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{:?}", self)
//!     }
//! }
//!
//! impl IsRetryable for MyError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, MyError::Transient)
//!     }
//! }
//!
//! # async fn example() -> Result<(), MyError> {
//! let config = RetryConfig::default();
//! with_retry(&config, || async {
//!     Ok::<_, MyError>(())
//! }).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::Error;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (timeouts, refused connections, error statuses) return `true`.
/// Permanent failures (malformed responses, disk errors, bad entries) return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            // A request that could not even be built (bad download_link) will never succeed
            Error::Network(e) => !e.is_builder(),
            // Any 4xx or 5xx status on the listing or a download
            Error::HttpStatus { .. } => true,
            // Local filesystem trouble is fatal
            Error::Io(_) => false,
            Error::Serialization(_) => false,
            Error::InvalidEntry(_) => false,
            Error::Config { .. } => false,
            Error::Other(_) => false,
        }
    }
}

/// Execute an async operation, retrying it while it fails with a retryable error
///
/// Retries continue until the operation succeeds, a non-retryable error occurs,
/// or `config.max_attempts` retries have been spent (never, when it is `None`).
/// Between attempts the driver sleeps for the current delay, which starts at
/// `config.delay` and is multiplied by `config.backoff_multiplier` after every
/// retry, capped at `config.max_delay`.
///
/// # Example
///
/// ```no_run
/// use plugin_crawler::retry::with_retry;
/// use plugin_crawler::config::RetryConfig;
/// use plugin_crawler::error::Error;
///
/// # async fn example() -> Result<(), Error> {
/// let config = RetryConfig::default();
/// let body = with_retry(&config, || async {
///     Ok::<String, Error>("page".to_string())
/// }).await?;
/// # Ok(())
/// # }
/// ```
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut attempt: u32 = 0;
    let mut delay = config.delay;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::info!(attempts = attempt + 1, "operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e)
                if e.is_retryable() && config.permits_retry(attempt) =>
            {
                attempt = attempt.saturating_add(1);

                let wait = if config.jitter {
                    add_jitter(delay)
                } else {
                    delay
                };

                tracing::warn!(
                    error = %e,
                    attempt,
                    max_attempts = ?config.max_attempts,
                    delay_ms = wait.as_millis() as u64,
                    "operation failed, retrying"
                );

                tokio::time::sleep(wait).await;

                let next_delay =
                    Duration::from_secs_f64(delay.as_secs_f64() * config.backoff_multiplier);
                delay = next_delay.min(config.max_delay);
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::error!(
                        error = %e,
                        attempts = attempt + 1,
                        "operation failed after all retry attempts exhausted"
                    );
                } else {
                    tracing::error!(error = %e, "operation failed with non-retryable error");
                }
                return Err(e);
            }
        }
    }
}

/// Add random jitter to a delay
///
/// The result lies between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor))
}
