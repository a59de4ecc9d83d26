//! Error types for plugin-crawler
//!
//! Every fallible operation returns [`Error`]. The walker sorts errors into the
//! two tiers it acts on with [`Failure`]: retryable network trouble that
//! restarts the current page, and fatal errors that end the run.

use crate::retry::IsRetryable;
use thiserror::Error;

/// Result type alias for plugin-crawler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for plugin-crawler
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "catalog.base_url")
        key: Option<String>,
    },

    /// Transport-level failure (connect, timeout, reading the body)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a 4xx or 5xx status
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// Status code returned by the server
        status: reqwest::StatusCode,
        /// Requested URL
        url: String,
    },

    /// I/O error (writing artifacts, creating the download directory)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog response was not the expected JSON shape
    #[error("malformed catalog response: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A catalog entry cannot be turned into a safe artifact file name
    #[error("invalid catalog entry: {0}")]
    InvalidEntry(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a [`Error::Config`] tied to a specific key
    pub(crate) fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }
}

/// Classified failure inspected by the walker loop
///
/// `Retryable` pauses and re-requests the same page from its first entry.
/// `Fatal` stops the whole run.
#[derive(Debug, Error)]
pub enum Failure {
    /// Transient network failure on the listing or a download
    #[error("{0}")]
    Retryable(#[source] Error),

    /// Anything else: malformed responses, filesystem failures, bad entries
    #[error("{0}")]
    Fatal(#[source] Error),
}

impl Failure {
    /// Consume the failure and return the underlying error
    pub fn into_error(self) -> Error {
        match self {
            Failure::Retryable(e) | Failure::Fatal(e) => e,
        }
    }
}

impl From<Error> for Failure {
    fn from(error: Error) -> Self {
        if error.is_retryable() {
            Failure::Retryable(error)
        } else {
            Failure::Fatal(error)
        }
    }
}

impl IsRetryable for Failure {
    fn is_retryable(&self) -> bool {
        matches!(self, Failure::Retryable(_))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_is_classified_retryable() {
        let failure = Failure::from(Error::HttpStatus {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            url: "https://example.com/a.zip".to_string(),
        });
        assert!(matches!(failure, Failure::Retryable(_)));
    }

    #[test]
    fn malformed_json_is_classified_fatal() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let failure = Failure::from(Error::from(err));
        assert!(matches!(failure, Failure::Fatal(Error::Serialization(_))));
    }

    #[test]
    fn filesystem_error_is_classified_fatal() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let failure = Failure::from(Error::from(io));
        assert!(
            !failure.is_retryable(),
            "local write failures must stop the run"
        );
    }

    #[test]
    fn failure_display_forwards_inner_message() {
        let failure = Failure::Fatal(Error::InvalidEntry("slug contains '/'".to_string()));
        assert_eq!(
            failure.to_string(),
            "invalid catalog entry: slug contains '/'"
        );
        assert!(matches!(failure.into_error(), Error::InvalidEntry(_)));
    }

    #[test]
    fn config_helper_records_key() {
        match Error::config("filter", "min above max") {
            Error::Config { message, key } => {
                assert_eq!(message, "min above max");
                assert_eq!(key.as_deref(), Some("filter"));
            }
            other => panic!("expected Config error, got {other:?}"),
        }
    }
}
