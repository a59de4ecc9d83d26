//! Configuration types for plugin-crawler

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// WordPress.org plugin directory info endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.wordpress.org/plugins/info/1.2/";

/// Remote catalog settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Listing endpoint; `action` and `request[page]` are appended as query parameters
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Entries per page (None = let the server decide)
    #[serde(default)]
    pub per_page: Option<u32>,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// TCP connect timeout (default: 30 seconds)
    #[serde(default = "default_connect_timeout", with = "duration_serde")]
    pub connect_timeout: Duration,

    /// Whole-request timeout, body included (None = no limit)
    #[serde(default, with = "optional_duration_serde")]
    pub request_timeout: Option<Duration>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            per_page: None,
            user_agent: default_user_agent(),
            connect_timeout: default_connect_timeout(),
            request_timeout: None,
        }
    }
}

/// Artifact download settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Directory the `{slug}-{version}.zip` files are written to (default: ".")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Pause after every successful artifact download (default: 1 second)
    #[serde(default = "default_download_delay", with = "duration_serde")]
    pub download_delay: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            download_delay: default_download_delay(),
        }
    }
}

/// Retry behavior for page-level network failures
///
/// The default is a fixed five second pause with no attempt limit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retries per page (None = retry indefinitely)
    #[serde(default)]
    pub max_attempts: Option<u32>,

    /// Delay before the first retry (default: 5 seconds)
    #[serde(default = "default_retry_delay", with = "duration_serde")]
    pub delay: Duration,

    /// Upper bound for the delay when a backoff multiplier is used (default: 5 seconds)
    #[serde(default = "default_retry_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier applied to the delay after every retry (default: 1.0, fixed delay)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: false)
    #[serde(default)]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: None,
            delay: default_retry_delay(),
            max_delay: default_retry_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: false,
        }
    }
}

impl RetryConfig {
    /// Whether another retry may follow once `retries_done` retries have been spent
    pub fn permits_retry(&self, retries_done: u32) -> bool {
        self.max_attempts.is_none_or(|max| retries_done < max)
    }
}

/// Active-install range filter
///
/// Both bounds are inclusive. With neither bound set every entry is downloaded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Skip entries with fewer active installs than this
    #[serde(default)]
    pub min_active_installs: Option<u64>,

    /// Skip entries with more active installs than this
    #[serde(default)]
    pub max_active_installs: Option<u64>,
}

impl FilterConfig {
    /// Whether an entry with the given install count should be downloaded
    ///
    /// A missing count is treated as zero installs.
    pub fn accepts(&self, active_installs: Option<u64>) -> bool {
        let installs = active_installs.unwrap_or(0);
        self.min_active_installs.is_none_or(|min| installs >= min)
            && self.max_active_installs.is_none_or(|max| installs <= max)
    }
}

/// Main configuration for [`PluginCrawler`](crate::PluginCrawler)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Catalog endpoint and HTTP client settings
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Download directory and pacing
    #[serde(default)]
    pub download: DownloadConfig,

    /// Page retry policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// Active-install filter
    #[serde(default)]
    pub filter: FilterConfig,
}

impl Config {
    /// Check the configuration for values that can never work
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.catalog.base_url).map_err(|e| {
            Error::config(
                "catalog.base_url",
                format!("invalid URL '{}': {}", self.catalog.base_url, e),
            )
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(
                "catalog.base_url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        if self.catalog.per_page == Some(0) {
            return Err(Error::config(
                "catalog.per_page",
                "per_page must be at least 1",
            ));
        }

        if let (Some(min), Some(max)) = (
            self.filter.min_active_installs,
            self.filter.max_active_installs,
        ) && min > max
        {
            return Err(Error::config(
                "filter",
                format!("min_active_installs ({min}) exceeds max_active_installs ({max})"),
            ));
        }

        if !self.retry.backoff_multiplier.is_finite() || self.retry.backoff_multiplier < 1.0 {
            return Err(Error::config(
                "retry.backoff_multiplier",
                "backoff_multiplier must be a finite value of at least 1.0",
            ));
        }

        Ok(())
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_download_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_download_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_retry_delay() -> Duration {
    Duration::from_secs(5)
}

fn default_backoff_multiplier() -> f64 {
    1.0
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_behavior() {
        let config = Config::default();

        assert_eq!(config.catalog.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.catalog.per_page, None);
        assert!(config.catalog.user_agent.starts_with("plugin-crawler/"));
        assert_eq!(config.download.download_dir, PathBuf::from("."));
        assert_eq!(config.download.download_delay, Duration::from_secs(1));
        assert_eq!(config.retry.max_attempts, None, "retries must be unbounded");
        assert_eq!(config.retry.delay, Duration::from_secs(5));
        assert_eq!(config.retry.backoff_multiplier, 1.0);
        assert!(!config.retry.jitter);
        assert_eq!(config.filter, FilterConfig::default());
        config.validate().unwrap();
    }

    #[test]
    fn empty_json_deserializes_to_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.catalog.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.retry.delay, Duration::from_secs(5));
        assert_eq!(config.catalog.request_timeout, None);
    }

    #[test]
    fn durations_serialize_as_whole_seconds() {
        let config = Config {
            download: DownloadConfig {
                download_delay: Duration::from_secs(2),
                ..Default::default()
            },
            catalog: CatalogConfig {
                request_timeout: Some(Duration::from_secs(90)),
                ..Default::default()
            },
            ..Default::default()
        };

        let json = serde_json::to_value(&config).expect("serialize failed");

        assert_eq!(json["download"]["download_delay"], 2);
        assert_eq!(json["retry"]["delay"], 5);
        assert_eq!(json["catalog"]["request_timeout"], 90);
        assert_eq!(json["catalog"]["connect_timeout"], 30);
    }

    #[test]
    fn filter_without_bounds_accepts_everything() {
        let filter = FilterConfig::default();
        assert!(filter.accepts(None));
        assert!(filter.accepts(Some(0)));
        assert!(filter.accepts(Some(u64::MAX)));
    }

    #[test]
    fn filter_bounds_are_inclusive() {
        let filter = FilterConfig {
            min_active_installs: Some(1_000),
            max_active_installs: Some(100_000),
        };
        assert!(!filter.accepts(Some(999)));
        assert!(filter.accepts(Some(1_000)));
        assert!(filter.accepts(Some(100_000)));
        assert!(!filter.accepts(Some(100_001)));
    }

    #[test]
    fn filter_treats_missing_count_as_zero() {
        let filter = FilterConfig {
            min_active_installs: Some(1),
            max_active_installs: None,
        };
        assert!(!filter.accepts(None));
    }

    #[test]
    fn validate_rejects_unparseable_base_url() {
        let mut config = Config::default();
        config.catalog.base_url = "not a url".to_string();
        match config.validate().unwrap_err() {
            Error::Config { key, .. } => assert_eq!(key.as_deref(), Some("catalog.base_url")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_non_http_scheme() {
        let mut config = Config::default();
        config.catalog.base_url = "ftp://example.com/plugins".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_per_page() {
        let mut config = Config::default();
        config.catalog.per_page = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_filter() {
        let mut config = Config::default();
        config.filter = FilterConfig {
            min_active_installs: Some(10),
            max_active_installs: Some(5),
        };
        match config.validate().unwrap_err() {
            Error::Config { key, message } => {
                assert_eq!(key.as_deref(), Some("filter"));
                assert!(message.contains("exceeds"));
            }
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_shrinking_backoff() {
        let mut config = Config::default();
        config.retry.backoff_multiplier = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn retry_budget_is_unlimited_unless_capped() {
        let unbounded = RetryConfig::default();
        assert!(unbounded.permits_retry(0));
        assert!(unbounded.permits_retry(u32::MAX));

        let capped = RetryConfig {
            max_attempts: Some(2),
            ..Default::default()
        };
        assert!(capped.permits_retry(0));
        assert!(capped.permits_retry(1));
        assert!(!capped.permits_retry(2));
    }
}
