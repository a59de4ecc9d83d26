//! Core types for plugin-crawler

use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// One plugin's listing record
///
/// Only `slug`, `version` and `download_link` are required; every other field
/// the directory returns is ignored unless listed here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginEntry {
    /// Unique plugin identifier
    pub slug: String,

    /// Current version string
    pub version: String,

    /// Direct URL of the packaged archive
    pub download_link: String,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Reported active installations (used by the install filter)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_installs: Option<u64>,
}

/// Pagination metadata returned next to the entries
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogInfo {
    /// Page number the server answered for
    #[serde(default)]
    pub page: Option<u64>,

    /// Total number of pages the server reports
    #[serde(default)]
    pub pages: Option<u64>,

    /// Total number of plugins the server reports
    #[serde(default)]
    pub results: Option<u64>,
}

/// One page of the catalog listing
///
/// An empty (or missing, or null) `plugins` list marks the end of the catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPage {
    /// Entries in server order
    #[serde(default, deserialize_with = "null_as_empty")]
    pub plugins: Vec<PluginEntry>,

    /// Pagination metadata, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<CatalogInfo>,
}

impl CatalogPage {
    /// True when this page signals the end of the catalog
    pub fn is_exhausted(&self) -> bool {
        self.plugins.is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<PluginEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<PluginEntry>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Counters for one crawl run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlStats {
    /// Pages whose entries were all handled
    pub pages: u64,

    /// Artifacts written to disk (re-downloads after a page retry count again)
    pub downloaded: u64,

    /// Entries skipped by the install filter
    pub skipped: u64,

    /// Total bytes written
    pub bytes: u64,

    /// Page retries performed after a retryable error
    pub retries: u64,
}

/// Event emitted while walking the catalog
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CrawlEvent {
    /// A catalog page was parsed
    PageFetched {
        /// Page number
        page: u64,
        /// Number of entries on the page
        entries: usize,
    },

    /// An artifact download is starting
    Downloading {
        /// Page the entry came from
        page: u64,
        /// Plugin slug
        slug: String,
        /// Plugin version
        version: String,
        /// Source URL
        url: String,
    },

    /// An artifact was written
    Downloaded {
        /// Plugin slug
        slug: String,
        /// Plugin version
        version: String,
        /// File that was written
        path: PathBuf,
        /// Size in bytes
        bytes: u64,
    },

    /// An entry was left out by the install filter
    Skipped {
        /// Plugin slug
        slug: String,
        /// Reported active installs
        active_installs: Option<u64>,
    },

    /// A retryable error interrupted a page; it will be requested again
    PageFailed {
        /// Page number being retried
        page: u64,
        /// Error message
        error: String,
    },

    /// A fatal error ended the run
    Aborted {
        /// Page being processed when the run stopped
        page: u64,
        /// Error message
        error: String,
    },

    /// The catalog was exhausted
    Finished {
        /// Final counters
        stats: CrawlStats,
    },
}

impl CrawlEvent {
    /// The line printed for this event on the console, if any
    ///
    /// Only download starts and errors are shown; everything else is left to
    /// the log.
    pub fn progress_line(&self) -> Option<String> {
        match self {
            CrawlEvent::Downloading {
                slug, version, url, ..
            } => Some(format!("Downloading {slug} version {version} from {url}")),
            CrawlEvent::PageFailed { error, .. } => Some(format!("An error occurred: {error}")),
            CrawlEvent::Aborted { error, .. } => {
                Some(format!("An unexpected error occurred: {error}"))
            }
            _ => None,
        }
    }
}
