//! # plugin-crawler
//!
//! Sequential crawler for the WordPress.org plugin directory.
//!
//! The crawler requests listing pages one after another, starting at page 1,
//! and downloads every listed plugin archive as `{slug}-{version}.zip`. It
//! stops when a page comes back with no entries.
//!
//! Failures fall into two tiers:
//! - **retryable**: transport errors and error statuses on the listing or any
//!   download. The crawler waits and re-requests the same page from its first
//!   entry.
//! - **fatal**: everything else (malformed responses, filesystem errors). The
//!   run stops.
//!
//! ## Quick Start
//!
//! ```no_run
//! use plugin_crawler::{Config, CrawlEvent, PluginCrawler};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let crawler = PluginCrawler::new(Config::default()).await?;
//!
//!     let mut events = crawler.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             if let CrawlEvent::Downloading { slug, version, .. } = event {
//!                 println!("{slug} {version}");
//!             }
//!         }
//!     });
//!
//!     let stats = crawler.run().await?;
//!     println!("downloaded {} archives", stats.downloaded);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Catalog listing requests
pub mod catalog;
/// Configuration types
pub mod config;
/// Catalog walker
pub mod crawler;
/// Error types
pub mod error;
/// Artifact downloads
pub mod fetcher;
/// Retry logic for transient failures
pub mod retry;
/// Core types and events
pub mod types;
/// Artifact file naming
pub mod utils;

// Re-export commonly used types
pub use catalog::CatalogClient;
pub use config::{CatalogConfig, Config, DownloadConfig, FilterConfig, RetryConfig};
pub use crawler::{PageOutcome, PluginCrawler};
pub use error::{Error, Failure, Result};
pub use fetcher::{ArtifactFetcher, FetchedArtifact};
pub use types::{CatalogInfo, CatalogPage, CrawlEvent, CrawlStats, PluginEntry};
