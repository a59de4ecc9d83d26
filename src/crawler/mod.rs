//! Catalog walker: pages through the plugin directory and downloads every entry.

mod walk;


pub use walk::PageOutcome;

use crate::catalog::CatalogClient;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetcher::ArtifactFetcher;
use crate::types::CrawlEvent;

/// Capacity of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Sequential crawler over the plugin directory
///
/// One instance performs one walk at a time. Pages and their entries are
/// handled strictly in order; nothing runs concurrently.
pub struct PluginCrawler {
    /// Configuration the crawler was built with
    pub(crate) config: Config,
    /// Listing requests
    pub(crate) catalog: CatalogClient,
    /// Artifact downloads
    pub(crate) fetcher: ArtifactFetcher,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<CrawlEvent>,
}

impl PluginCrawler {
    /// Create a crawler
    ///
    /// Validates the configuration, builds the shared HTTP client and makes
    /// sure the download directory exists.
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        tokio::fs::create_dir_all(&config.download.download_dir)
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "failed to create download directory '{}': {}",
                        config.download.download_dir.display(),
                        e
                    ),
                ))
            })?;

        let mut builder = reqwest::Client::builder()
            .user_agent(config.catalog.user_agent.as_str())
            .connect_timeout(config.catalog.connect_timeout);
        if let Some(timeout) = config.catalog.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Other(format!("failed to create HTTP client: {}", e)))?;

        let catalog = CatalogClient::new(client.clone(), &config.catalog)?;
        let fetcher = ArtifactFetcher::new(client, config.download.download_dir.clone());

        let (event_tx, _rx) = tokio::sync::broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            config,
            catalog,
            fetcher,
            event_tx,
        })
    }

    /// Subscribe to crawl events
    ///
    /// Each receiver sees every event emitted after it subscribed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use plugin_crawler::{Config, CrawlEvent, PluginCrawler};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let crawler = PluginCrawler::new(Config::default()).await?;
    /// let mut events = crawler.subscribe();
    /// tokio::spawn(async move {
    ///     while let Ok(event) = events.recv().await {
    ///         if let CrawlEvent::Downloaded { path, .. } = event {
    ///             println!("wrote {}", path.display());
    ///         }
    ///     }
    /// });
    /// crawler.run().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<CrawlEvent> {
        self.event_tx.subscribe()
    }

    /// The configuration this crawler runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Emit an event to all subscribers
    ///
    /// send() fails only when nobody is subscribed, in which case the event is dropped.
    pub(crate) fn emit_event(&self, event: CrawlEvent) {
        self.event_tx.send(event).ok();
    }
}
