//! The page loop and per-page processing.

use std::cell::Cell;

use crate::error::{Failure, Result};
use crate::retry::with_retry;
use crate::types::{CrawlEvent, CrawlStats};

use super::PluginCrawler;

/// Result of processing one catalog page
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page listed no entries; the catalog is done
    Exhausted,
    /// Every entry on the page was downloaded or skipped
    Completed {
        /// Number of entries the page listed
        entries: usize,
    },
}

/// Run counters, shared by reference with each page attempt
///
/// The walk runs on a single task, so plain cells are enough.
#[derive(Default)]
pub(super) struct Counters {
    pages: Cell<u64>,
    downloaded: Cell<u64>,
    skipped: Cell<u64>,
    bytes: Cell<u64>,
    retries: Cell<u64>,
}

impl Counters {
    fn bump(counter: &Cell<u64>, by: u64) {
        counter.set(counter.get() + by);
    }

    pub(super) fn snapshot(&self) -> CrawlStats {
        CrawlStats {
            pages: self.pages.get(),
            downloaded: self.downloaded.get(),
            skipped: self.skipped.get(),
            bytes: self.bytes.get(),
            retries: self.retries.get(),
        }
    }
}

impl PluginCrawler {
    /// Walk the catalog from page 1 until a page lists no entries
    ///
    /// A retryable failure (transport error or error status on the listing or
    /// on any download) restarts the same page from its first entry after the
    /// configured retry delay. Any other failure stops the run and is returned,
    /// as does a retryable one once `max_attempts` retries are spent.
    ///
    /// The returned future is not `Send`; drive it on the current task.
    pub async fn run(&self) -> Result<CrawlStats> {
        let counters = Counters::default();
        let counters = &counters;
        let mut page: u64 = 1;

        loop {
            let failed_attempts = Cell::new(0u32);
            let failed_attempts = &failed_attempts;
            let attempt = with_retry(&self.config.retry, move || async move {
                let result = self.process_page(page, counters).await;
                if let Err(Failure::Retryable(e)) = &result {
                    let retries_done = failed_attempts.replace(failed_attempts.get() + 1);
                    // Past the budget the failure is reported once, as Aborted
                    if self.config.retry.permits_retry(retries_done) {
                        Counters::bump(&counters.retries, 1);
                        self.emit_event(CrawlEvent::PageFailed {
                            page,
                            error: e.to_string(),
                        });
                    }
                }
                result
            })
            .await;

            match attempt {
                Ok(PageOutcome::Exhausted) => {
                    tracing::info!(page, "catalog exhausted");
                    break;
                }
                Ok(PageOutcome::Completed { entries }) => {
                    tracing::debug!(page, entries, "page completed");
                    Counters::bump(&counters.pages, 1);
                    page += 1;
                }
                Err(failure) => {
                    match &failure {
                        Failure::Retryable(e) => {
                            tracing::error!(page, error = %e, "retry attempts exhausted, stopping")
                        }
                        Failure::Fatal(e) => {
                            tracing::error!(page, error = %e, "unexpected error, stopping")
                        }
                    }
                    self.emit_event(CrawlEvent::Aborted {
                        page,
                        error: failure.to_string(),
                    });
                    return Err(failure.into_error());
                }
            }
        }

        let stats = counters.snapshot();
        tracing::info!(
            pages = stats.pages,
            downloaded = stats.downloaded,
            skipped = stats.skipped,
            bytes = stats.bytes,
            retries = stats.retries,
            "crawl finished"
        );
        self.emit_event(CrawlEvent::Finished { stats });
        Ok(stats)
    }

    /// Fetch `page` and download each of its entries in order
    ///
    /// The first failing request ends the attempt; entries after it are not
    /// touched.
    pub(super) async fn process_page(
        &self,
        page: u64,
        counters: &Counters,
    ) -> std::result::Result<PageOutcome, Failure> {
        let listing = self.catalog.fetch_page(page).await?;
        if listing.is_exhausted() {
            return Ok(PageOutcome::Exhausted);
        }

        let entries = listing.plugins.len();
        self.emit_event(CrawlEvent::PageFetched { page, entries });

        for entry in &listing.plugins {
            if !self.config.filter.accepts(entry.active_installs) {
                tracing::debug!(
                    slug = %entry.slug,
                    active_installs = ?entry.active_installs,
                    "outside install range, skipping"
                );
                Counters::bump(&counters.skipped, 1);
                self.emit_event(CrawlEvent::Skipped {
                    slug: entry.slug.clone(),
                    active_installs: entry.active_installs,
                });
                continue;
            }

            tracing::info!(
                page,
                slug = %entry.slug,
                version = %entry.version,
                url = %entry.download_link,
                "downloading"
            );
            self.emit_event(CrawlEvent::Downloading {
                page,
                slug: entry.slug.clone(),
                version: entry.version.clone(),
                url: entry.download_link.clone(),
            });

            let artifact = self
                .fetcher
                .fetch(&entry.slug, &entry.version, &entry.download_link)
                .await?;

            Counters::bump(&counters.downloaded, 1);
            Counters::bump(&counters.bytes, artifact.bytes);
            self.emit_event(CrawlEvent::Downloaded {
                slug: entry.slug.clone(),
                version: entry.version.clone(),
                path: artifact.path,
                bytes: artifact.bytes,
            });

            tokio::time::sleep(self.config.download.download_delay).await;
        }

        Ok(PageOutcome::Completed { entries })
    }
}
