//! Command-line entry point: crawl the whole plugin directory into the
//! current working directory.
//!
//! The process exits 0 whether the catalog ran out or an unexpected error
//! stopped the walk; only the printed lines tell the two apart.

use plugin_crawler::{Config, PluginCrawler};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let crawler = match PluginCrawler::new(Config::default()).await {
        Ok(crawler) => crawler,
        Err(e) => {
            println!("An unexpected error occurred: {e}");
            return;
        }
    };

    let mut events = crawler.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(line) = event.progress_line() {
                        println!("{line}");
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "progress output fell behind")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let result = crawler.run().await;

    // Closing the channel lets the printer drain what is left and exit
    drop(crawler);
    if let Err(e) = printer.await {
        tracing::warn!(error = %e, "progress printer stopped unexpectedly");
    }

    match result {
        Ok(stats) => tracing::debug!(?stats, "done"),
        Err(e) => tracing::debug!(error = %e, "stopped early"),
    }
}
