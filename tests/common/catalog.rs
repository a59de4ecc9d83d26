//! Mock catalog server helpers

use plugin_crawler::{CatalogConfig, Config, CrawlEvent, DownloadConfig, RetryConfig};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::broadcast::Receiver;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Path the mock listing endpoint is served under
pub const LISTING_PATH: &str = "/plugins/info/1.2/";

/// Crawler config pointed at `server`, writing into `dir`, with millisecond delays
pub fn test_config(server: &MockServer, dir: &Path) -> Config {
    Config {
        catalog: CatalogConfig {
            base_url: format!("{}{}", server.uri(), LISTING_PATH),
            ..Default::default()
        },
        download: DownloadConfig {
            download_dir: dir.to_path_buf(),
            download_delay: Duration::from_millis(5),
        },
        retry: RetryConfig {
            delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(10),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Download URL the mock server serves an artifact under
pub fn artifact_url(server: &MockServer, slug: &str, version: &str) -> String {
    format!("{}/plugin/{}.{}.zip", server.uri(), slug, version)
}

/// Catalog entry JSON whose download link points at the mock server
pub fn entry(server: &MockServer, slug: &str, version: &str) -> serde_json::Value {
    serde_json::json!({
        "name": slug.to_uppercase(),
        "slug": slug,
        "version": version,
        "download_link": artifact_url(server, slug, version),
    })
}

/// Listing body with the given entries
pub fn listing(entries: Vec<serde_json::Value>) -> serde_json::Value {
    serde_json::json!({
        "info": {"results": entries.len()},
        "plugins": entries,
    })
}

/// Serve `body` for listing page `page`
pub async fn mount_page(server: &MockServer, page: u64, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("action", "query_plugins"))
        .and(query_param("request[page]", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Serve `content` for the artifact of `slug`/`version`
pub async fn mount_artifact(server: &MockServer, slug: &str, version: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/plugin/{}.{}.zip", slug, version)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(server)
        .await;
}

/// Page numbers of every listing request the server saw, in arrival order
pub async fn requested_pages(server: &MockServer) -> Vec<u64> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == LISTING_PATH)
        .filter_map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "request[page]")
                .and_then(|(_, v)| v.parse().ok())
        })
        .collect()
}

/// Number of requests the server saw for `url_path`
pub async fn request_count(server: &MockServer, url_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == url_path)
        .count()
}

/// Drain every event already buffered in `events`
pub fn drain_events(events: &mut Receiver<CrawlEvent>) -> Vec<CrawlEvent> {
    let mut collected = Vec::new();
    while let Ok(event) = events.try_recv() {
        collected.push(event);
    }
    collected
}

/// `(slug, version)` of every `Downloading` event, in order
pub fn downloads_started(events: &[CrawlEvent]) -> Vec<(String, String)> {
    events
        .iter()
        .filter_map(|e| match e {
            CrawlEvent::Downloading { slug, version, .. } => Some((slug.clone(), version.clone())),
            _ => None,
        })
        .collect()
}

/// Responder that records when each request arrived
#[derive(Clone, Default)]
pub struct ArrivalRecorder {
    arrivals: Arc<Mutex<Vec<Instant>>>,
    body: Vec<u8>,
}

impl ArrivalRecorder {
    /// Recorder answering 200 with `body`
    pub fn with_body(body: &[u8]) -> Self {
        Self {
            arrivals: Arc::default(),
            body: body.to_vec(),
        }
    }

    /// Arrival times so far
    pub fn arrivals(&self) -> Vec<Instant> {
        self.arrivals.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

impl Respond for ArrivalRecorder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        if let Ok(mut arrivals) = self.arrivals.lock() {
            arrivals.push(Instant::now());
        }
        ResponseTemplate::new(200).set_body_bytes(self.body.clone())
    }
}
