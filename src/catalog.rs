//! Catalog listing requests
//!
//! Pages are requested with
//! `GET {base_url}?action=query_plugins&request[page]=N` and parsed into a
//! [`CatalogPage`]. Transport failures and error statuses come back as
//! retryable errors; a body that is not the expected JSON comes back as
//! [`Error::Serialization`], which is fatal.

use crate::config::CatalogConfig;
use crate::error::{Error, Result};
use crate::types::CatalogPage;
use url::Url;

/// Value of the `action` query parameter for listing plugins
const QUERY_ACTION: &str = "query_plugins";

/// Client for the paginated plugin directory
#[derive(Clone, Debug)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: Url,
    per_page: Option<u32>,
}

impl CatalogClient {
    /// Create a catalog client that issues requests through `client`
    pub fn new(client: reqwest::Client, config: &CatalogConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            Error::config(
                "catalog.base_url",
                format!("invalid URL '{}': {}", config.base_url, e),
            )
        })?;

        Ok(Self {
            client,
            base_url,
            per_page: config.per_page,
        })
    }

    /// URL of the listing request for `page`
    ///
    /// Query parameters already present on the base URL are kept.
    pub fn page_url(&self, page: u64) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("action", QUERY_ACTION);
            query.append_pair("request[page]", &page.to_string());
            if let Some(per_page) = self.per_page {
                query.append_pair("request[per_page]", &per_page.to_string());
            }
        }
        url
    }

    /// Fetch and parse one listing page
    pub async fn fetch_page(&self, page: u64) -> Result<CatalogPage> {
        let url = self.page_url(page);
        tracing::debug!(page, url = %url, "requesting catalog page");

        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(Error::HttpStatus {
                status,
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        let parsed: CatalogPage = serde_json::from_slice(&body)?;

        tracing::debug!(
            page,
            entries = parsed.plugins.len(),
            total_pages = ?parsed.info.and_then(|info| info.pages),
            "catalog page parsed"
        );

        Ok(parsed)
    }
}
