//! Artifact downloads
//!
//! Each artifact is fetched with a single GET, held in memory, and written to
//! `{slug}-{version}.zip` in the download directory, replacing whatever file
//! was there.

use crate::error::{Error, Result};
use crate::utils::artifact_path;
use std::path::PathBuf;

/// A downloaded artifact on disk
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchedArtifact {
    /// File the body was written to
    pub path: PathBuf,
    /// Number of bytes written
    pub bytes: u64,
}

/// Downloads plugin archives into a directory
#[derive(Clone, Debug)]
pub struct ArtifactFetcher {
    client: reqwest::Client,
    download_dir: PathBuf,
}

impl ArtifactFetcher {
    /// Create a fetcher writing into `download_dir`
    pub fn new(client: reqwest::Client, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            download_dir: download_dir.into(),
        }
    }

    /// Download `download_link` and store it as `{slug}-{version}.zip`
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidEntry`] if slug or version cannot form a file name
    /// - [`Error::Network`] / [`Error::HttpStatus`] if the download fails
    /// - [`Error::Io`] if the file cannot be written
    pub async fn fetch(
        &self,
        slug: &str,
        version: &str,
        download_link: &str,
    ) -> Result<FetchedArtifact> {
        let path = artifact_path(&self.download_dir, slug, version)?;

        let response = self.client.get(download_link).send().await?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(Error::HttpStatus {
                status,
                url: download_link.to_string(),
            });
        }

        let body = response.bytes().await?;

        tokio::fs::write(&path, &body).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("failed to write artifact '{}': {}", path.display(), e),
            ))
        })?;

        let bytes = body.len() as u64;
        tracing::debug!(slug, version, path = %path.display(), bytes, "artifact written");

        Ok(FetchedArtifact { path, bytes })
    }
}
