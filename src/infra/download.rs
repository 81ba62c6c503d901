//! HTTP download functionality
//!
//! Streams remote images to disk chunk by chunk with optional progress
//! reporting. Failed transfers leave any partial file in place; the caller
//! decides whether a cached file is trustworthy (via checksum verification).

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::error::DownloadError;

/// Progress callback type, invoked with (`bytes_downloaded`, `total_bytes`)
pub type ProgressCallback = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Download result containing file path and metadata
#[derive(Debug)]
pub struct DownloadResult {
    /// Path to the downloaded file
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
}

/// Download manager for fetching remote image inputs
pub struct DownloadManager {
    /// HTTP client
    client: reqwest::Client,
    /// Optional progress observer
    progress: Option<ProgressCallback>,
}

impl DownloadManager {
    /// Create a new download manager.
    ///
    /// Only the connection phase is bounded; image transfers can be
    /// arbitrarily large, so no overall timeout is applied.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            progress: None,
        }
    }

    /// Attach a progress observer invoked as chunks arrive
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Download a file to `dest`, creating parent directories as needed.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<DownloadResult, DownloadError> {
        tracing::info!("Downloading {url} to {}", dest.display());

        let response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|e| DownloadError::Network {
                    url: url.to_string(),
                    error: e.to_string(),
                })?;

        if !response.status().is_success() {
            return Err(DownloadError::Network {
                url: url.to_string(),
                error: format!("HTTP {}", response.status()),
            });
        }

        let total_size = response.content_length().unwrap_or(0);

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::Io {
                    path: parent.to_path_buf(),
                    error: e.to_string(),
                })?;
        }

        let mut file = File::create(dest)
            .await
            .map_err(|e| DownloadError::Io {
                path: dest.to_path_buf(),
                error: e.to_string(),
            })?;

        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| DownloadError::Network {
                url: url.to_string(),
                error: e.to_string(),
            })?;

            file.write_all(&chunk)
                .await
                .map_err(|e| DownloadError::Io {
                    path: dest.to_path_buf(),
                    error: e.to_string(),
                })?;

            downloaded += chunk.len() as u64;

            if let Some(cb) = &self.progress {
                cb(downloaded, total_size);
            }
        }

        file.flush().await.map_err(|e| DownloadError::Io {
            path: dest.to_path_buf(),
            error: e.to_string(),
        })?;

        tracing::debug!("Downloaded {downloaded} bytes from {url}");

        Ok(DownloadResult {
            path: dest.to_path_buf(),
            size: downloaded,
        })
    }
}

impl Default for DownloadManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DownloadManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadManager")
            .field("progress", &self.progress.is_some())
            .finish_non_exhaustive()
    }
}
