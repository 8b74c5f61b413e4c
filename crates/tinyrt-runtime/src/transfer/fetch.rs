//! Streaming download of artifacts to the scratch area

use async_trait::async_trait;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tinyrt_core::{Result, RuntimeError};
use tokio::io::AsyncWriteExt;
use url::Url;

use super::client::{DOWNLOAD_TIMEOUT, build_client};

/// Retrieves the bytes at a URL into a local file
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Streams `url` to `dest`, creating parent directories as needed
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Transfer` carrying the underlying cause.
    async fn fetch(&self, url: &Url, dest: &Path) -> Result<()>;
}

/// [`Fetcher`] backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    progress: Option<fn(u64, u64)>,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DOWNLOAD_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = build_client(timeout).map_err(|e| RuntimeError::Transfer {
            url: String::new(),
            source: Box::new(e),
        })?;

        Ok(Self {
            client,
            progress: None,
        })
    }

    /// Sets a callback invoked with (bytes_downloaded, total_bytes) after each chunk
    pub fn with_progress(mut self, progress: fn(u64, u64)) -> Self {
        self.progress = Some(progress);
        self
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, dest: &Path) -> Result<()> {
        let bytes = download_to_file(&self.client, url, dest, self.progress)
            .await
            .map_err(|e| RuntimeError::Transfer {
                url: url.to_string(),
                source: Box::new(e),
            })?;

        tracing::debug!("downloaded {} bytes from {} to {}", bytes, url, dest.display());
        Ok(())
    }
}

/// Downloads `url` into `dest` chunk by chunk
///
/// # Returns
///
/// Number of bytes written
///
/// # Errors
///
/// Returns error if:
/// - HTTP request fails or the status is not success
/// - The body is shorter or longer than the advertised content length
/// - Writing `dest` fails
pub async fn download_to_file(
    client: &Client,
    url: &Url,
    dest: &Path,
    progress: Option<fn(u64, u64)>,
) -> std::result::Result<u64, FetchError> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut response = client.get(url.clone()).send().await?;

    if let Err(err) = response.error_for_status_ref() {
        return Err(FetchError::HttpStatus {
            url: url.clone(),
            source: err.without_url(),
        });
    }

    let content_length = response.content_length();
    let mut file = tokio::fs::File::create(dest).await?;
    let mut downloaded: u64 = 0;

    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;

        if let Some(callback) = progress {
            callback(downloaded, content_length.unwrap_or(downloaded));
        }
    }

    file.flush().await?;
    file.sync_all().await?;

    if let Some(expected) = content_length
        && downloaded != expected
    {
        return Err(FetchError::SizeMismatch {
            expected,
            actual: downloaded,
        });
    }

    Ok(downloaded)
}

/// Download error types
#[derive(Debug, Error)]
pub enum FetchError {
    /// Server answered with a non-success status
    #[error("HTTP error downloading {url}: {source}")]
    HttpStatus {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    /// Body length differs from the Content-Length header
    #[error("Size mismatch: expected {expected} bytes, got {actual} bytes")]
    SizeMismatch { expected: u64, actual: u64 },

    /// I/O error writing the destination
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection or protocol error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use std::fs;

    #[tokio::test]
    async fn test_download_to_file_writes_body() {
        let mut server = Server::new_async().await;
        let body = vec![b'x'; 1000];
        let mock = server
            .mock("GET", "/v22.9.0/node.tar.gz")
            .with_status(200)
            .with_body(&body)
            .create_async()
            .await;

        let temp = tinyrt_testkit::temp_dir_in_workspace();
        let dest = temp.path().join("nested").join("node.tar.gz");
        let url = Url::parse(&format!("{}/v22.9.0/node.tar.gz", server.url())).unwrap();
        let client = build_client(Duration::from_secs(10)).unwrap();

        let written = download_to_file(&client, &url, &dest, None).await.unwrap();

        mock.assert_async().await;
        assert_eq!(written, 1000);
        assert_eq!(fs::read(&dest).unwrap(), body);
    }

    #[tokio::test]
    async fn test_download_to_file_http_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing.tar.gz")
            .with_status(404)
            .create_async()
            .await;

        let temp = tinyrt_testkit::temp_dir_in_workspace();
        let url = Url::parse(&format!("{}/missing.tar.gz", server.url())).unwrap();
        let client = build_client(Duration::from_secs(10)).unwrap();

        let err = download_to_file(&client, &url, &temp.path().join("x"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::HttpStatus { .. }));
    }

    #[tokio::test]
    async fn test_download_progress_callback() {
        use std::sync::{Mutex, OnceLock};

        // Static storage for tracking progress calls (required for fn pointer)
        static PROGRESS_CALLS: OnceLock<Mutex<Vec<(u64, u64)>>> = OnceLock::new();

        fn track_progress(downloaded: u64, total: u64) {
            PROGRESS_CALLS
                .get_or_init(|| Mutex::new(Vec::new()))
                .lock()
                .unwrap()
                .push((downloaded, total));
        }

        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/python.tar.gz")
            .with_status(200)
            .with_body(vec![b'p'; 512])
            .create_async()
            .await;

        let temp = tinyrt_testkit::temp_dir_in_workspace();
        let url = Url::parse(&format!("{}/python.tar.gz", server.url())).unwrap();
        let client = build_client(Duration::from_secs(10)).unwrap();

        download_to_file(&client, &url, &temp.path().join("p"), Some(track_progress))
            .await
            .unwrap();

        let calls = PROGRESS_CALLS.get().unwrap().lock().unwrap();
        assert_eq!(calls.last(), Some(&(512, 512)));
    }

    #[tokio::test]
    async fn test_http_fetcher_wraps_transfer_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/gone.zip")
            .with_status(500)
            .create_async()
            .await;

        let temp = tinyrt_testkit::temp_dir_in_workspace();
        let url = Url::parse(&format!("{}/gone.zip", server.url())).unwrap();
        let fetcher = HttpFetcher::with_timeout(Duration::from_secs(10)).unwrap();

        let err = fetcher
            .fetch(&url, &temp.path().join("gone.zip"))
            .await
            .unwrap_err();
        match err {
            RuntimeError::Transfer { url: failed, .. } => assert!(failed.ends_with("/gone.zip")),
            other => panic!("Expected Transfer error, got: {:?}", other),
        }
    }
}
