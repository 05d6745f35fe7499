use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use tracing::{debug, instrument};
use url::Url;

use crate::config::LoaderConfig;
use crate::error::{DownloadError, FetchError};

/// Raw transport: `GET url` and hand back the body of a success response.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError>;
}

/// [`Fetch`] over a pooled reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &LoaderConfig) -> Result<Self, reqwest::Error> {
        let client = ClientBuilder::new()
            .use_rustls_tls()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    #[instrument(skip_all, fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::transport(url.as_str(), e))?;

        let status = response.status();
        debug!(status = status.as_u16(), "response received");

        if !status.is_success() {
            return Err(FetchError::http_status(url.as_str(), status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::transport(url.as_str(), e))?;

        Ok(body.to_vec())
    }
}

/// Fetches `url` and writes the bytes verbatim to `destination`.
///
/// The parent directory must already exist.
pub async fn download_resource(
    fetcher: &dyn Fetch,
    url: &Url,
    destination: &Path,
) -> Result<PathBuf, DownloadError> {
    let bytes = fetcher.fetch(url).await?;

    tokio::fs::write(destination, &bytes)
        .await
        .map_err(|e| DownloadError::write(destination, e))?;

    debug!(%url, path = %destination.display(), bytes = bytes.len(), "resource written");
    Ok(destination.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    struct StaticFetcher(Result<Vec<u8>, u16>);

    #[async_trait]
    impl Fetch for StaticFetcher {
        async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
            match &self.0 {
                Ok(body) => Ok(body.clone()),
                Err(status) => Err(FetchError::http_status(url.as_str(), *status)),
            }
        }
    }

    fn url() -> Url {
        Url::parse("https://example.com/logo.png").unwrap()
    }

    #[tokio::test]
    async fn test_download_writes_bytes_verbatim() {
        let temp_dir = tempdir().unwrap();
        let destination = temp_dir.path().join("logo.png");
        let body = vec![0x89, b'P', b'N', b'G', 0, 255];

        let saved = download_resource(&StaticFetcher(Ok(body.clone())), &url(), &destination)
            .await
            .unwrap();

        assert_eq!(saved, destination);
        assert_eq!(std::fs::read(&destination).unwrap(), body);
    }

    #[tokio::test]
    async fn test_download_reports_status() {
        let temp_dir = tempdir().unwrap();
        let destination = temp_dir.path().join("logo.png");

        let err = download_resource(&StaticFetcher(Err(503)), &url(), &destination)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DownloadError::Fetch(FetchError::HttpStatus { status: 503, .. })
        ));
        assert!(!destination.exists());
    }

    #[tokio::test]
    async fn test_download_does_not_create_parent() {
        let temp_dir = tempdir().unwrap();
        let destination = temp_dir.path().join("missing").join("logo.png");

        let err = download_resource(&StaticFetcher(Ok(b"x".to_vec())), &url(), &destination)
            .await
            .unwrap_err();

        match err {
            DownloadError::Write { path, .. } => assert_eq!(path, destination),
            other => panic!("expected write error, got {:?}", other),
        }
    }
}
