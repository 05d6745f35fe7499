//! Error types for page loading.
//!
//! Transport failures, per-resource download failures and whole-run failures
//! are kept apart so the orchestrator can decide which ones abort a run.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of the raw `fetch(url) -> bytes` transport.
#[derive(Debug, Error)]
pub enum FetchError {
    /// DNS resolution, connection refused, TLS, timeout, body read.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: BoxError,
    },

    /// The server answered with a non-success status.
    #[error("{url} responded with HTTP {status}")]
    HttpStatus { url: String, status: u16 },
}

impl FetchError {
    pub fn transport(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            url: url.into(),
            source: source.into(),
        }
    }

    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// The URL the failed request was made to.
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. } | Self::HttpStatus { url, .. } => url,
        }
    }
}

/// Failure to fetch or persist a single resource.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

/// A resource that could not be localized, with the reason.
#[derive(Debug, Error)]
#[error("resource {url}: {error}")]
pub struct ResourceFailure {
    pub url: Url,
    #[source]
    pub error: DownloadError,
}

/// Errors that end a page load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid page URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported URL scheme `{scheme}` in {url}, expected http or https")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("output directory {} does not exist", .path.display())]
    OutputDirectoryNotFound { path: PathBuf },

    #[error("network error: {0}")]
    Network(#[from] FetchError),

    #[error("filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} resource(s) could not be downloaded: {}", .failures.len(), FailureList(.failures))]
    ResourcesFailed { failures: Vec<ResourceFailure> },

    #[error("{} is not inside the output directory", .path.display())]
    OutsideOutputDirectory { path: PathBuf },

    #[error("failed to rewrite page links: {0}")]
    Rewrite(#[source] lol_html::errors::RewritingError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl LoadError {
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }
}

struct FailureList<'a>(&'a [ResourceFailure]);

impl fmt::Display for FailureList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}
