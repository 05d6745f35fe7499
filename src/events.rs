//! Progress events emitted while a page is loaded.
//!
//! The orchestrator reports through an injected [`EventSink`] instead of
//! writing to a global logger, so callers decide how progress is shown.

use std::path::PathBuf;

use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub enum LoadEvent {
    PageFetched { url: Url, bytes: usize },
    ResourcesDiscovered { count: usize },
    /// Distinct files about to be fetched, after collapsing duplicates.
    DownloadsStarted { files: usize },
    ResourceSaved { url: Url, path: PathBuf },
    /// Rendered failure reason; the failure itself stays with the orchestrator.
    ResourceFailed { url: Url, reason: String },
    PageSaved { path: PathBuf },
}

#[cfg_attr(test, mockall::automock)]
pub trait EventSink: Send + Sync {
    fn emit(&self, event: LoadEvent);
}

/// Writes every event as a structured `tracing` record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: LoadEvent) {
        match event {
            LoadEvent::PageFetched { url, bytes } => info!(%url, bytes, "page fetched"),
            LoadEvent::ResourcesDiscovered { count } => info!(count, "same-origin resources discovered"),
            LoadEvent::DownloadsStarted { files } => debug!(files, "downloading resources"),
            LoadEvent::ResourceSaved { url, path } => {
                debug!(%url, path = %path.display(), "resource saved")
            }
            LoadEvent::ResourceFailed { url, reason } => warn!(%url, %reason, "resource not localized"),
            LoadEvent::PageSaved { path } => info!(path = %path.display(), "page saved"),
        }
    }
}
