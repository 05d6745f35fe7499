use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument};
use url::Url;

use crate::charset;
use crate::config::{FailurePolicy, LoaderConfig};
use crate::error::{LoadError, ResourceFailure};
use crate::events::{EventSink, LoadEvent, TracingSink};
use crate::fetcher::{download_resource, Fetch, HttpFetcher};
use crate::file_manager::FileManager;
use crate::html_parser::{HtmlParser, ResourceReference};
use crate::link_rewriter::{rewrite_links, Replacement};
use crate::naming;

/// One page to save: where it lives and where it goes.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub url: Url,
    /// The URL as given, trimmed; the page filename is derived from it.
    pub raw_url: String,
    pub output_dir: PathBuf,
}

impl PageRequest {
    pub fn new(url: &str, output_dir: impl Into<PathBuf>) -> Result<Self, LoadError> {
        let parsed = Url::parse(url).map_err(|source| LoadError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(LoadError::UnsupportedScheme {
                url: url.to_string(),
                scheme: parsed.scheme().to_string(),
            });
        }

        Ok(Self {
            url: parsed,
            raw_url: url.trim().to_string(),
            output_dir: output_dir.into(),
        })
    }
}

/// Saves a page and its same-origin resources for offline viewing.
pub struct PageLoader {
    fetcher: Arc<dyn Fetch>,
    sink: Arc<dyn EventSink>,
    config: LoaderConfig,
}

impl PageLoader {
    pub fn new(config: LoaderConfig) -> Result<Self, LoadError> {
        let fetcher = HttpFetcher::new(&config).map_err(LoadError::Client)?;
        Ok(Self::with_fetcher(Arc::new(fetcher), config))
    }

    pub fn with_fetcher(fetcher: Arc<dyn Fetch>, config: LoaderConfig) -> Self {
        Self {
            fetcher,
            sink: Arc::new(TracingSink),
            config,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the absolute path of the saved HTML file.
    pub async fn load_page(&self, url: &str, output_dir: &Path) -> Result<PathBuf, LoadError> {
        let request = PageRequest::new(url, output_dir)?;
        self.load(&request).await
    }

    #[instrument(skip_all, fields(url = %request.url))]
    pub async fn load(&self, request: &PageRequest) -> Result<PathBuf, LoadError> {
        // Checked before any request goes out
        let file_manager = FileManager::new(&request.output_dir).await?;

        let page = self.fetcher.fetch(&request.url).await?;
        self.sink.emit(LoadEvent::PageFetched {
            url: request.url.clone(),
            bytes: page.len(),
        });

        let page_filename = naming::page_filename(&request.raw_url);
        let resources_dir_name = naming::resources_dir_name(&page_filename);
        debug!(%page_filename, %resources_dir_name, "derived output names");

        let encoding = charset::detect_encoding(&page);
        debug!(encoding = encoding.name(), "detected page encoding");

        let html = charset::decode(&page, encoding);
        let mut resources = HtmlParser::from_url(request.url.clone()).extract_resources(&html);
        self.sink.emit(LoadEvent::ResourcesDiscovered {
            count: resources.len(),
        });

        if resources.is_empty() {
            let path = file_manager.save_page(&page_filename, &page).await?;
            self.sink.emit(LoadEvent::PageSaved { path: path.clone() });
            return Ok(path);
        }

        let resources_dir = file_manager.create_resources_dir(&resources_dir_name).await?;
        let failures = self.download_all(&mut resources, &resources_dir).await;

        if !failures.is_empty() {
            info!(failed = failures.len(), policy = ?self.config.failure_policy, "some resources failed");
            if self.config.failure_policy == FailurePolicy::Abort {
                return Err(LoadError::ResourcesFailed { failures });
            }
        }

        let mut replacements = Vec::with_capacity(resources.len());
        for resource in &resources {
            // failed downloads keep their remote reference
            let Some(local_path) = resource.local_path.as_deref() else {
                continue;
            };
            let reference = file_manager.get_relative_reference(local_path)?;
            replacements.push(Replacement::for_reference(resource, reference));
        }

        let rewritten = rewrite_links(&page, encoding, &replacements).map_err(LoadError::Rewrite)?;
        let path = file_manager.save_page(&page_filename, &rewritten).await?;
        self.sink.emit(LoadEvent::PageSaved { path: path.clone() });

        Ok(path)
    }

    /// Downloads every distinct destination file once, waits for all of them
    /// and fills in `local_path` for the references that succeeded.
    async fn download_all(
        &self,
        resources: &mut [ResourceReference],
        resources_dir: &Path,
    ) -> Vec<ResourceFailure> {
        let filenames: Vec<String> = resources
            .iter()
            .map(|resource| naming::resource_filename(&resource.resolved_url))
            .collect();

        let mut seen = HashSet::new();
        let mut planned: Vec<(&str, &Url)> = Vec::new();
        for (filename, resource) in filenames.iter().zip(resources.iter()) {
            if seen.insert(filename.as_str()) {
                planned.push((filename.as_str(), &resource.resolved_url));
            }
        }

        self.sink.emit(LoadEvent::DownloadsStarted {
            files: planned.len(),
        });

        let semaphore = Semaphore::new(self.config.max_concurrent.max(1));
        let semaphore = &semaphore;
        let sink = self.sink.as_ref();
        let fetcher = self.fetcher.as_ref();

        let downloads = planned.iter().map(|&(filename, url)| async move {
            // never closed, so acquire only waits
            let _permit = semaphore.acquire().await.ok();
            let outcome = download_resource(fetcher, url, &resources_dir.join(filename)).await;

            match &outcome {
                Ok(path) => sink.emit(LoadEvent::ResourceSaved {
                    url: url.clone(),
                    path: path.clone(),
                }),
                Err(error) => sink.emit(LoadEvent::ResourceFailed {
                    url: url.clone(),
                    reason: error.to_string(),
                }),
            }

            outcome
        });
        let outcomes = join_all(downloads).await;

        let mut saved: HashMap<String, PathBuf> = HashMap::new();
        let mut failures = Vec::new();
        for (&(filename, url), outcome) in planned.iter().zip(outcomes) {
            match outcome {
                Ok(path) => {
                    saved.insert(filename.to_string(), path);
                }
                Err(error) => failures.push(ResourceFailure {
                    url: url.clone(),
                    error,
                }),
            }
        }

        for (resource, filename) in resources.iter_mut().zip(&filenames) {
            resource.local_path = saved.get(filename).cloned();
        }

        failures
    }
}

/// Loads `url` into `output_dir` with the default configuration.
pub async fn load_page(url: &str, output_dir: &Path) -> Result<PathBuf, LoadError> {
    PageLoader::new(LoaderConfig::default())?
        .load_page(url, output_dir)
        .await
}
