pub mod charset;
pub mod cli;
pub mod config;
pub mod downloader;
pub mod error;
pub mod events;
pub mod fetcher;
pub mod file_manager;
pub mod html_parser;
pub mod link_rewriter;
pub mod naming;
pub mod progress;

// Re-export main types for convenience
pub use charset::detect_encoding;
pub use cli::LoadCommand;
pub use config::{FailurePolicy, LoaderConfig};
pub use downloader::{load_page, PageLoader, PageRequest};
pub use error::{DownloadError, FetchError, LoadError, ResourceFailure};
pub use events::{EventSink, LoadEvent, TracingSink};
pub use fetcher::{download_resource, Fetch, HttpFetcher};
pub use file_manager::FileManager;
pub use html_parser::{HtmlParser, ResourceReference, ResourceType};
pub use link_rewriter::{rewrite_links, Replacement};
pub use naming::{page_filename, resource_filename, resources_dir_name};
pub use progress::ProgressSink;
