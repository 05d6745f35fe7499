use std::time::Duration;

pub const DEFAULT_MAX_CONCURRENT: usize = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// What to do with the page when some resources could not be downloaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Save the page; failed references keep their original remote value.
    #[default]
    Skip,
    /// Fail the whole load and write no HTML.
    Abort,
}

#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Upper bound on resource downloads in flight at once.
    pub max_concurrent: usize,
    pub timeout: Duration,
    pub user_agent: String,
    pub failure_policy: FailurePolicy,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: default_user_agent(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

pub fn default_user_agent() -> String {
    format!("page-loader/{}", env!("CARGO_PKG_VERSION"))
}
