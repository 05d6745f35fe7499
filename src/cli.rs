use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{
    default_user_agent, FailurePolicy, LoaderConfig, DEFAULT_MAX_CONCURRENT, DEFAULT_TIMEOUT_SECS,
};

#[derive(Parser, Debug)]
#[command(
    name = "page-loader",
    about = "Save a web page together with its images, stylesheets and scripts",
    version,
    long_about = "Downloads a single HTML page, stores every same-origin image, stylesheet and script next to it in a <page>_files directory, and rewrites the page to use the local copies. Prints the path of the saved page."
)]
pub struct LoadCommand {
    /// The URL of the page to download
    #[arg(required = true)]
    pub url: String,

    /// Output directory (defaults to the current directory); must already exist
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum concurrent resource downloads
    #[arg(short = 'c', long, default_value_t = DEFAULT_MAX_CONCURRENT as u64, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_concurrent: u64,

    /// Timeout for each request in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// User agent string to use for requests
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Fail without saving the page if any resource cannot be downloaded
    #[arg(long)]
    pub strict: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log errors and hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

impl LoadCommand {
    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            max_concurrent: usize::try_from(self.max_concurrent).unwrap_or(usize::MAX),
            timeout: Duration::from_secs(self.timeout),
            user_agent: self.user_agent.clone().unwrap_or_else(default_user_agent),
            failure_policy: if self.strict {
                FailurePolicy::Abort
            } else {
                FailurePolicy::Skip
            },
        }
    }

    /// Default log filter when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_args() {
        let args = LoadCommand::try_parse_from(&[
            "page-loader",
            "https://ru.hexlet.io/courses",
            "-o", "/tmp/x"
        ]).unwrap();

        assert_eq!(args.url, "https://ru.hexlet.io/courses");
        assert_eq!(args.output, Some(PathBuf::from("/tmp/x")));
        assert_eq!(args.max_concurrent, 10);
        assert_eq!(args.timeout, 30);
        assert_eq!(args.strict, false);
        assert_eq!(args.log_level(), "info");
    }

    #[test]
    fn test_output_defaults_to_none() {
        let args = LoadCommand::try_parse_from(&["page-loader", "https://example.com"]).unwrap();
        assert_eq!(args.output, None);
    }

    #[test]
    fn test_parse_all_args() {
        let args = LoadCommand::try_parse_from(&[
            "page-loader",
            "https://example.com",
            "--output", "./out",
            "-c", "4",
            "--timeout", "5",
            "--user-agent", "test-agent",
            "--strict",
            "-vv"
        ]).unwrap();

        let config = args.loader_config();
        assert_eq!(config.max_concurrent, 4);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
        assert_eq!(args.log_level(), "trace");
    }

    #[test]
    fn test_default_config_matches_library_defaults() {
        let args = LoadCommand::try_parse_from(&["page-loader", "https://example.com"]).unwrap();
        let config = args.loader_config();
        let defaults = LoaderConfig::default();

        assert_eq!(config.max_concurrent, defaults.max_concurrent);
        assert_eq!(config.timeout, defaults.timeout);
        assert_eq!(config.user_agent, defaults.user_agent);
        assert_eq!(config.failure_policy, FailurePolicy::Skip);
    }

    #[test]
    fn test_quiet_level() {
        let args = LoadCommand::try_parse_from(&["page-loader", "https://example.com", "-q"]).unwrap();
        assert_eq!(args.log_level(), "error");
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = LoadCommand::try_parse_from(&["page-loader", "https://example.com", "-q", "-v"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_missing_url() {
        let result = LoadCommand::try_parse_from(&[
            "page-loader",
            "-o", "./output"
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_invalid_concurrent() {
        let result = LoadCommand::try_parse_from(&[
            "page-loader",
            "https://example.com",
            "-c", "0"
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_invalid_timeout() {
        let result = LoadCommand::try_parse_from(&[
            "page-loader",
            "https://example.com",
            "--timeout", "0"
        ]);
        assert!(result.is_err());
    }
}
