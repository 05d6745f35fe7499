use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use page_loader::{LoadCommand, PageLoader, ProgressSink};

#[tokio::main]
async fn main() -> ExitCode {
    let args = LoadCommand::parse();

    // RUST_LOG wins over -q / -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    match run(&args).await {
        Ok(path) => {
            if !args.quiet {
                eprintln!("{} {}", "✅ Page saved:".green().bold(), path.display());
            }
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} {:#}", "❌ Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &LoadCommand) -> Result<std::path::PathBuf> {
    let output_dir = match &args.output {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to read the current directory")?,
    };

    let progress = Arc::new(if args.quiet {
        ProgressSink::hidden()
    } else {
        ProgressSink::new()
    });

    let loader = PageLoader::new(args.loader_config())?.with_sink(progress.clone());
    let result = loader.load_page(&args.url, &output_dir).await;
    progress.finish();

    result.with_context(|| format!("Failed to load {}", args.url))
}
