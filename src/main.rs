// Profile Finder CLI
//
// Resolves one name into a merged profile record, prints it as JSON on stdout
// and optionally writes the HTML and PDF reports. Logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use profile_finder::{
    FileProfileStore, HtmlReport, PdfReport, ProfileAggregator, ProfileService, ReportRenderer,
    SessionManager, load_yaml_config,
};

#[derive(Parser, Debug)]
#[command(
    name = "profile-finder",
    about = "Resolve a person's name into a consolidated biography record",
    version
)]
struct Cli {
    /// Person name to look up
    name: String,

    /// YAML config file (defaults to config.yaml in the package root)
    #[arg(long, env = "PROFILE_FINDER_CONFIG")]
    config: Option<PathBuf>,

    /// Write an HTML report to this path
    #[arg(long)]
    html: Option<PathBuf>,

    /// Write a PDF report to this path
    #[arg(long)]
    pdf: Option<PathBuf>,

    /// Directory of stored records (defaults to the user cache directory)
    #[arg(long, env = "PROFILE_FINDER_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Resolve from the sources even when a stored record exists
    #[arg(long)]
    refresh: bool,

    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_yaml_config(cli.config.as_deref()).context("Failed to load config")?;
    let browser_config = config.browser.clone();

    let launcher = Arc::new(SessionManager::new());
    let aggregator = ProfileAggregator::new(launcher.clone(), config)?;

    let store = match cli.cache_dir {
        Some(dir) => FileProfileStore::new(dir),
        None => FileProfileStore::in_cache_dir(),
    };
    info!("Using profile store at {}", store.dir().display());

    let service = ProfileService::new(aggregator, Arc::new(store));
    let record = if cli.refresh {
        service.refresh(&cli.name).await?
    } else {
        let (record, source) = service.get_or_resolve(&cli.name).await?;
        info!("Profile source: {:?}", source);
        record
    };

    println!("{}", serde_json::to_string_pretty(&record)?);

    if let Some(path) = &cli.html {
        let bytes = HtmlReport::new().render(&record).await?;
        tokio::fs::write(path, bytes)
            .await
            .with_context(|| format!("Failed to write HTML report to {}", path.display()))?;
        info!("Wrote HTML report to {}", path.display());
    }

    if let Some(path) = &cli.pdf {
        let bytes = PdfReport::new(launcher, browser_config).render(&record).await?;
        tokio::fs::write(path, bytes)
            .await
            .with_context(|| format!("Failed to write PDF report to {}", path.display()))?;
        info!("Wrote PDF report to {}", path.display());
    }

    Ok(())
}
