//! Listing-Harvest main entry point
//!
//! This is the command-line interface for the Listing-Harvest crawler.

use anyhow::{Context, Result};
use clap::Parser;
use listing_harvest::config::{load_config_with_hash, validate, Config};
use listing_harvest::crawler::crawl;
use listing_harvest::output::{load_statistics, print_statistics, print_summary};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Listing-Harvest: a resumable listing crawler
///
/// Listing-Harvest walks a paginated catalog listing, visits every linked
/// detail page and appends one JSON record per item to an output file.
/// Items already present in the output are skipped on the next run.
#[derive(Parser, Debug)]
#[command(name = "listing-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A resumable listing crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the listing URL
    #[arg(long, value_name = "URL")]
    list_url: Option<String>,

    /// Override the number of detail links to collect
    #[arg(long, value_name = "N")]
    target: Option<usize>,

    /// Override the maximum number of listing pages to visit
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Override the record output file
    #[arg(long, value_name = "PATH")]
    output: Option<String>,

    /// Override the failure log file
    #[arg(long, value_name = "PATH")]
    failures: Option<String>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the existing output and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.list_url {
            config.listing.url = url.clone();
        }
        if let Some(target) = self.target {
            config.listing.target_count = target;
        }
        if let Some(max_pages) = self.max_pages {
            config.listing.max_pages = max_pages;
        }
        if let Some(output) = &self.output {
            config.output.records_path = output.clone();
        }
        if let Some(failures) = &self.failures {
            config.output.failures_path = failures.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    cli.apply_overrides(&mut config);
    validate(&config).context("invalid configuration")?;

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_harvest=info,warn"),
            1 => EnvFilter::new("listing_harvest=debug,info"),
            2 => EnvFilter::new("listing_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Listing-Harvest Dry Run ===\n");

    println!("Listing:");
    println!("  URL: {}", config.listing.url);
    println!("  Target items: {}", config.listing.target_count);
    println!("  Max pages: {}", config.listing.max_pages);
    println!("  Link selector: {}", config.listing.link_selector);
    println!("  Detail path prefix: {}", config.listing.detail_path_prefix);

    println!("\nFetch:");
    println!("  User agent: {}", config.fetch.user_agent);
    println!("  Accept-Language: {}", config.fetch.accept_language);
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  Max attempts: {}", config.fetch.max_attempts);
    println!(
        "  Backoff: {}-{}ms",
        config.fetch.backoff.min_ms, config.fetch.backoff.max_ms
    );

    println!("\nPoliteness:");
    println!(
        "  Page delay: {}-{}ms",
        config.politeness.page_delay.min_ms, config.politeness.page_delay.max_ms
    );
    println!(
        "  Item delay: {}-{}ms",
        config.politeness.item_delay.min_ms, config.politeness.item_delay.max_ms
    );

    println!("\nExtraction:");
    println!("  Entity type: {}", config.extract.entity_type);
    println!("  Genre limit: {}", config.extract.genre_limit);

    println!("\nOutput:");
    println!("  Records: {}", config.output.records_path);
    println!("  Failures: {}", config.output.failures_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics over the existing output
fn handle_stats(config: &Config) -> Result<()> {
    println!("Records: {}", config.output.records_path);
    println!("Failures: {}\n", config.output.failures_path);

    let stats = load_statistics(
        Path::new(&config.output.records_path),
        Path::new(&config.output.failures_path),
    )
    .context("failed to read output files")?;

    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
///
/// Ctrl-C drops the crawl future between awaits. Every append is a single
/// complete line, so the next run resumes from whatever was written.
async fn handle_crawl(config: Config) -> Result<()> {
    tracing::info!(
        "Starting crawl of {} (target {} items, max {} pages)",
        config.listing.url,
        config.listing.target_count,
        config.listing.max_pages
    );

    tokio::select! {
        result = crawl(config) => {
            let summary = result.context("crawl failed")?;
            print_summary(&summary);
            Ok(())
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl-C")?;
            tracing::warn!("Interrupted; rerun to resume from the existing output");
            Ok(())
        }
    }
}
