//! Slang-Harvest main entry point
//!
//! This is the command-line interface for the slang sentence harvester.

use anyhow::Context;
use clap::Parser;
use slang_harvest::config::{load_config_with_hash, Config};
use slang_harvest::crawler::Harvester;
use slang_harvest::output::{load_store_statistics, print_harvest_tally, print_store_statistics};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Slang-Harvest: a concurrent slang sentence harvester
///
/// Slang-Harvest follows chains of dictionary pages from a random entry point,
/// collects example sentences, checks every slang word against a lexical
/// authority and appends deduplicated results to a resumable CSV file.
#[derive(Parser, Debug)]
#[command(name = "slang-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A concurrent slang sentence harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the harvest plan without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics of the existing output file and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_harvest(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("slang_harvest=info,warn"),
            1 => EnvFilter::new("slang_harvest=debug,info"),
            2 => EnvFilter::new("slang_harvest=trace,debug"),
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

/// Handles the --dry-run mode: shows what the harvest would do
fn handle_dry_run(config: &Config) {
    let crawler = &config.crawler;

    println!("=== Slang-Harvest Dry Run ===\n");

    println!("Crawler:");
    println!("  Entry URL: {}", crawler.entry_url);
    println!("  Pages to visit: {}", crawler.pages_to_visit);
    println!("  Cluster size: {}", crawler.cluster_size);
    println!("  Trails: {}", crawler.trail_count());
    println!("  Max workers: {}", crawler.max_workers);
    println!("  Delay between pages: {}s", crawler.delay_seconds);
    println!("  Request timeout: {}s", crawler.request_timeout_seconds);

    println!("\nLookup:");
    println!("  Search URL: {}", config.lookup.search_url);
    println!("  User agent: {}", config.lookup.user_agent);

    println!("\nOutput:");
    println!("  File: {}", config.output.path().display());

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: summarizes the existing output file
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let path = config.output.path();
    println!("Output file: {}\n", path.display());

    let stats = load_store_statistics(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    print_store_statistics(&stats);

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config) -> anyhow::Result<()> {
    println!(
        "Starting harvest: {} pages, clusters of {}, {} workers.",
        config.crawler.pages_to_visit, config.crawler.cluster_size, config.crawler.max_workers
    );

    let harvester = Harvester::new(config).context("Failed to prepare harvest")?;
    let summary = harvester.run().await.context("Harvest failed")?;

    println!();
    println!("Started:  {}", summary.started_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("Finished: {}", summary.finished_at.format("%Y-%m-%d %H:%M:%S UTC"));
    print_harvest_tally(&summary.stats);
    println!(
        "\nDone! {} new records (ids from {}) in {}s. Data saved to '{}'.",
        summary.records_written,
        summary.first_id,
        summary.duration_seconds(),
        summary.output_path.display()
    );

    if let Err(e) = summary.ensure_success() {
        tracing::error!("{}", e);
        return Err(e.into());
    }

    Ok(())
}
