//! JPO scraper main entry point
//!
//! This is the command-line interface for the open-day session harvester.

use anyhow::{bail, Context};
use clap::Parser;
use jpo_scraper::config::{load_config_with_hash, Config};
use jpo_scraper::crawler::{trigger, CrawlOutcome};
use jpo_scraper::storage::open_store;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// JPO scraper: open-day session harvester
///
/// Walks the admissions portal's programme cards, extracts the open-day
/// sessions of every programme and saves them to the document store.
#[derive(Parser, Debug)]
#[command(name = "jpo-scraper")]
#[command(version)]
#[command(about = "Harvests open-day sessions from the admissions portal", long_about = None)]
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

    /// Start the HTTP trigger instead of crawling once
    #[arg(long, conflicts_with_all = ["dry_run", "show_documents"])]
    serve: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["serve", "show_documents"])]
    dry_run: bool,

    /// Print the stored documents as JSON and exit
    #[arg(long, conflicts_with_all = ["serve", "dry_run"])]
    show_documents: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        Ok(())
    } else if cli.show_documents {
        handle_show_documents(&config)
    } else if cli.serve {
        handle_serve(config).await
    } else {
        handle_crawl(&config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("jpo_scraper=info,warn"),
            1 => EnvFilter::new("jpo_scraper=debug,info"),
            2 => EnvFilter::new("jpo_scraper=trace,debug"),
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

/// Handles the --dry-run mode: shows the planned crawl
fn handle_dry_run(config: &Config) {
    println!("=== JPO Scraper Dry Run ===\n");

    println!("Crawl:");
    println!("  Listing URL: {}", config.crawler.listing_url);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Detail timeout: {}ms", config.crawler.detail_timeout_ms);
    println!(
        "  Pagination timeout: {}ms",
        config.crawler.pagination_timeout_ms
    );

    println!("\nRenderer:");
    println!("  Kind: {:?}", config.renderer.kind);
    println!(
        "  Executable: {}",
        config.renderer.executable.as_deref().unwrap_or("auto-detected")
    );
    println!("  Headless: {}", config.renderer.headless);
    for arg in &config.renderer.args {
        println!("    * {}", arg);
    }

    println!("\nStore:");
    println!("  Database: {}", config.store.database_path);
    println!("  Collection: {}", config.store.collection);
    println!(
        "  Document ids: {0}0, {0}1, ...",
        config.store.document_prefix
    );

    println!("\nServer:");
    println!("  Bind: {}", config.server.bind);

    println!("\n✓ Configuration is valid");
}

/// Handles the --show-documents mode: dumps the collection
fn handle_show_documents(config: &Config) -> anyhow::Result<()> {
    let store = open_store(&config.store).context("failed to open the document store")?;
    let documents = store.list_documents()?;

    println!(
        "{} document(s) in '{}' ({})\n",
        documents.len(),
        store.collection(),
        config.store.database_path
    );
    for document in documents {
        println!(
            "{} (written {}):\n{}",
            document.id,
            document.written_at,
            serde_json::to_string_pretty(&document.record)?
        );
    }

    Ok(())
}

/// Handles --serve: runs the HTTP trigger
async fn handle_serve(config: Config) -> anyhow::Result<()> {
    let store = open_store(&config.store).context("failed to open the document store")?;
    jpo_scraper::server::serve(config, store)
        .await
        .context("crawl trigger stopped")?;
    Ok(())
}

/// Handles the default mode: one crawl
async fn handle_crawl(config: &Config) -> anyhow::Result<()> {
    let mut store = open_store(&config.store).context("failed to open the document store")?;

    match trigger(config, &mut store).await {
        CrawlOutcome::Succeeded => Ok(()),
        CrawlOutcome::Failed => bail!("crawl failed, see the log above"),
    }
}
