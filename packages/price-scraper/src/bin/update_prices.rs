//! CLI for refreshing product prices
//!
//! Prints exactly one JSON document to stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use price_scraper::{
    fetch_and_extract, Config, HttpFetcher, Price, PriceUpdater, Site, SupabaseProductStore,
    UpdaterOptions,
};
use serde::Serialize;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "update_prices")]
#[command(about = "Refresh product prices from retailer pages")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every product page and store the extracted prices (default)
    Run {
        /// Extract prices without writing them back
        #[arg(long)]
        dry_run: bool,
    },

    /// Extract the price from a single page without touching the store
    Check { url: String },
}

// ============================================================================
// JSON Response Types
// ============================================================================

#[derive(Serialize)]
struct CheckResponse<'a> {
    url: &'a str,
    site: Option<Site>,
    price: Option<Price>,
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

fn output<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,price_scraper=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command.unwrap_or(Commands::Run { dry_run: false }) {
        Commands::Run { dry_run } => cmd_run(dry_run).await,
        Commands::Check { url } => cmd_check(&url).await,
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "Price update aborted");
            let _ = output(&ErrorResponse {
                success: false,
                error: format!("{:#}", e),
            });
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

async fn cmd_run(dry_run: bool) -> Result<bool> {
    let config = Config::from_env().context("Failed to load configuration")?;
    let store = SupabaseProductStore::new(config.supabase_options())?;
    let fetcher = HttpFetcher::new().context("Failed to create HTTP client")?;

    let report = PriceUpdater::new(store, fetcher)
        .with_options(UpdaterOptions { dry_run })
        .update_all_prices()
        .await;

    output(&report)?;
    Ok(report.success)
}

async fn cmd_check(url: &str) -> Result<bool> {
    let fetcher = HttpFetcher::new().context("Failed to create HTTP client")?;
    let price = fetch_and_extract(&fetcher, url).await;

    output(&CheckResponse {
        url,
        site: Site::from_url(url),
        price,
    })?;
    Ok(price.is_some())
}
