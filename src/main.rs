//! # News Sentiments
//!
//! A scraping pipeline that searches a news website for configured terms,
//! pulls the articles published on a target date, attaches a sentiment
//! score, and merges the results into a deduplicated, website-partitioned
//! article store.
//!
//! ## Usage
//!
//! ```sh
//! news_sentiments --date 2024-03-01 --storage-path ./articles.db --website yourstory
//! ```
//!
//! ## Architecture
//!
//! One run is a sequential pipeline:
//! 1. **Discovery**: load the search-results page for each term in a
//!    headless browser and extract links published on the target date
//! 2. **Fetching**: open each article in a fresh browser session and
//!    extract its body, header, and tagline (3 attempts with backoff)
//! 3. **Scoring & assembly**: attach a sentiment score and build records
//! 4. **Storage**: upsert the run batch by `unique_key`, then vacuum
//!    archived row versions past the retention horizon
//!
//! Failures are contained at the smallest useful scope: a failed article is
//! skipped, a failed search term is skipped, and only storage write errors
//! abort the run (logged, exit code 1).

use chrono::NaiveDate;
use clap::Parser;
use itertools::Itertools;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod browser;
mod cli;
mod config;
mod models;
mod scrapers;
mod sentiment;
mod storage;
mod utils;

use cli::Cli;
use config::{DEFAULT_RETENTION_HOURS, SEARCH_TERMS, ScrapeConfig};
use models::{ArticleRecord, Website};
use scrapers::Scraper;
use scrapers::finshots::FinshotsScraper;
use scrapers::yourstory::YourStoryScraper;
use storage::ArticleStore;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.as_directive()));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    if let Err(e) = run(&args).await {
        error!(error = %e, "An error occurred; aborting run");
        std::process::exit(1);
    }
}

async fn run(args: &Cli) -> Result<(), Box<dyn Error>> {
    let start_time = std::time::Instant::now();

    let date = NaiveDate::parse_from_str(&args.date, "%Y-%m-%d")?;
    info!(
        %date,
        storage_path = %args.storage_path,
        website = %args.website,
        "Starting news_sentiments run"
    );

    // The scraper owns its partition value; the CLI enum only selects it.
    let (website, batch) = match args.website {
        Website::YourStory => {
            let scraper = YourStoryScraper::new(date, SEARCH_TERMS, ScrapeConfig::default());
            (scraper.website(), scraper.scrape().await)
        }
        Website::Finshots => {
            let scraper = FinshotsScraper::new(date);
            (scraper.website(), scraper.scrape().await)
        }
    };

    if batch.is_empty() {
        warn!(%date, "No articles found for the given date; nothing to write");
        return Ok(());
    }

    // Two search terms can surface the same article; keep one row per key.
    let batch: Vec<ArticleRecord> = batch
        .into_iter()
        .unique_by(|record| record.unique_key.clone())
        .collect();
    info!(count = batch.len(), "Assembled run batch");
    debug!(batch = %serde_json::to_string(&batch)?, "Run batch contents");

    let store = ArticleStore::open(&args.storage_path).await?;
    store.upsert(website, &batch).await?;

    // Best-effort housekeeping; a failed vacuum never undoes the write.
    if let Err(e) = store.vacuum(DEFAULT_RETENTION_HOURS).await {
        warn!(error = %e, "Vacuum failed; continuing");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        articles = batch.len(),
        "Execution complete"
    );
    Ok(())
}
