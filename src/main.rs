//! # BBC Harvest
//!
//! An incremental batch harvester for the BBC News homepage. Each run
//! discovers article links, fetches only the ones not already stored,
//! extracts a title, publication time and lead paragraph, normalizes the
//! publication time to UTC, and upserts the results into SQLite.
//!
//! ## Usage
//!
//! ```sh
//! bbc_harvest --db ./bbc_articles.db --limit-links 60 --sleep 1
//! ```
//!
//! ## Architecture
//!
//! The application follows a one-way pipeline:
//! 1. **Discovery**: fetch the homepage and collect article URLs
//! 2. **Filtering**: drop URLs already present in the store
//! 3. **Enrichment**: fetch each new article (sequentially, paced), extract
//!    fields and normalize the publication time
//! 4. **Persistence**: one bulk upsert, then a summary and the newest rows

use clap::Parser;
use std::error::Error;
use std::process::ExitCode;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod fetch;
mod models;
mod normalize;
mod outputs;
mod pipeline;
mod scrapers;
mod store;
mod utils;

use cli::Cli;
use config::Settings;
use fetch::{HttpFetcher, RetryFetch};
use models::RunOutcome;
use normalize::SystemClock;
use outputs::{console, json};
use pipeline::{RunOptions, run_once};
use store::ArticleStore;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("bbc_harvest starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut settings = Settings::load(args.config.as_deref())?;
    settings.apply_cli(&args);
    settings.validate()?;
    info!(
        base = %settings.base,
        db = %settings.db.display(),
        limit_links = settings.limit_links,
        retries = settings.retries,
        "Settings resolved"
    );

    let aborted = harvest(&settings, &args).await?;

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), aborted, "Execution complete");

    if aborted && args.fail_on_abort {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Run one harvest and print its results. Returns whether the run aborted.
#[instrument(level = "info", skip_all)]
async fn harvest(settings: &Settings, args: &Cli) -> Result<bool, Box<dyn Error>> {
    let store = ArticleStore::new(&settings.db);

    let fetcher = RetryFetch::new(
        HttpFetcher::new(&settings.user_agent, settings.timeout())?,
        settings.retry_policy()?,
    );
    let opts = RunOptions {
        base: settings.base_url()?,
        homepage: settings.homepage_url()?,
        limit_links: settings.limit_links,
        pacing: settings.pacing()?,
    };

    let outcome = run_once(&fetcher, &store, &SystemClock, &opts).await?;
    info!(total_rows = store.count()?, "Store size after run");

    let newest = match &outcome {
        RunOutcome::Completed(summary) => {
            print!("{}", console::render_summary(summary));
            let newest = store.newest(settings.newest)?;
            print!("{}", console::render_newest(settings.newest, &newest));
            newest
        }
        RunOutcome::Aborted { .. } => {
            if let Some(notice) = console::render_abort(&outcome) {
                print!("{notice}");
            }
            Vec::new()
        }
    };

    if let Some(path) = &args.report_json {
        let report = json::RunReport {
            outcome: &outcome,
            newest: &newest,
        };
        if let Err(e) = json::write_report(&report, path).await {
            error!(path = %path.display(), error = %e, "Failed to write JSON report");
        }
    }

    Ok(outcome.is_aborted())
}
