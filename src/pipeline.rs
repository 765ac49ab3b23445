//! One end-to-end harvest run.
//!
//! ```text
//! FetchHome -> DiscoverLinks -> FilterExisting
//!     -> (FetchArticle -> ExtractFields -> Normalize -> Buffer)*
//!     -> Upsert -> Report
//! ```
//!
//! A homepage failure ends the run before anything is written. A failed
//! article is counted and skipped. Successful records are buffered and
//! written with a single upsert at the end, so an interrupted run loses only
//! its own new rows.

use crate::fetch::FetchHtml;
use crate::models::{ArticleRecord, RunOutcome, RunSummary};
use crate::normalize::{Clock, normalize_to_iso, to_canonical};
use crate::scrapers::bbcnews;
use crate::store::{ArticleStore, StoreError};
use crate::utils::truncate_for_log;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};
use url::Url;

/// Per-run inputs that are not collaborators.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Links are resolved against this.
    pub base: Url,
    pub homepage: Url,
    pub limit_links: usize,
    /// Delay between consecutive article fetches.
    pub pacing: Duration,
}

/// Drive a single run against `store`, fetching through `fetcher`.
///
/// The store is initialized here, so a fresh database path is fine.
///
/// # Arguments
///
/// * `fetcher` - Page source, normally a [`RetryFetch`](crate::fetch::RetryFetch) over HTTP
/// * `store` - Article table the run filters against and writes to
/// * `clock` - Supplies the run timestamp and the fallback anchor for relative times
/// * `opts` - Homepage, link cap and pacing for this run
///
/// # Returns
///
/// [`RunOutcome::Completed`] with the run counters, or [`RunOutcome::Aborted`]
/// when the homepage could not be fetched. Only store failures surface as
/// `Err`.
#[instrument(level = "info", skip_all, fields(homepage = %opts.homepage))]
pub async fn run_once<F, C>(
    fetcher: &F,
    store: &ArticleStore,
    clock: &C,
    opts: &RunOptions,
) -> Result<RunOutcome, StoreError>
where
    F: FetchHtml,
    C: Clock,
{
    store.initialize()?;

    let run_ts_utc = to_canonical(clock.now());
    let homepage_url = opts.homepage.to_string();

    info!(%homepage_url, "Fetching homepage");
    let home_html = match fetcher.fetch(&homepage_url).await {
        Ok(html) => html,
        Err(e) => {
            error!(%homepage_url, error = %e, "Could not fetch homepage; aborting run");
            return Ok(RunOutcome::Aborted {
                run_ts_utc,
                homepage_url,
                reason: e.to_string(),
            });
        }
    };

    let mut links = bbcnews::discover_article_urls(&home_html, &opts.base);
    links.truncate(opts.limit_links);
    info!(count = links.len(), "Links found");

    let to_fetch = store.filter_new(&links)?;
    info!(count = to_fetch.len(), "New links to enrich");

    let mut buffered: Vec<ArticleRecord> = Vec::with_capacity(to_fetch.len());
    let mut failed = 0usize;

    for (i, url) in to_fetch.iter().enumerate() {
        if i > 0 {
            sleep(opts.pacing).await;
        }
        info!(index = i + 1, total = to_fetch.len(), %url, "Fetching article");

        let html = match fetcher.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(%url, error = %e, "Article fetch failed; skipping");
                failed += 1;
                continue;
            }
        };

        let record = enrich(url, &html, &run_ts_utc, clock);
        info!(
            title = %truncate_for_log(record.title_or_empty(), 80),
            published_iso = record.published_iso.as_deref().unwrap_or_default(),
            "Enriched article"
        );
        buffered.push(record);
    }

    let succeeded = buffered.len();
    let upserted = store.upsert(&buffered)?;

    let summary = RunSummary {
        run_ts_utc,
        homepage_url,
        links_scanned: links.len(),
        new_attempted: to_fetch.len(),
        succeeded,
        failed,
        upserted,
        db: store.path().display().to_string(),
    };
    info!(?summary, "Run complete");
    Ok(RunOutcome::Completed(summary))
}

/// Extract and normalize one fetched article into a record for this run.
///
/// `run_ts_utc` is stamped on the record and anchors relative publication
/// times such as `"2 hours ago"`.
pub fn enrich(url: &str, html: &str, run_ts_utc: &str, clock: &impl Clock) -> ArticleRecord {
    let fields = bbcnews::extract_fields(html, url);
    let published_iso = fields
        .published_raw
        .as_deref()
        .and_then(|raw| normalize_to_iso(raw, run_ts_utc, clock));

    ArticleRecord {
        url: url.to_string(),
        run_ts_utc: run_ts_utc.to_string(),
        title: fields.title,
        published_raw: fields.published_raw,
        published_iso,
        first_paragraph: fields.first_paragraph,
    }
}
