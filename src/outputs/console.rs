//! Plain-text rendering of run results for stdout.

use crate::models::{ArticleRecord, RunOutcome, RunSummary};
use std::fmt::Write;

/// Render the end-of-run counters.
pub fn render_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "\n[SUMMARY]");
    let _ = writeln!(out, "Run timestamp (UTC): {}", summary.run_ts_utc);
    let _ = writeln!(out, "Homepage links scanned: {}", summary.links_scanned);
    let _ = writeln!(out, "New attempted: {}", summary.new_attempted);
    let _ = writeln!(out, "Enriched OK: {}", summary.succeeded);
    let _ = writeln!(out, "Failed: {}", summary.failed);
    let _ = writeln!(out, "Upserted rows: {}", summary.upserted);
    let _ = writeln!(out, "DB: {}", summary.db);
    out
}

/// Render the newest-records listing. `requested` is the configured count,
/// which may exceed the number of records available.
pub fn render_newest(requested: usize, records: &[ArticleRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\nNewest {requested} by published_iso:");
    for r in records {
        let _ = writeln!(
            out,
            "- {} | {}",
            r.published_iso.as_deref().unwrap_or_default(),
            r.title_or_empty()
        );
        let _ = writeln!(out, "  {}", r.url);
    }
    out
}

/// Render the abort notice, or `None` for a completed run.
pub fn render_abort(outcome: &RunOutcome) -> Option<String> {
    match outcome {
        RunOutcome::Completed(_) => None,
        RunOutcome::Aborted {
            run_ts_utc,
            homepage_url,
            reason,
        } => Some(format!(
            "[ERROR] Could not fetch homepage {homepage_url} (run {run_ts_utc}): {reason}\n"
        )),
    }
}
