//! JSON report of a single run.
//!
//! # Output Shape
//!
//! ```text
//! {
//!   "outcome": { "completed": { ...RunSummary... } },
//!   "newest": [ ...ArticleRecord... ]
//! }
//! ```
//!
//! An aborted run carries `{"aborted": {...}}` as its outcome and an empty
//! `newest` list.

use crate::models::{ArticleRecord, RunOutcome};
use crate::utils::ensure_parent_dir;
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub outcome: &'a RunOutcome,
    pub newest: &'a [ArticleRecord],
}

/// Serialize the run report and write it to `path`, creating parent
/// directories as needed.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_report(report: &RunReport<'_>, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(report)?;

    if let Err(e) = ensure_parent_dir(path).await {
        error!(error = %e, "Failed to create report directory");
        return Err(e.into());
    }

    fs::write(path, json).await?;
    info!("Wrote JSON run report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RunSummary;

    #[tokio::test]
    async fn test_write_report_completed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/run.json");
        let outcome = RunOutcome::Completed(RunSummary {
            run_ts_utc: "2026-02-25T05:00:00+00:00".to_string(),
            homepage_url: "https://www.bbc.com/".to_string(),
            links_scanned: 1,
            new_attempted: 1,
            succeeded: 1,
            failed: 0,
            upserted: 1,
            db: "bbc.db".to_string(),
        });
        let newest = vec![ArticleRecord {
            url: "https://www.bbc.com/news/articles/a".to_string(),
            run_ts_utc: "2026-02-25T05:00:00+00:00".to_string(),
            title: Some("Alpha".to_string()),
            published_raw: Some("1 hour ago".to_string()),
            published_iso: Some("2026-02-25T04:00:00+00:00".to_string()),
            first_paragraph: None,
        }];

        write_report(&RunReport { outcome: &outcome, newest: &newest }, &path)
            .await
            .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["outcome"]["completed"]["upserted"], 1);
        assert_eq!(value["newest"][0]["title"], "Alpha");
    }

    #[tokio::test]
    async fn test_write_report_aborted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        let outcome = RunOutcome::Aborted {
            run_ts_utc: "2026-02-25T05:00:00+00:00".to_string(),
            homepage_url: "https://www.bbc.com/".to_string(),
            reason: "HTTP 503".to_string(),
        };
        write_report(&RunReport { outcome: &outcome, newest: &[] }, &path)
            .await
            .unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"aborted\""));
        assert!(text.contains("HTTP 503"));
    }
}
