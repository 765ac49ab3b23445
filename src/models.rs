//! Data models for harvested articles and run results.
//!
//! - [`ArticleFields`]: what the extractor found in one article page
//! - [`ArticleRecord`]: one persisted row, keyed by URL
//! - [`RunSummary`] / [`RunOutcome`]: what a single pipeline run reports

use serde::{Deserialize, Serialize};

/// Raw fields pulled out of a single article page.
///
/// `None` means the page had no matching element at all. `Some("")` means
/// the element existed but carried no text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFields {
    /// Text of the first `<h1>`, whitespace-collapsed.
    pub title: Option<String>,
    /// The first `<time>` element's `datetime` attribute, or its text.
    pub published_raw: Option<String>,
    /// First paragraph whose collapsed text is longer than 60 characters.
    pub first_paragraph: Option<String>,
}

/// One row of the article table.
///
/// The URL is the identity; writing a record with an existing URL replaces
/// the whole row. Absent optional fields are stored as empty text so that
/// files written by earlier versions of the pipeline stay readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Canonical article URL, fragment stripped.
    pub url: String,
    /// RFC 3339 UTC timestamp of the run that wrote this row.
    pub run_ts_utc: String,
    pub title: Option<String>,
    /// Verbatim publication text as found on the page.
    pub published_raw: Option<String>,
    /// Publication time normalized to UTC, derived from `published_raw`.
    pub published_iso: Option<String>,
    pub first_paragraph: Option<String>,
}

impl ArticleRecord {
    /// Title for display, empty when the page had none.
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }
}

/// Counters reported at the end of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_ts_utc: String,
    pub homepage_url: String,
    /// Links kept after discovery and the per-run cap.
    pub links_scanned: usize,
    /// Links not already in the store.
    pub new_attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Rows written by the final bulk upsert.
    pub upserted: usize,
    pub db: String,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every stage ran; the store holds this run's new records.
    Completed(RunSummary),
    /// The homepage could not be fetched. Nothing was written.
    Aborted {
        run_ts_utc: String,
        homepage_url: String,
        reason: String,
    },
}

impl RunOutcome {
    pub fn is_aborted(&self) -> bool {
        matches!(self, RunOutcome::Aborted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ArticleRecord {
        ArticleRecord {
            url: "https://www.bbc.com/news/articles/c1".to_string(),
            run_ts_utc: "2026-02-25T05:00:00+00:00".to_string(),
            title: Some("Test Title".to_string()),
            published_raw: Some("2026-02-25T04:32:30Z".to_string()),
            published_iso: Some("2026-02-25T04:32:30+00:00".to_string()),
            first_paragraph: None,
        }
    }

    #[test]
    fn test_title_or_empty() {
        let mut r = record();
        assert_eq!(r.title_or_empty(), "Test Title");
        r.title = None;
        assert_eq!(r.title_or_empty(), "");
    }

    #[test]
    fn test_record_serialization() {
        let json = serde_json::to_string(&record()).unwrap();
        assert!(json.contains("\"published_iso\":\"2026-02-25T04:32:30+00:00\""));
        assert!(json.contains("\"first_paragraph\":null"));
    }

    #[test]
    fn test_outcome_aborted_serialization() {
        let outcome = RunOutcome::Aborted {
            run_ts_utc: "2026-02-25T05:00:00+00:00".to_string(),
            homepage_url: "https://www.bbc.com/".to_string(),
            reason: "HTTP 503".to_string(),
        };
        assert!(outcome.is_aborted());
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.starts_with("{\"aborted\":"));
    }
}
