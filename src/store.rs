//! SQLite persistence for harvested articles.
//!
//! One table, keyed by URL. Each public operation opens its own connection
//! and closes it on return; nothing spans operations.
//!
//! Absent optional fields are written as empty text and read back as
//! `None`, which keeps the file compatible with rows written by earlier
//! versions of the pipeline.

use crate::models::ArticleRecord;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument};

const TABLE: &str = "bbc_articles";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error on {path}: {source}")]
    Sqlite {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("cannot create database directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Handle to the article table in one database file.
#[derive(Debug, Clone)]
pub struct ArticleStore {
    path: PathBuf,
}

impl ArticleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Connection, StoreError> {
        Connection::open(&self.path).map_err(|e| self.err(e))
    }

    fn err(&self, source: rusqlite::Error) -> StoreError {
        StoreError::Sqlite {
            path: self.path.clone(),
            source,
        }
    }

    /// Create the database directory and the article table if either is
    /// missing. Safe to call on an existing store.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] if the parent directory cannot be created,
    /// [`StoreError::Sqlite`] if the file cannot be opened or the table
    /// cannot be created.
    #[instrument(level = "info", skip(self), fields(path = %self.path.display()))]
    pub fn initialize(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = self.open()?;
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {TABLE} (
                url TEXT PRIMARY KEY,
                run_ts_utc TEXT,
                title TEXT,
                published_raw TEXT,
                published_iso TEXT,
                first_paragraph TEXT
            );"
        ))
        .map_err(|e| self.err(e))?;
        debug!("Article table ensured");
        Ok(())
    }

    /// Keep only the candidate URLs that are not stored yet.
    ///
    /// # Arguments
    ///
    /// * `candidates` - Article URLs in discovery order
    ///
    /// # Returns
    ///
    /// The unknown URLs, in the same relative order as `candidates`.
    #[instrument(level = "info", skip_all, fields(candidates = candidates.len()))]
    pub fn filter_new(&self, candidates: &[String]) -> Result<Vec<String>, StoreError> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare(&format!("SELECT 1 FROM {TABLE} WHERE url = ?1"))
            .map_err(|e| self.err(e))?;

        let mut fresh = Vec::with_capacity(candidates.len());
        for url in candidates {
            let exists = stmt
                .query_row(params![url], |_| Ok(()))
                .optional()
                .map_err(|e| self.err(e))?
                .is_some();
            if !exists {
                fresh.push(url.clone());
            }
        }
        debug!(fresh = fresh.len(), "Filtered known URLs");
        Ok(fresh)
    }

    /// Insert or replace every record by URL in one transaction.
    ///
    /// A record with an existing URL replaces the stored row entirely. If
    /// any write fails the transaction is rolled back and nothing from this
    /// call is kept.
    ///
    /// # Returns
    ///
    /// The number of rows written; `0` for empty input, which never opens
    /// the database.
    #[instrument(level = "info", skip_all, fields(records = records.len()))]
    pub fn upsert(&self, records: &[ArticleRecord]) -> Result<usize, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut conn = self.open()?;
        let tx = conn.transaction().map_err(|e| self.err(e))?;
        let mut written = 0;
        {
            let mut stmt = tx
                .prepare(&format!(
                    "INSERT OR REPLACE INTO {TABLE}
                     (url, run_ts_utc, title, published_raw, published_iso, first_paragraph)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
                ))
                .map_err(|e| self.err(e))?;
            for r in records {
                stmt.execute(params![
                    r.url,
                    r.run_ts_utc,
                    r.title.as_deref().unwrap_or_default(),
                    r.published_raw.as_deref().unwrap_or_default(),
                    r.published_iso.as_deref().unwrap_or_default(),
                    r.first_paragraph.as_deref().unwrap_or_default(),
                ])
                .map_err(|e| self.err(e))?;
                written += 1;
            }
        }
        tx.commit().map_err(|e| self.err(e))?;
        info!(written, "Upserted article rows");
        Ok(written)
    }

    /// Up to `n` records with a normalized publication time, newest first.
    ///
    /// Records without a `published_iso` are left out entirely rather than
    /// sorted to either end. Canonical timestamps order lexically, so the
    /// query sorts on the stored text.
    #[instrument(level = "info", skip(self))]
    pub fn newest(&self, n: usize) -> Result<Vec<ArticleRecord>, StoreError> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT url, run_ts_utc, title, published_raw, published_iso, first_paragraph
                 FROM {TABLE}
                 WHERE published_iso IS NOT NULL AND published_iso != ''
                 ORDER BY published_iso DESC
                 LIMIT ?1"
            ))
            .map_err(|e| self.err(e))?;
        let limit = i64::try_from(n).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map(params![limit], map_record)
            .map_err(|e| self.err(e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| self.err(e))?;
        Ok(rows)
    }

    #[cfg(test)]
    pub fn get(&self, url: &str) -> Result<Option<ArticleRecord>, StoreError> {
        let conn = self.open()?;
        conn.query_row(
            &format!(
                "SELECT url, run_ts_utc, title, published_raw, published_iso, first_paragraph
                 FROM {TABLE} WHERE url = ?1"
            ),
            params![url],
            map_record,
        )
        .optional()
        .map_err(|e| self.err(e))
    }

    /// Total rows in the table.
    pub fn count(&self) -> Result<usize, StoreError> {
        let conn = self.open()?;
        let n: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {TABLE}"), [], |row| row.get(0))
            .map_err(|e| self.err(e))?;
        Ok(usize::try_from(n).unwrap_or_default())
    }
}

fn map_record(row: &Row<'_>) -> rusqlite::Result<ArticleRecord> {
    Ok(ArticleRecord {
        url: row.get(0)?,
        run_ts_utc: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        title: non_empty(row.get(2)?),
        published_raw: non_empty(row.get(3)?),
        published_iso: non_empty(row.get(4)?),
        first_paragraph: non_empty(row.get(5)?),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
