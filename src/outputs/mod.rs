//! Output generation for a finished run.
//!
//! # Submodules
//!
//! - [`console`]: the human-readable summary and newest-records listing
//! - [`json`]: an optional machine-readable report of the same run
//!
//! # Console Layout
//!
//! ```text
//! [SUMMARY]
//! Run timestamp (UTC): 2026-02-25T05:00:00+00:00
//! Homepage links scanned: 42
//! ...
//!
//! Newest 10 by published_iso:
//! - 2026-02-25T04:32:30+00:00 | Some headline
//!   https://www.bbc.com/news/articles/...
//! ```

pub mod console;
pub mod json;
