//! Command-line interface definitions for BBC Harvest.
//!
//! Every run setting can come from a flag, an environment variable, or the
//! optional YAML config file, in that order of precedence. Flags left unset
//! here fall through to the file and then to the built-in defaults.

use clap::Parser;
use std::path::PathBuf;

/// Fetch the BBC News homepage, enrich new articles, and upsert them into SQLite.
///
/// # Examples
///
/// ```sh
/// # Defaults: https://www.bbc.com/ into ./bbc_articles.db
/// bbc_harvest
///
/// # Smaller polite run against a different database
/// bbc_harvest --db /var/lib/harvest/bbc.db --limit-links 20 --sleep 2
///
/// # Settings from a file, with a JSON report of the run
/// bbc_harvest --config harvest.yaml --report-json out/last_run.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Root URL of the source site
    #[arg(long, env = "BBC_HARVEST_BASE")]
    pub base: Option<String>,

    /// Path appended to --base to form the homepage URL
    #[arg(long, env = "BBC_HARVEST_PATH")]
    pub path: Option<String>,

    /// SQLite database file
    #[arg(long, env = "BBC_HARVEST_DB")]
    pub db: Option<PathBuf>,

    /// Maximum number of discovered links processed per run
    #[arg(long, env = "BBC_HARVEST_LIMIT_LINKS")]
    pub limit_links: Option<usize>,

    /// Seconds to wait between article fetches
    #[arg(long, env = "BBC_HARVEST_SLEEP")]
    pub sleep: Option<f64>,

    /// Per-request timeout in seconds
    #[arg(long, env = "BBC_HARVEST_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Retry attempts per request beyond the first
    #[arg(long, env = "BBC_HARVEST_RETRIES")]
    pub retries: Option<u32>,

    /// Number of newest records to print after the run
    #[arg(long, env = "BBC_HARVEST_NEWEST")]
    pub newest: Option<usize>,

    /// Also write the run report as JSON to this file
    #[arg(long)]
    pub report_json: Option<PathBuf>,

    /// Exit non-zero when the homepage cannot be fetched
    #[arg(long)]
    pub fail_on_abort: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_no_flags() {
        let cli = Cli::parse_from(["bbc_harvest"]);
        assert!(cli.config.is_none());
        assert!(cli.report_json.is_none());
        assert!(!cli.fail_on_abort);
    }

    #[test]
    fn test_cli_all_flags() {
        let cli = Cli::parse_from([
            "bbc_harvest",
            "--base",
            "https://bbc.com",
            "--path",
            "/news",
            "--db",
            "/tmp/bbc.db",
            "--limit-links",
            "5",
            "--sleep",
            "0.5",
            "--timeout",
            "3",
            "--retries",
            "0",
            "--newest",
            "4",
            "--report-json",
            "/tmp/r.json",
            "--fail-on-abort",
        ]);

        assert_eq!(cli.base.as_deref(), Some("https://bbc.com"));
        assert_eq!(cli.path.as_deref(), Some("/news"));
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/bbc.db")));
        assert_eq!(cli.limit_links, Some(5));
        assert_eq!(cli.sleep, Some(0.5));
        assert_eq!(cli.timeout, Some(3));
        assert_eq!(cli.retries, Some(0));
        assert_eq!(cli.newest, Some(4));
        assert!(cli.fail_on_abort);
    }

    #[test]
    fn test_cli_short_config_flag() {
        let cli = Cli::parse_from(["bbc_harvest", "-c", "harvest.yaml"]);
        assert_eq!(cli.config, Some(PathBuf::from("harvest.yaml")));
    }
}
