//! Run configuration.
//!
//! Settings are layered: built-in defaults, then an optional YAML file, then
//! command-line flags (or their environment variables). The result is
//! validated once and turned into the value objects the pipeline consumes.

use crate::cli::Cli;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; NakshWebDataBot/1.0; +learning-project)";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid base URL {base:?}: {source}")]
    BaseUrl {
        base: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Every knob a run reads. Missing keys in the YAML file keep their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Root URL of the site; links are resolved against it.
    pub base: String,
    /// Path joined onto `base` to form the homepage URL.
    pub path: String,
    /// SQLite database file.
    pub db: PathBuf,
    /// Cap on discovered links processed per run.
    pub limit_links: usize,
    /// Delay between consecutive article fetches.
    pub sleep_secs: f64,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Extra attempts per request beyond the first.
    pub retries: u32,
    /// Linear backoff unit; attempt `k` failing waits `backoff_secs * k`.
    pub backoff_secs: f64,
    /// How many newest records to print after the run.
    pub newest: usize,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base: "https://www.bbc.com".to_string(),
            path: "/".to_string(),
            db: PathBuf::from("bbc_articles.db"),
            limit_links: 60,
            sleep_secs: 1.0,
            timeout_secs: 10,
            retries: 2,
            backoff_secs: 2.0,
            newest: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Bounded retry schedule handed to the fetch collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts beyond the first.
    pub retries: u32,
    /// Wait after failed attempt `k` is `backoff * k`.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Delay after the given 1-based failed attempt.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

impl Settings {
    /// Defaults, overlaid with the YAML file at `path` when one is given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(?settings, "Loaded settings file");
        Ok(settings)
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Overlay any flag the user actually supplied.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(base) = &cli.base {
            self.base = base.clone();
        }
        if let Some(path) = &cli.path {
            self.path = path.clone();
        }
        if let Some(db) = &cli.db {
            self.db = db.clone();
        }
        if let Some(n) = cli.limit_links {
            self.limit_links = n;
        }
        if let Some(s) = cli.sleep {
            self.sleep_secs = s;
        }
        if let Some(t) = cli.timeout {
            self.timeout_secs = t;
        }
        if let Some(r) = cli.retries {
            self.retries = r;
        }
        if let Some(n) = cli.newest {
            self.newest = n;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        secs_to_duration("sleep_secs", self.sleep_secs)?;
        secs_to_duration("backoff_secs", self.backoff_secs)?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.base).map_err(|source| ConfigError::BaseUrl {
            base: self.base.clone(),
            source,
        })
    }

    /// `base` joined with `path` by URL-reference resolution.
    pub fn homepage_url(&self) -> Result<Url, ConfigError> {
        self.base_url()?
            .join(&self.path)
            .map_err(|source| ConfigError::BaseUrl {
                base: format!("{} + {}", self.base, self.path),
                source,
            })
    }

    pub fn pacing(&self) -> Result<Duration, ConfigError> {
        secs_to_duration("sleep_secs", self.sleep_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> Result<RetryPolicy, ConfigError> {
        Ok(RetryPolicy {
            retries: self.retries,
            backoff: secs_to_duration("backoff_secs", self.backoff_secs)?,
        })
    }
}

fn secs_to_duration(field: &'static str, secs: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(secs).map_err(|e| ConfigError::Invalid {
        field,
        reason: format!("{secs}: {e}"),
    })
}
