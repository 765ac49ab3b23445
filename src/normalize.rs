//! Publication time normalization.
//!
//! Article pages publish their timestamps in several shapes: ISO 8601 with a
//! `Z` designator, ISO 8601 with an explicit offset, or a relative phrase such
//! as `"3 hours ago"`. Every shape is collapsed into one RFC 3339 UTC string
//! (`2026-02-25T04:32:30+00:00`) so that newest-first ordering in the store is
//! a plain text comparison.
//!
//! Normalization never fails loudly. Input that matches no rule yields `None`.

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, TimeDelta, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// `<integer> <unit> ago`, case-insensitive, surrounding whitespace allowed.
/// Only ASCII digits count as an integer.
static RELATIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*([0-9]+)\s+(minute|minutes|hour|hours|day|days|week|weeks)\s+ago\s*$")
        .expect("relative time pattern is valid")
});

/// Offset-aware layouts tried after strict RFC 3339.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Layouts without an offset; these are read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Source of "now" for relative timestamps whose run reference is unusable.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stuck at one instant.
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Render an instant in the canonical stored form.
///
/// Sub-second digits appear only when present, in groups of three.
pub fn to_canonical(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Normalize a raw publication string to a UTC instant.
///
/// Rules are tried in order and the first that produces an instant wins:
///
/// 1. blank input gives `None`
/// 2. input ending in `Z` is read as ISO 8601 UTC
/// 3. input containing `T` together with a `+` offset or a trailing `00:00`
///    is read as ISO 8601 with offset
/// 4. `N minute(s)|hour(s)|day(s)|week(s) ago` is subtracted from the run
///    reference (or from `clock` when the reference does not parse)
///
/// Anything else gives `None`.
///
/// # Arguments
///
/// * `raw` - Publication string as extracted from the page
/// * `run_reference` - The run timestamp that relative times count back from
/// * `clock` - Used instead of `run_reference` when that does not parse
///
/// # Returns
///
/// The publication instant in UTC, or `None` when no rule applies or the
/// arithmetic would overflow.
pub fn normalize_published(
    raw: &str,
    run_reference: &str,
    clock: &impl Clock,
) -> Option<DateTime<Utc>> {
    let p = raw.trim();
    if p.is_empty() {
        return None;
    }

    if let Some(stripped) = p.strip_suffix('Z') {
        if let Some(dt) = parse_offset(&format!("{stripped}+00:00")) {
            return Some(dt.with_timezone(&Utc));
        }
        debug!(raw = p, "Z-suffixed timestamp did not parse");
    }

    if p.contains('T') && (p.contains('+') || p.ends_with("00:00")) {
        if let Some(dt) = parse_offset(p) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Some(naive) = parse_naive(p) {
            return Some(naive.and_utc());
        }
        debug!(raw = p, "offset timestamp did not parse");
    }

    let caps = RELATIVE_RE.captures(p)?;
    let amount: i64 = caps[1].parse().ok()?;
    let unit = caps[2].to_ascii_lowercase();
    let delta = match unit.as_str() {
        "minute" | "minutes" => TimeDelta::try_minutes(amount),
        "hour" | "hours" => TimeDelta::try_hours(amount),
        "day" | "days" => TimeDelta::try_days(amount),
        _ => TimeDelta::try_weeks(amount),
    }?;

    let anchor = parse_reference(run_reference).unwrap_or_else(|| {
        debug!(run_reference, "Run reference unusable; anchoring on clock");
        clock.now()
    });
    anchor.checked_sub_signed(delta)
}

/// [`normalize_published`] rendered with [`to_canonical`].
pub fn normalize_to_iso(raw: &str, run_reference: &str, clock: &impl Clock) -> Option<String> {
    normalize_published(raw, run_reference, clock).map(to_canonical)
}

/// Read a run reference, accepting `Z`, explicit offsets, or no offset (UTC).
fn parse_reference(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    let s = match s.strip_suffix('Z') {
        Some(stripped) => format!("{stripped}+00:00"),
        None => s.to_string(),
    };
    parse_offset(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| parse_naive(&s).map(|n| n.and_utc()))
}

fn parse_offset(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).ok().or_else(|| {
        OFFSET_FORMATS
            .iter()
            .find_map(|f| DateTime::parse_from_str(s, f).ok())
    })
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
}
