//! Timestamps and output object naming.
//!
//! This module provides [`parse_timestamp`] for the ISO-8601 strings the
//! scheduling API returns, [`RunTimestamp`] for the instant a run is
//! attributed to, and [`OutputLayout`] which derives the two object keys a
//! run writes.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Naive layouts accepted after RFC 3339 fails. Values are taken as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Format used for run timestamps in object keys.
pub const RUN_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Parses an API timestamp into UTC.
///
/// Accepts RFC 3339 (`2024-01-01T10:00:00.000000Z`, `...+02:00`) and naive
/// `YYYY-MM-DDTHH:MM:SS[.f]` values. Returns `None` for anything else,
/// including the empty string.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// The instant a run is attributed to.
///
/// Injected into the pipeline rather than read from the clock so that a
/// run's object keys are reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunTimestamp(DateTime<Utc>);

impl RunTimestamp {
    /// Wraps an explicit instant.
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    /// Captures the current instant. Only the binary's entry point calls this.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Returns the wrapped instant.
    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }

    /// Returns the `%Y-%m-%d-%H-%M-%S` form used in object keys.
    pub fn file_stem(&self) -> String {
        self.0.format(RUN_TIMESTAMP_FORMAT).to_string()
    }
}

impl From<DateTime<Utc>> for RunTimestamp {
    fn from(at: DateTime<Utc>) -> Self {
        Self::new(at)
    }
}

/// Key scheme for the objects a run writes.
///
/// ```text
/// <folder>/scheduled_calls/<timestamp>.csv
/// <folder>/metrics/<timestamp>.csv
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    folder: String,
}

impl OutputLayout {
    /// Sub-folder holding raw extracts.
    pub const SCHEDULED_CALLS: &'static str = "scheduled_calls";

    /// Sub-folder holding metrics.
    pub const METRICS: &'static str = "metrics";

    /// Creates a layout rooted at `folder`. Surrounding slashes are ignored.
    pub fn new(folder: impl AsRef<str>) -> Self {
        Self {
            folder: folder.as_ref().trim_matches('/').to_string(),
        }
    }

    /// Returns the normalized folder prefix (may be empty).
    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Key of the raw extract for `run`.
    pub fn scheduled_calls_key(&self, run: &RunTimestamp) -> String {
        self.key(Self::SCHEDULED_CALLS, run)
    }

    /// Key of the metrics file for `run`.
    pub fn metrics_key(&self, run: &RunTimestamp) -> String {
        self.key(Self::METRICS, run)
    }

    fn key(&self, kind: &str, run: &RunTimestamp) -> String {
        if self.folder.is_empty() {
            format!("{}/{}.csv", kind, run.file_stem())
        } else {
            format!("{}/{}/{}.csv", self.folder, kind, run.file_stem())
        }
    }
}
