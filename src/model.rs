use crate::error::{Result, TenureError};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const SCHEMA_VERSION: u32 = 1;

/// One commit as reported by a repository's log, after filtering and
/// namespacing. `id` and every `files` entry carry a `<repository>:`
/// prefix so entries from different repositories never collide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitEntry {
    pub id: String,
    pub author_name: String,
    pub author_email: String,
    pub date: DateTime<Utc>,
    pub message: String,
    pub files: BTreeSet<String>,
    pub repository: String,
}

/// Span from an author's first to last week-bucketed commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenureWindow {
    pub arrival: DateTime<Utc>,
    pub departure: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekRow {
    pub date: DateTime<Utc>,
    pub commit_author_age: f64,
    pub commit_count: u32,
    pub newcomers_count: u32,
    pub leaving_count: u32,
    pub active_count: i64,
    pub commit_author_age_smooth: Option<f64>,
    pub commit_count_smooth: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub title: String,
    pub since: Option<String>,
    pub until: Option<String>,
    pub rows: Vec<WeekRow>,
}

#[derive(Debug, Clone, Default)]
pub struct DateRange {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new() -> Self {
        Self { since: None, until: None }
    }

    /// Build a range from optional `YYYY-MM-DD` (or RFC3339) strings.
    pub fn parse(since: Option<&str>, until: Option<&str>) -> Result<Self> {
        let since = since.map(parse_date).transpose()?;
        let until = until.map(parse_date).transpose()?;

        if let (Some(s), Some(u)) = (since, until) {
            if s > u {
                return Err(TenureError::InvalidDate(format!(
                    "Invalid range: start ({}) is after end ({})",
                    s, u
                )));
            }
        }

        Ok(Self { since, until })
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        if let Some(since) = self.since {
            if timestamp < &since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if timestamp > &until {
                return false;
            }
        }
        true
    }
}

fn parse_date(input: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN)));
    }

    Err(TenureError::InvalidDate(format!(
        "Expected YYYY-MM-DD or RFC3339, got '{input}'"
    )))
}
