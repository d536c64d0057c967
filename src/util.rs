use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use std::path::Path;

/// Snap a timestamp to the Monday 00:00 UTC of its ISO week.
pub fn week_start(timestamp: &DateTime<Utc>) -> DateTime<Utc> {
    let date = timestamp.date_naive();
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    Utc.from_utc_datetime(&monday.and_time(chrono::NaiveTime::MIN))
}

pub fn week_key(timestamp: &DateTime<Utc>) -> String {
    let week = timestamp.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

/// Short name of a repository: its directory basename.
pub fn repo_short_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string())
}
