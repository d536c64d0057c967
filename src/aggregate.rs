use crate::model::{CommitEntry, TenureWindow, WeekRow};
use crate::util::week_start;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

pub const SMOOTHING_WINDOW: usize = 30;

const DAYS_PER_YEAR: f64 = 365.0;

/// Tenure window per author: first and last week-bucketed commit.
pub fn tenure_windows(entries: &[CommitEntry]) -> BTreeMap<String, TenureWindow> {
    let mut windows: BTreeMap<String, TenureWindow> = BTreeMap::new();

    for entry in entries {
        let bucket = week_start(&entry.date);
        windows
            .entry(entry.author_name.clone())
            .and_modify(|w| {
                w.arrival = w.arrival.min(bucket);
                w.departure = w.departure.max(bucket);
            })
            .or_insert(TenureWindow { arrival: bucket, departure: bucket });
    }

    windows
}

struct WeekAccum {
    age_sum: f64,
    commits: u32,
}

/// Roll the commit table up into one row per week bucket, ascending.
pub fn aggregate(entries: &[CommitEntry]) -> Vec<WeekRow> {
    let windows = tenure_windows(entries);

    let mut buckets: BTreeMap<DateTime<Utc>, WeekAccum> = BTreeMap::new();
    for entry in entries {
        let bucket = week_start(&entry.date);
        let age = match windows.get(&entry.author_name) {
            Some(window) => (bucket - window.arrival).num_days() as f64 / DAYS_PER_YEAR,
            None => continue,
        };

        let accum = buckets
            .entry(bucket)
            .or_insert(WeekAccum { age_sum: 0.0, commits: 0 });
        accum.age_sum += age;
        accum.commits += 1;
    }

    let mut newcomers: BTreeMap<DateTime<Utc>, u32> = BTreeMap::new();
    // An author stays active through the week of their last commit, so
    // the departure registers one week later. Events landing in a
    // commit-free week roll forward to the next populated bucket;
    // events past the last bucket never materialize.
    let mut leaver_events: BTreeMap<DateTime<Utc>, u32> = BTreeMap::new();
    for window in windows.values() {
        *newcomers.entry(window.arrival).or_insert(0) += 1;
        *leaver_events.entry(window.departure + Duration::weeks(1)).or_insert(0) += 1;
    }

    let mut pending_leavers = leaver_events.into_iter().peekable();
    let mut active: i64 = 0;
    let mut rows: Vec<WeekRow> = Vec::with_capacity(buckets.len());

    for (bucket, accum) in &buckets {
        let mut leaving_count = 0u32;
        while let Some((when, count)) = pending_leavers.peek() {
            if when > bucket {
                break;
            }
            leaving_count += count;
            pending_leavers.next();
        }

        let newcomers_count = newcomers.get(bucket).copied().unwrap_or(0);
        active += newcomers_count as i64 - leaving_count as i64;

        rows.push(WeekRow {
            date: *bucket,
            commit_author_age: accum.age_sum / accum.commits as f64,
            commit_count: accum.commits,
            newcomers_count,
            leaving_count,
            active_count: active,
            commit_author_age_smooth: None,
            commit_count_smooth: None,
        });
    }

    let ages: Vec<f64> = rows.iter().map(|r| r.commit_author_age).collect();
    let counts: Vec<f64> = rows.iter().map(|r| r.commit_count as f64).collect();
    let smoothed_ages = smooth_triangular(&ages, SMOOTHING_WINDOW);
    let smoothed_counts = smooth_triangular(&counts, SMOOTHING_WINDOW);

    for (row, (age, count)) in rows
        .iter_mut()
        .zip(smoothed_ages.into_iter().zip(smoothed_counts))
    {
        row.commit_author_age_smooth = age;
        row.commit_count_smooth = count;
    }

    rows
}

/// Centered moving average under a triangular kernel: taps at offsets
/// |j| < window/2 weighted window/2 - |j|, normalized. Positions where
/// the full window overruns either edge stay `None` rather than being
/// padded.
pub fn smooth_triangular(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let half = (window / 2) as i64;
    let len = values.len() as i64;
    let mut out = vec![None; values.len()];

    for i in 0..len {
        if i - (half - 1) < 0 || i + (half - 1) >= len {
            continue;
        }

        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;
        for j in (1 - half)..half {
            let weight = (half - j.abs()) as f64;
            weighted_sum += weight * values[(i + j) as usize];
            weight_total += weight;
        }
        out[i as usize] = Some(weighted_sum / weight_total);
    }

    out
}
