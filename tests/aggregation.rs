use chrono::{DateTime, Utc};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use tenure::aggregate::{aggregate, smooth_triangular, tenure_windows, SMOOTHING_WINDOW};
use tenure::model::CommitEntry;
use tenure::util::week_start;

fn date(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

fn entry(id: &str, author: &str, when: &str) -> CommitEntry {
    CommitEntry {
        id: format!("repo:{id}"),
        author_name: author.to_string(),
        author_email: format!("{}@example.com", author.to_lowercase()),
        date: date(when),
        message: format!("commit {id}"),
        files: BTreeSet::new(),
        repository: "repo".to_string(),
    }
}

#[test]
fn week_start_is_monday_aligned() {
    // 2020-01-08 is a Wednesday, 2020-01-12 a Sunday.
    assert_eq!(week_start(&date("2020-01-08T15:30:00Z")), date("2020-01-06T00:00:00Z"));
    assert_eq!(week_start(&date("2020-01-12T23:59:59Z")), date("2020-01-06T00:00:00Z"));
    assert_eq!(week_start(&date("2020-01-06T00:00:00Z")), date("2020-01-06T00:00:00Z"));
    assert_eq!(week_start(&date("2020-01-13T00:00:00Z")), date("2020-01-13T00:00:00Z"));
}

#[test]
fn windows_span_first_to_last_commit() {
    let entries = vec![
        entry("1", "Alice", "2020-01-07T10:00:00Z"),
        entry("2", "Alice", "2020-03-04T10:00:00Z"),
        entry("3", "Bob", "2020-02-05T10:00:00Z"),
    ];

    let windows = tenure_windows(&entries);
    let alice = windows["Alice"];
    assert_eq!(alice.arrival, date("2020-01-06T00:00:00Z"));
    assert_eq!(alice.departure, date("2020-03-02T00:00:00Z"));

    for window in windows.values() {
        assert!(window.arrival <= window.departure);
    }
}

// The scenario from the chart's point of view: author A commits in
// weeks 1-3, author B in weeks 3-4.
fn two_author_table() -> Vec<CommitEntry> {
    vec![
        entry("a1", "Alice", "2020-01-07T10:00:00Z"), // week of Jan 6
        entry("a2", "Alice", "2020-01-14T10:00:00Z"), // week of Jan 13
        entry("a3", "Alice", "2020-01-21T10:00:00Z"), // week of Jan 20
        entry("b1", "Bob", "2020-01-22T11:00:00Z"),   // week of Jan 20
        entry("b2", "Bob", "2020-01-28T10:00:00Z"),   // week of Jan 27
    ]
}

#[test]
fn weekly_rollup_matches_scenario() {
    let rows = aggregate(&two_author_table());
    assert_eq!(rows.len(), 4);

    let dates: Vec<_> = rows.iter().map(|r| r.date).collect();
    assert_eq!(
        dates,
        vec![
            date("2020-01-06T00:00:00Z"),
            date("2020-01-13T00:00:00Z"),
            date("2020-01-20T00:00:00Z"),
            date("2020-01-27T00:00:00Z"),
        ]
    );

    assert_eq!(rows[0].commit_count, 1);
    assert_eq!(rows[1].commit_count, 1);
    assert_eq!(rows[2].commit_count, 2);
    assert_eq!(rows[3].commit_count, 1);

    // Week 3 averages Alice at 14 days with Bob at zero, weighted by
    // commits, not by authors.
    assert!((rows[0].commit_author_age - 0.0).abs() < 1e-9);
    assert!((rows[1].commit_author_age - 7.0 / 365.0).abs() < 1e-9);
    assert!((rows[2].commit_author_age - (14.0 / 365.0) / 2.0).abs() < 1e-9);
    assert!((rows[3].commit_author_age - 7.0 / 365.0).abs() < 1e-9);

    let newcomers: Vec<_> = rows.iter().map(|r| r.newcomers_count).collect();
    assert_eq!(newcomers, vec![1, 0, 1, 0]);

    // Alice stays active through her last week and registers as a
    // leaver the week after; Bob never leaves within the data.
    let leaving: Vec<_> = rows.iter().map(|r| r.leaving_count).collect();
    assert_eq!(leaving, vec![0, 0, 0, 1]);

    let active: Vec<_> = rows.iter().map(|r| r.active_count).collect();
    assert_eq!(active, vec![1, 1, 2, 1]);
}

#[test]
fn active_count_obeys_recurrence() {
    let entries = vec![
        entry("1", "Alice", "2020-01-07T10:00:00Z"),
        entry("2", "Bob", "2020-01-14T10:00:00Z"),
        entry("3", "Carol", "2020-01-14T12:00:00Z"),
        entry("4", "Alice", "2020-02-04T10:00:00Z"),
        entry("5", "Carol", "2020-03-03T10:00:00Z"),
        entry("6", "Dan", "2020-03-31T10:00:00Z"),
    ];

    let rows = aggregate(&entries);
    let mut previous = 0i64;
    for row in &rows {
        assert_eq!(
            row.active_count,
            previous + row.newcomers_count as i64 - row.leaving_count as i64
        );
        previous = row.active_count;
    }
}

#[test]
fn leavers_roll_forward_over_gap_weeks() {
    // Alice's departure week is Jan 6; the following week has no
    // commits, so her leave lands on the next populated bucket.
    let entries = vec![
        entry("1", "Alice", "2020-01-07T10:00:00Z"),
        entry("2", "Bob", "2020-01-07T11:00:00Z"),
        entry("3", "Bob", "2020-02-04T10:00:00Z"),
    ];

    let rows = aggregate(&entries);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].newcomers_count, 2);
    assert_eq!(rows[0].active_count, 2);
    assert_eq!(rows[1].leaving_count, 1);
    assert_eq!(rows[1].active_count, 1);
}

#[test]
fn single_author_single_week() {
    let rows = aggregate(&[entry("1", "Alice", "2020-01-07T10:00:00Z")]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].commit_count, 1);
    assert_eq!(rows[0].commit_author_age, 0.0);
    assert_eq!(rows[0].newcomers_count, 1);
    assert_eq!(rows[0].leaving_count, 0);
    assert_eq!(rows[0].active_count, 1);
    assert_eq!(rows[0].commit_author_age_smooth, None);
}

#[test]
fn empty_table_aggregates_to_nothing() {
    assert!(aggregate(&[]).is_empty());
}

#[test]
fn smoothing_preserves_constants_inside_window() {
    let values = vec![5.0; 40];
    let smoothed = smooth_triangular(&values, SMOOTHING_WINDOW);

    for (i, value) in smoothed.iter().enumerate() {
        match value {
            Some(v) => {
                assert!((v - 5.0).abs() < 1e-9);
                assert!((14..=25).contains(&i), "unexpected value at edge index {i}");
            }
            None => assert!(!(14..=25).contains(&i), "missing value at interior index {i}"),
        }
    }
}

#[test]
fn smoothing_is_identity_on_linear_series() {
    // A symmetric kernel reproduces linear data exactly.
    let values: Vec<f64> = (0..60).map(|i| i as f64).collect();
    let smoothed = smooth_triangular(&values, SMOOTHING_WINDOW);

    for (i, value) in smoothed.iter().enumerate() {
        if let Some(v) = value {
            assert!((v - i as f64).abs() < 1e-9);
        }
    }
}

#[test]
fn short_series_has_no_smoothed_values() {
    let values = vec![1.0; 20];
    assert!(smooth_triangular(&values, SMOOTHING_WINDOW)
        .iter()
        .all(Option::is_none));
}
