use crate::error::Result;
use crate::git::GitLog;
use crate::model::{CommitEntry, DateRange};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use rayon::prelude::*;
use std::path::PathBuf;

/// Extract every repository in parallel and concatenate the results
/// into one table.
///
/// One worker per hardware thread; each repository is processed
/// end-to-end by a single worker. The first extraction error fails the
/// whole collection; siblings already dispatched run to completion and
/// their results are discarded. Namespaced ids keep the concatenation
/// collision-free without deduplication.
pub fn collect(
    git: &GitLog,
    roots: &[PathBuf],
    range: &DateRange,
) -> Result<Vec<CommitEntry>> {
    debug!("collecting {} repositories", roots.len());

    let pb = ProgressBar::new(roots.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb.set_message("Extracting history...");

    let tables: Vec<Vec<CommitEntry>> = roots
        .par_iter()
        .map(|root| {
            let entries = git.extract(root, range);
            pb.inc(1);
            entries
        })
        .collect::<Result<_>>()?;

    pb.finish_and_clear();
    Ok(tables.into_iter().flatten().collect())
}
