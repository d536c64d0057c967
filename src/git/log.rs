use crate::error::{Result, TenureError};
use crate::model::{CommitEntry, DateRange};
use crate::rules::{self, Ruleset};
use crate::util::repo_short_name;
use chrono::{DateTime, Utc};
use log::debug;
use std::collections::BTreeSet;
use std::path::Path;
use std::process::Command;

const RECORD_SEP: char = '\x1e';
const FIELD_SEP: char = '\x1f';

// Records separated by \x1e, fields by \x1f; neither can appear in
// commit content, so multi-line messages and file lists parse
// unambiguously. The trailing \x1f closes the subject field off from
// the --name-only file list.
const LOG_FORMAT: &str = "%x1e%H%x1f%an%x1f%ae%x1f%ad%x1f%s%x1f";

const GIT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Extracts structured commit entries from a repository by driving
/// `git log` over its entire history.
pub struct GitLog {
    rulesets: Vec<Box<dyn Ruleset>>,
    now: DateTime<Utc>,
}

impl GitLog {
    pub fn new() -> Self {
        Self::with_rulesets(rules::registry())
    }

    pub fn with_rulesets(rulesets: Vec<Box<dyn Ruleset>>) -> Self {
        Self { rulesets, now: Utc::now() }
    }

    /// Full-history extraction for one repository root, oldest first,
    /// all branches, filtered to `range`.
    pub fn extract(&self, root: &Path, range: &DateRange) -> Result<Vec<CommitEntry>> {
        let raw = self.run_git_log(root, range)?;
        self.parse_log(root, &raw, range)
    }

    fn run_git_log(&self, root: &Path, range: &DateRange) -> Result<String> {
        let mut command = Command::new("git");
        command
            .arg("--git-dir")
            .arg(root.join(".git"))
            .args(["log", "--date-order", "--reverse", "--all", "--date=iso", "--name-only"])
            .arg(format!("--pretty=format:{LOG_FORMAT}"));

        if let Some(since) = range.since {
            command.arg("--since").arg(since.format("%Y-%m-%d").to_string());
        }
        if let Some(until) = range.until {
            command.arg("--until").arg(until.format("%Y-%m-%d").to_string());
        }

        debug!("running {:?}", command);
        let output = command.output()?;

        if !output.status.success() {
            let mut diagnostic = String::from_utf8_lossy(&output.stdout).into_owned();
            diagnostic.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(TenureError::Extraction(format!(
                "git log failed in {} [{}]: {}",
                root.display(),
                output.status,
                diagnostic.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn parse_log(&self, root: &Path, raw: &str, range: &DateRange) -> Result<Vec<CommitEntry>> {
        let repository = repo_short_name(root);
        let mut entries = Vec::new();

        for record in raw.split(RECORD_SEP) {
            let record = record.trim();
            if record.is_empty() {
                continue;
            }

            let mut fields = record.split(FIELD_SEP);
            let id = fields.next().unwrap_or("").to_string();
            let author_name = fields.next().unwrap_or("").to_string();
            let author_email = fields.next().unwrap_or("").to_string();

            // Real-world history contains undated or garbled entries;
            // those are dropped, not fatal.
            let date = match fields.next().and_then(parse_git_date) {
                Some(date) => date,
                None => continue,
            };

            let message = fields.next().unwrap_or("").to_string();
            let files = parse_files(fields.next().unwrap_or(""));

            let mut entry = CommitEntry {
                id,
                author_name,
                author_email,
                date,
                message,
                files,
                repository: String::new(),
            };

            // git --since/--until occasionally lets entries from the
            // wrong range through; re-check here. The now-guard drops
            // post-dated commits and misconfigured clocks.
            if !range.contains(&entry.date) || entry.date > self.now {
                continue;
            }

            if !self.is_entry_acceptable(&entry)? {
                continue;
            }

            entry.id = format!("{}:{}", repository, entry.id);
            let files = std::mem::take(&mut entry.files);
            entry.files = files
                .into_iter()
                .map(|f| format!("{repository}:{f}"))
                .collect();
            entry.repository = repository.clone();

            self.postprocess_entry(&mut entry)?;
            entries.push(entry);
        }

        debug!("{}: {} entries extracted", repository, entries.len());
        Ok(entries)
    }

    fn is_entry_acceptable(&self, entry: &CommitEntry) -> Result<bool> {
        for rule in &self.rulesets {
            if !rule
                .is_entry_acceptable(entry)
                .map_err(|e| TenureError::Rule(format!("{}: {e}", rule.name())))?
            {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn postprocess_entry(&self, entry: &mut CommitEntry) -> Result<()> {
        for rule in &self.rulesets {
            rule.postprocess_entry(entry)
                .map_err(|e| TenureError::Rule(format!("{}: {e}", rule.name())))?;
        }
        Ok(())
    }
}

impl Default for GitLog {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_git_date(field: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(field.trim(), GIT_DATE_FORMAT)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_files(block: &str) -> BTreeSet<String> {
    block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
