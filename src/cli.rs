use crate::aggregate;
use crate::chart;
use crate::collect;
use crate::git::GitLog;
use crate::locate::RepoSet;
use crate::model::{AgeOutput, DateRange, WeekRow, SCHEMA_VERSION};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "tenure")]
#[command(about = "Visualize contributor tenure and turnover across git repositories")]
#[command(version)]
pub struct Cli {
    #[arg(
        required = true,
        value_name = "PATH",
        help = "Path of a git repository to process or of a directory containing git repositories"
    )]
    pub paths: Vec<PathBuf>,

    #[arg(short = 'f', long, help = "Start date (YYYY-MM-DD)")]
    pub start: Option<String>,

    #[arg(short = 'u', long, help = "End date (YYYY-MM-DD)")]
    pub end: Option<String>,

    #[arg(short, long, help = "Chart title")]
    pub title: Option<String>,

    #[arg(short, long, help = "Output file", default_value = "result.html")]
    pub output: PathBuf,

    #[arg(long, help = "Print the weekly table as JSON instead of writing a chart")]
    pub json: bool,

    #[arg(long, help = "Print the weekly table as NDJSON instead of writing a chart")]
    pub ndjson: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        let range = DateRange::parse(self.start.as_deref(), self.end.as_deref())
            .context("Failed to parse date range")?;

        let mut repos = RepoSet::new();
        for path in &self.paths {
            repos
                .add_repositories(path)
                .with_context(|| format!("Failed to scan {}", path.display()))?;
        }
        if repos.roots().is_empty() {
            bail!(
                "No git repositories found under: {}",
                self.paths
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        let git = GitLog::new();
        let log = collect::collect(&git, repos.roots(), &range)
            .context("Failed to extract commit history")?;
        let rows = aggregate::aggregate(&log);

        let title = self
            .title
            .as_deref()
            .unwrap_or("Contributor age and turnover");

        if self.json {
            output_json(title, self.start.as_deref(), self.end.as_deref(), &rows)?;
        } else if self.ndjson {
            output_ndjson(&rows)?;
        } else {
            chart::write_html(
                &self.output,
                title,
                self.start.as_deref(),
                self.end.as_deref(),
                &rows,
            )
            .with_context(|| format!("Failed to write {}", self.output.display()))?;
            print_summary(&self.output, repos.roots().len(), log.len(), &rows);
        }

        Ok(())
    }
}

fn output_json(
    title: &str,
    since: Option<&str>,
    until: Option<&str>,
    rows: &[WeekRow],
) -> Result<()> {
    let output = AgeOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        title: title.to_string(),
        since: since.map(str::to_string),
        until: until.map(str::to_string),
        rows: rows.to_vec(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn output_ndjson(rows: &[WeekRow]) -> Result<()> {
    for row in rows {
        println!("{}", serde_json::to_string(row)?);
    }
    Ok(())
}

fn print_summary(output: &Path, repos: usize, commits: usize, rows: &[WeekRow]) {
    use console::style;

    println!(
        "Wrote {} ({} repositories, {} commits, {} weeks)",
        style(output.display()).cyan(),
        style(repos).green(),
        style(commits).green(),
        style(rows.len()).green()
    );

    if let (Some(first), Some(last)) = (rows.first(), rows.last()) {
        println!(
            "Covering {} to {}",
            style(crate::util::week_key(&first.date)).dim(),
            style(crate::util::week_key(&last.date)).dim()
        );
    }
}
