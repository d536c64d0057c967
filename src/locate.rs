use crate::error::{Result, TenureError};
use log::debug;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Resolves user-supplied paths into a set of git repository roots.
///
/// Directories are searched recursively for nested repositories;
/// symlink cycles are broken by visiting each canonical path at most
/// once, and a repository reached through several paths contributes a
/// single root.
#[derive(Default)]
pub struct RepoSet {
    roots: Vec<PathBuf>,
    visited: HashSet<PathBuf>,
}

impl RepoSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path that must itself be a repository root.
    pub fn add_repository(&mut self, path: &Path) -> Result<()> {
        let abs = std::fs::canonicalize(path)
            .map_err(|e| TenureError::InvalidPath(format!("{}: {e}", path.display())))?;

        if !is_repo_root(&abs) {
            return Err(TenureError::InvalidPath(format!(
                "Git repository expected, no {} found",
                abs.join(".git").display()
            )));
        }

        if self.visited.insert(abs.clone()) {
            debug!("repository root: {}", abs.display());
            self.roots.push(abs);
        }
        Ok(())
    }

    /// Add a repository, or search a directory for nested repositories.
    /// Paths that are neither are skipped silently.
    pub fn add_repositories(&mut self, path: &Path) -> Result<()> {
        let abs = match std::fs::canonicalize(path) {
            Ok(abs) => abs,
            Err(_) => return Ok(()),
        };

        if !self.visited.insert(abs.clone()) {
            return Ok(());
        }

        if is_repo_root(&abs) {
            debug!("repository root: {}", abs.display());
            self.roots.push(abs);
        } else if abs.is_dir() {
            for child in std::fs::read_dir(&abs)? {
                self.add_repositories(&child?.path())?;
            }
        }
        Ok(())
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn into_roots(self) -> Vec<PathBuf> {
        self.roots
    }
}

fn is_repo_root(path: &Path) -> bool {
    path.join(".git").exists()
}
