//! File system traversal and discovery of usage log files.

use anyhow::{bail, Context, Result};
use glob::glob;
use std::collections::HashSet;
use std::fs::metadata;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Locates project directories and their JSONL log files under a root
/// directory (typically `~/.claude/projects`).
pub struct LogDiscovery {
    root: PathBuf,
}

impl LogDiscovery {
    /// A missing or non-directory root is fatal: nothing downstream can
    /// operate without one.
    pub fn new(root: PathBuf) -> Result<Self> {
        if !root.exists() {
            bail!("projects directory not found: {}", root.display());
        }
        if !root.is_dir() {
            bail!("path is not a directory: {}", root.display());
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Immediate subdirectories of the root, sorted by name.
    pub fn list_projects(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.root).with_context(|| {
            format!("failed to read projects directory: {}", self.root.display())
        })?;
        let mut projects = Vec::new();
        for entry in entries.flatten() {
            if entry.path().is_dir() {
                projects.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        projects.sort();
        Ok(projects)
    }

    /// All `*.jsonl` files under the root (or a single project's subtree).
    ///
    /// When a lookback window is given, files whose mtime falls before the
    /// cutoff are skipped. This is purely an optimization: full-history
    /// queries pass `None` and read everything, so an old file with
    /// still-relevant events is never silently dropped.
    pub fn find_log_files(
        &self,
        project: Option<&str>,
        lookback: Option<Duration>,
    ) -> Result<Vec<PathBuf>> {
        let subtree = match project {
            Some(name) => self.root.join(name),
            None => self.root.join("*"),
        };
        let pattern = subtree.join("**").join("*.jsonl");

        let mut files = Vec::new();
        let mut seen = HashSet::new();
        if let Ok(paths) = glob(&pattern.to_string_lossy()) {
            for entry in paths.flatten() {
                if seen.insert(entry.clone()) {
                    files.push(entry);
                }
            }
        }

        if let Some(window) = lookback {
            if let Some(cutoff) = SystemTime::now().checked_sub(window) {
                files.retain(|file| match metadata(file).and_then(|m| m.modified()) {
                    Ok(mtime) => mtime > cutoff,
                    // Cannot stat: keep the file and let the parser decide.
                    Err(_) => true,
                });
            }
        }

        files.sort();
        Ok(files)
    }

    /// Project name for a log file: the first path segment under the root.
    pub fn project_for(&self, file: &Path) -> Option<String> {
        file.strip_prefix(&self.root)
            .ok()
            .and_then(|rel| rel.components().next())
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
    }
}
