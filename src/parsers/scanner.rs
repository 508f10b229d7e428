//! Log file discovery under `<claude_dir>/projects`

use crate::types::{Result, UsageError};
use glob::{MatchOptions, Pattern};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Subdirectory of the data directory that holds per-project logs.
pub const PROJECTS_DIR: &str = "projects";

/// Recursive glob for JSONL logs, relative to the projects directory.
pub const FILE_PATTERN: &str = "**/*.jsonl";

/// Enumerates `.jsonl` files below the projects directory and streams their lines.
#[derive(Debug, Clone)]
pub struct LogScanner {
    claude_dir: PathBuf,
}

impl LogScanner {
    pub fn new(claude_dir: impl Into<PathBuf>) -> Self {
        Self {
            claude_dir: claude_dir.into(),
        }
    }

    pub fn claude_dir(&self) -> &Path {
        &self.claude_dir
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.claude_dir.join(PROJECTS_DIR)
    }

    /// Check the data directory and its `projects` subdirectory exist.
    pub fn ensure_exists(&self) -> Result<PathBuf> {
        if !self.claude_dir.is_dir() {
            return Err(UsageError::DirectoryNotFound(self.claude_dir.clone()));
        }
        let projects = self.projects_dir();
        if !projects.is_dir() {
            return Err(UsageError::DirectoryNotFound(projects));
        }
        Ok(projects)
    }

    /// Collect every `.jsonl` file, at any depth, skipping hidden files and directories.
    /// Order is unspecified.
    pub fn collect_files(&self) -> Result<Vec<PathBuf>> {
        let projects = self.ensure_exists()?;

        // Escape the root so bracketed directory names are taken literally
        let pattern = format!(
            "{}/{}",
            Pattern::escape(&projects.to_string_lossy()),
            FILE_PATTERN
        );
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: true,
        };

        let paths = glob::glob_with(&pattern, options)
            .map_err(|e| UsageError::Config(format!("invalid log pattern: {}", e)))?;

        let files: Vec<PathBuf> = paths
            .filter_map(|entry| match entry {
                Ok(path) if path.is_file() => Some(path),
                Ok(_) => None,
                Err(e) => {
                    warn!(path = %e.path().display(), error = %e.error(), "skipping unreadable path");
                    None
                }
            })
            .collect();

        debug!(count = files.len(), root = %projects.display(), "collected log files");
        Ok(files)
    }

    /// Lazily yield the lines of every log file, one file at a time.
    ///
    /// Fails only when the directory layout is missing; unreadable files are
    /// logged and skipped without yielding any of their lines.
    pub fn lines(&self) -> Result<ScannedLines> {
        let files = self.collect_files()?;
        Ok(ScannedLines::new(files))
    }
}

/// Read a whole log file into lines.
///
/// The file is read up front so a failure part way through drops the whole
/// file instead of a prefix of it. Non-UTF-8 content counts as unreadable.
pub fn read_file_lines(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|source| UsageError::UnreadableFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(content.lines().map(String::from).collect())
}

/// Iterator over the raw lines of a set of log files.
#[derive(Debug)]
pub struct ScannedLines {
    files: std::vec::IntoIter<PathBuf>,
    current: std::vec::IntoIter<String>,
    files_read: usize,
    files_skipped: usize,
}

impl ScannedLines {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self {
            files: files.into_iter(),
            current: Vec::new().into_iter(),
            files_read: 0,
            files_skipped: 0,
        }
    }

    pub fn files_read(&self) -> usize {
        self.files_read
    }

    pub fn files_skipped(&self) -> usize {
        self.files_skipped
    }
}

impl Iterator for ScannedLines {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if let Some(line) = self.current.next() {
                return Some(line);
            }

            let path = self.files.next()?;
            match read_file_lines(&path) {
                Ok(lines) => {
                    self.files_read += 1;
                    self.current = lines.into_iter();
                }
                Err(e) => {
                    self.files_skipped += 1;
                    warn!(error = %e, "skipping log file");
                }
            }
        }
    }
}
