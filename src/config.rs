//! Data-directory settings
//!
//! The engine only needs one setting: where the Claude data directory lives.
//! Resolution order is an explicit value (e.g. `--claude-dir`), then the
//! `CLAUDE_CONFIG_DIR` environment variable, then `~/.claude`.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::parsers::{LogScanner, PROJECTS_DIR};
use crate::types::{Result, UsageError};

/// Environment variable overriding the data directory.
pub const CLAUDE_DIR_ENV: &str = "CLAUDE_CONFIG_DIR";

/// Data directory name under the home directory.
pub const DEFAULT_DIR_NAME: &str = ".claude";

/// Outcome of checking a data directory's layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathValidation {
    Valid,
    Missing,
    NotADirectory,
    NoProjectsDir,
    NoLogFiles,
}

impl PathValidation {
    pub fn is_valid(self) -> bool {
        self == PathValidation::Valid
    }

    pub fn message(self) -> &'static str {
        match self {
            PathValidation::Valid => "Path is valid",
            PathValidation::Missing => "Path does not exist",
            PathValidation::NotADirectory => "Path is not a directory",
            PathValidation::NoProjectsDir => "No 'projects' subdirectory found",
            PathValidation::NoLogFiles => "No .jsonl log files found under 'projects'",
        }
    }
}

impl fmt::Display for PathValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

/// Expand a leading `~` or `~/` against `home`.
pub fn expand_tilde(raw: &str, home: &Path) -> PathBuf {
    if raw == "~" {
        home.to_path_buf()
    } else if let Some(rest) = raw.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    claude_dir: PathBuf,
}

impl Settings {
    pub fn new(claude_dir: impl Into<PathBuf>) -> Self {
        Self {
            claude_dir: claude_dir.into(),
        }
    }

    /// `~/.claude` for the current user.
    pub fn default_dir() -> Result<PathBuf> {
        home_dir()
            .map(|home| home.join(DEFAULT_DIR_NAME))
            .ok_or_else(|| UsageError::Config("could not determine home directory".into()))
    }

    /// Resolve from an explicit value, the environment, or the default.
    pub fn resolve(explicit: Option<&str>) -> Result<Self> {
        let env = std::env::var(CLAUDE_DIR_ENV).ok();
        Self::resolve_with(explicit, env.as_deref(), home_dir().as_deref())
    }

    /// Resolution with the environment and home directory supplied by the caller.
    /// Empty values are treated as unset.
    pub fn resolve_with(explicit: Option<&str>, env: Option<&str>, home: Option<&Path>) -> Result<Self> {
        let configured = explicit
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| env.map(str::trim).filter(|s| !s.is_empty()));

        let home = home.ok_or_else(|| UsageError::Config("could not determine home directory".into()));

        match configured {
            Some(raw) if raw.starts_with('~') => Ok(Self::new(expand_tilde(raw, home?))),
            Some(raw) => Ok(Self::new(raw)),
            None => Ok(Self::new(home?.join(DEFAULT_DIR_NAME))),
        }
    }

    pub fn claude_dir(&self) -> &Path {
        &self.claude_dir
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.claude_dir.join(PROJECTS_DIR)
    }

    /// Check the directory layout a host should confirm before querying.
    pub fn validate(&self) -> PathValidation {
        if !self.claude_dir.exists() {
            return PathValidation::Missing;
        }
        if !self.claude_dir.is_dir() {
            return PathValidation::NotADirectory;
        }
        if !self.projects_dir().is_dir() {
            return PathValidation::NoProjectsDir;
        }
        match LogScanner::new(&self.claude_dir).collect_files() {
            Ok(files) if !files.is_empty() => PathValidation::Valid,
            _ => PathValidation::NoLogFiles,
        }
    }

    pub fn reset_to_default(&mut self) -> Result<()> {
        self.claude_dir = Self::default_dir()?;
        Ok(())
    }
}
