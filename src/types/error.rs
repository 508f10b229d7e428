use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading and aggregating usage logs.
///
/// Only [`UsageError::DirectoryNotFound`] aborts a query. The line, file and
/// timestamp kinds are local: callers log them and drop the offending item.
#[derive(Error, Debug)]
pub enum UsageError {
    /// Data directory (or its `projects` subdirectory) does not exist
    #[error("claude data directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// Line is not valid JSON or lacks a required field
    #[error("malformed line: {0}")]
    MalformedLine(String),

    /// Log file could not be opened or read
    #[error("unreadable file {}: {source}", path.display())]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Timestamp is not extended ISO-8601 with fractional seconds
    #[error("unparseable timestamp: {0}")]
    UnparseableTimestamp(String),

    /// Settings could not be resolved
    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for ccdaily
pub type Result<T> = std::result::Result<T, UsageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = UsageError::MalformedLine("expected value at line 1".into());
        assert_eq!(err.to_string(), "malformed line: expected value at line 1");
    }

    #[test]
    fn test_directory_not_found_display() {
        let err = UsageError::DirectoryNotFound(PathBuf::from("/nope/projects"));
        assert_eq!(
            err.to_string(),
            "claude data directory not found: /nope/projects"
        );
    }
}
