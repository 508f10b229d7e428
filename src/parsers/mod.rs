//! Log discovery and line parsing for Claude Code usage data

mod claude;
mod scanner;

pub use claude::{parse_line, parse_owned_line};
pub use scanner::{read_file_lines, LogScanner, ScannedLines, FILE_PATTERN, PROJECTS_DIR};

use crate::types::UsageRecord;
use tracing::debug;

/// Parse a stream of raw lines, dropping blank and malformed ones.
///
/// Returns the records in input order and the number of malformed lines.
pub fn parse_lines<I>(lines: I) -> (Vec<UsageRecord>, usize)
where
    I: IntoIterator<Item = String>,
{
    let mut records = Vec::new();
    let mut malformed = 0usize;

    for line in lines {
        match parse_owned_line(line) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(e) => {
                malformed += 1;
                debug!(error = %e, "skipping line");
            }
        }
    }

    (records, malformed)
}
