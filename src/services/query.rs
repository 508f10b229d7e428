//! Usage query service: the single entry point hosts call
//!
//! Every query builds its own record set from scratch (scan, parse,
//! deduplicate) and holds no mutable state, so a service can be shared across
//! threads and queried concurrently.

use chrono::{DateTime, Days, Local, NaiveDate};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::Settings;
use crate::parsers::{parse_lines, LogScanner};
use crate::services::{Aggregator, Deduplicator, PricingTable};
use crate::types::{DailySummary, Result, UsageRecord};

/// Counters from one load, for logging and diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    pub files_read: usize,
    pub files_skipped: usize,
    pub malformed_lines: usize,
    pub records_parsed: usize,
    pub duplicates_removed: usize,
}

/// Deduplicated records from one scan of the data directory.
#[derive(Debug, Clone)]
pub struct LoadedRecords {
    pub records: Vec<UsageRecord>,
    pub stats: LoadStats,
}

/// Today's summary plus the trailing window, both from a single scan.
#[derive(Debug, Clone, Serialize)]
pub struct UsageSnapshot {
    pub today: DailySummary,
    /// Oldest first, ending with today
    pub recent: Vec<DailySummary>,
    pub generated_at: DateTime<Local>,
}

/// The `n` calendar days ending at `end`, oldest first.
pub fn days_ending(end: NaiveDate, n: usize) -> Vec<NaiveDate> {
    (0..n as u64)
        .rev()
        .filter_map(|back| end.checked_sub_days(Days::new(back)))
        .collect()
}

/// Answers "today" and "last N days" queries against a Claude data directory.
#[derive(Debug, Clone)]
pub struct UsageQueryService {
    scanner: LogScanner,
    pricing: PricingTable,
}

impl UsageQueryService {
    pub fn new(claude_dir: impl Into<PathBuf>) -> Self {
        Self {
            scanner: LogScanner::new(claude_dir),
            pricing: PricingTable::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.claude_dir())
    }

    pub fn claude_dir(&self) -> &Path {
        self.scanner.claude_dir()
    }

    /// Scan, parse and deduplicate every log line under the data directory.
    pub fn load(&self) -> Result<LoadedRecords> {
        let mut lines = self.scanner.lines()?;
        let (records, malformed_lines) = parse_lines(lines.by_ref());
        let records_parsed = records.len();

        let records = Deduplicator::dedup(records);

        let stats = LoadStats {
            files_read: lines.files_read(),
            files_skipped: lines.files_skipped(),
            malformed_lines,
            records_parsed,
            duplicates_removed: records_parsed - records.len(),
        };
        debug!(
            files_read = stats.files_read,
            files_skipped = stats.files_skipped,
            malformed_lines = stats.malformed_lines,
            records = records.len(),
            duplicates_removed = stats.duplicates_removed,
            "loaded usage records"
        );

        Ok(LoadedRecords { records, stats })
    }

    /// Summary for the host's current local date.
    pub fn today(&self) -> Result<DailySummary> {
        self.summary_for(Local::now().date_naive())
    }

    pub fn summary_for(&self, date: NaiveDate) -> Result<DailySummary> {
        let loaded = self.load()?;
        Ok(Aggregator::for_date(&loaded.records, date, &self.pricing))
    }

    /// Summaries for today and the `n - 1` days before it, oldest first.
    pub fn last_n_days(&self, n: usize) -> Result<Vec<DailySummary>> {
        self.last_n_days_ending(Local::now().date_naive(), n)
    }

    /// One scan, then one independent aggregation per day ending at `end`.
    pub fn last_n_days_ending(&self, end: NaiveDate, n: usize) -> Result<Vec<DailySummary>> {
        let loaded = self.load()?;
        Ok(Aggregator::for_dates(
            &loaded.records,
            &days_ending(end, n),
            &self.pricing,
        ))
    }

    /// Today's summary and the last `n` days from a single scan.
    pub fn snapshot(&self, n: usize) -> Result<UsageSnapshot> {
        let now = Local::now();
        let today = now.date_naive();
        let loaded = self.load()?;

        let recent = Aggregator::for_dates(&loaded.records, &days_ending(today, n), &self.pricing);
        let today_summary = match recent.last() {
            Some(last) if last.date == today => last.clone(),
            _ => Aggregator::for_date(&loaded.records, today, &self.pricing),
        };

        Ok(UsageSnapshot {
            today: today_summary,
            recent,
            generated_at: now,
        })
    }
}
