//! Usage types for token tracking

use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{Result, UsageError};

/// Placeholder model identifier for responses that never reached the API.
pub const SYNTHETIC_MODEL: &str = "<synthetic>";

/// Model identifier used for pricing when a record carries none.
pub const UNKNOWN_MODEL: &str = "unknown";

/// Parse an extended ISO-8601 timestamp with fractional seconds and an offset.
///
/// `2025-06-01T10:15:30.123Z` and `2025-06-01T10:15:30.5+02:00` are accepted;
/// `2025-06-01T10:15:30Z` (no fraction), `2025-06-01 10:15:30.1Z` and the
/// lowercase `t` / `z` designators are not.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>> {
    let bytes = raw.as_bytes();
    // Date and time are fixed width, so the separator and the fraction dot
    // always sit at the same offsets.
    if bytes.get(10) != Some(&b'T')
        || bytes.get(19) != Some(&b'.')
        || bytes.last() == Some(&b'z')
    {
        return Err(UsageError::UnparseableTimestamp(raw.to_string()));
    }
    DateTime::parse_from_rfc3339(raw).map_err(|_| UsageError::UnparseableTimestamp(raw.to_string()))
}

/// One usage-bearing log line. Immutable once parsed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UsageRecord {
    /// Raw ISO-8601 timestamp as written in the log
    pub timestamp: String,
    pub message_id: Option<String>,
    pub request_id: Option<String>,
    pub model: Option<String>,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_creation_tokens: u64,
    pub cache_read_tokens: u64,
    /// Precomputed cost; wins over table pricing whenever present
    pub cost_usd: Option<f64>,
}

impl UsageRecord {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens
            .saturating_add(self.output_tokens)
            .saturating_add(self.cache_creation_tokens)
            .saturating_add(self.cache_read_tokens)
    }

    /// Model identifier for pricing, `"unknown"` when absent.
    pub fn model_or_unknown(&self) -> &str {
        self.model.as_deref().unwrap_or(UNKNOWN_MODEL)
    }

    pub fn is_synthetic(&self) -> bool {
        self.model.as_deref() == Some(SYNTHETIC_MODEL)
    }

    /// `messageId:requestId`, only when both halves are present.
    pub fn dedup_key(&self) -> Option<String> {
        match (&self.message_id, &self.request_id) {
            (Some(msg), Some(req)) => Some(format!("{}:{}", msg, req)),
            _ => None,
        }
    }

    pub fn parsed_timestamp(&self) -> Result<DateTime<FixedOffset>> {
        parse_timestamp(&self.timestamp)
    }

    /// Calendar date of the timestamp in the host's local time zone.
    pub fn local_date(&self) -> Result<NaiveDate> {
        Ok(self.parsed_timestamp()?.with_timezone(&Local).date_naive())
    }
}

/// Token and cost roll-up for one local calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailySummary {
    pub date: NaiveDate,
    /// Distinct model identifiers, ascending
    pub models: Vec<String>,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_cache_creation_tokens: u64,
    pub total_cache_read_tokens: u64,
    pub total_tokens: u64,
    pub total_cost_usd: f64,
}

impl DailySummary {
    /// Summary of a day with no usage.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            models: Vec::new(),
            total_input_tokens: 0,
            total_output_tokens: 0,
            total_cache_creation_tokens: 0,
            total_cache_read_tokens: 0,
            total_tokens: 0,
            total_cost_usd: 0.0,
        }
    }

    pub fn has_usage(&self) -> bool {
        self.total_tokens > 0 || self.total_cost_usd > 0.0
    }
}

/// Totals across a run of daily summaries (e.g. the last seven days).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PeriodTotals {
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_cache_creation_tokens: u64,
    pub total_cache_read_tokens: u64,
    pub total_tokens: u64,
    pub total_cost_usd: f64,
    /// Days with any token usage
    pub active_days: u32,
    pub peak_day: Option<(NaiveDate, f64)>,
}

impl PeriodTotals {
    pub fn from_daily_summaries(summaries: &[DailySummary]) -> Self {
        let mut totals = Self::default();

        for summary in summaries {
            totals.total_input_tokens = totals
                .total_input_tokens
                .saturating_add(summary.total_input_tokens);
            totals.total_output_tokens = totals
                .total_output_tokens
                .saturating_add(summary.total_output_tokens);
            totals.total_cache_creation_tokens = totals
                .total_cache_creation_tokens
                .saturating_add(summary.total_cache_creation_tokens);
            totals.total_cache_read_tokens = totals
                .total_cache_read_tokens
                .saturating_add(summary.total_cache_read_tokens);
            totals.total_tokens = totals.total_tokens.saturating_add(summary.total_tokens);
            totals.total_cost_usd += summary.total_cost_usd;

            if summary.total_tokens > 0 {
                totals.active_days += 1;
            }

            // Highest spend wins; first day keeps a tie
            match totals.peak_day {
                Some((_, peak)) if summary.total_cost_usd <= peak => {}
                _ if summary.total_cost_usd > 0.0 => {
                    totals.peak_day = Some((summary.date, summary.total_cost_usd));
                }
                _ => {}
            }
        }

        totals
    }

    pub fn daily_avg_cost(&self) -> f64 {
        if self.active_days == 0 {
            0.0
        } else {
            self.total_cost_usd / self.active_days as f64
        }
    }
}
