//! Aggregator service for per-day usage summaries

use crate::services::{Deduplicator, PricingTable};
use crate::types::{DailySummary, UsageRecord};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::debug;

/// Running totals for one day, frozen into a [`DailySummary`] at the end.
#[derive(Default)]
struct DayAccumulator {
    models: BTreeSet<String>,
    input_tokens: u64,
    output_tokens: u64,
    cache_creation_tokens: u64,
    cache_read_tokens: u64,
    costs: Vec<f64>,
}

impl DayAccumulator {
    fn add(&mut self, record: &UsageRecord, cost: f64) {
        self.input_tokens = self.input_tokens.saturating_add(record.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(record.output_tokens);
        self.cache_creation_tokens = self
            .cache_creation_tokens
            .saturating_add(record.cache_creation_tokens);
        self.cache_read_tokens = self
            .cache_read_tokens
            .saturating_add(record.cache_read_tokens);
        if let Some(model) = &record.model {
            self.models.insert(model.clone());
        }
        self.costs.push(cost);
    }

    fn finish(mut self, date: NaiveDate) -> DailySummary {
        // Sum in sorted order so the total is independent of record order.
        // Start from +0.0: an empty f64 `sum()` is -0.0.
        self.costs.sort_by(f64::total_cmp);
        let total_cost_usd = self.costs.iter().fold(0.0, |acc, cost| acc + cost);

        let total_tokens = self
            .input_tokens
            .saturating_add(self.output_tokens)
            .saturating_add(self.cache_creation_tokens)
            .saturating_add(self.cache_read_tokens);

        DailySummary {
            date,
            models: self.models.into_iter().collect(),
            total_input_tokens: self.input_tokens,
            total_output_tokens: self.output_tokens,
            total_cache_creation_tokens: self.cache_creation_tokens,
            total_cache_read_tokens: self.cache_read_tokens,
            total_tokens,
            total_cost_usd,
        }
    }
}

/// Aggregator for computing daily usage summaries
pub struct Aggregator;

impl Aggregator {
    /// Deduplicate `records` and summarize the local calendar day `date`.
    pub fn aggregate(records: Vec<UsageRecord>, date: NaiveDate) -> DailySummary {
        let records = Deduplicator::dedup(records);
        Self::for_date(&records, date, &PricingTable::new())
    }

    /// Summarize one day from an already deduplicated record set.
    pub fn for_date(records: &[UsageRecord], date: NaiveDate, pricing: &PricingTable) -> DailySummary {
        let dated = Self::index_by_local_date(records);
        Self::summarize(&dated, date, pricing)
    }

    /// Summarize each of `dates` (in the given order) from one deduplicated record set.
    /// Timestamps are resolved once for the whole set.
    pub fn for_dates(
        records: &[UsageRecord],
        dates: &[NaiveDate],
        pricing: &PricingTable,
    ) -> Vec<DailySummary> {
        let dated = Self::index_by_local_date(records);
        dates
            .iter()
            .map(|&date| Self::summarize(&dated, date, pricing))
            .collect()
    }

    /// Pair each record with its local date. Unparseable timestamps are dropped.
    fn index_by_local_date(records: &[UsageRecord]) -> Vec<(NaiveDate, &UsageRecord)> {
        let mut dropped = 0usize;
        let dated: Vec<(NaiveDate, &UsageRecord)> = records
            .iter()
            .filter_map(|record| match record.local_date() {
                Ok(date) => Some((date, record)),
                Err(e) => {
                    dropped += 1;
                    debug!(error = %e, "excluding record");
                    None
                }
            })
            .collect();

        if dropped > 0 {
            debug!(dropped, "records with unparseable timestamps excluded");
        }
        dated
    }

    fn summarize(
        dated: &[(NaiveDate, &UsageRecord)],
        date: NaiveDate,
        pricing: &PricingTable,
    ) -> DailySummary {
        let mut acc = DayAccumulator::default();

        for (_, record) in dated.iter().filter(|(d, _)| *d == date) {
            if record.is_synthetic() {
                continue;
            }
            acc.add(record, pricing.get_or_calculate_cost(record));
        }

        acc.finish(date)
    }
}
