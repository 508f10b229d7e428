//! Pricing table for cost calculation
//!
//! Static per-million-token rates for the four token classes, selected by
//! substring match on the model identifier. Records that already carry a
//! precomputed `costUSD` keep it; the table is only a fallback.

use crate::types::UsageRecord;
use serde::Serialize;

/// Rates are quoted per this many tokens.
pub const TOKENS_PER_RATE_UNIT: f64 = 1_000_000.0;

/// One of the four independently priced token categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Input,
    Output,
    CacheCreate,
    CacheRead,
}

impl TokenClass {
    pub const ALL: [TokenClass; 4] = [
        TokenClass::Input,
        TokenClass::Output,
        TokenClass::CacheCreate,
        TokenClass::CacheRead,
    ];
}

/// USD per million tokens for each token class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricingRate {
    pub input_per_million: f64,
    pub output_per_million: f64,
    pub cache_creation_per_million: f64,
    pub cache_read_per_million: f64,
}

impl PricingRate {
    pub fn per_million(&self, class: TokenClass) -> f64 {
        match class {
            TokenClass::Input => self.input_per_million,
            TokenClass::Output => self.output_per_million,
            TokenClass::CacheCreate => self.cache_creation_per_million,
            TokenClass::CacheRead => self.cache_read_per_million,
        }
    }

    pub fn cost(&self, class: TokenClass, tokens: u64) -> f64 {
        tokens as f64 * self.per_million(class) / TOKENS_PER_RATE_UNIT
    }
}

const OPUS: PricingRate = PricingRate {
    input_per_million: 15.0,
    output_per_million: 75.0,
    cache_creation_per_million: 18.75,
    cache_read_per_million: 1.5,
};

const SONNET: PricingRate = PricingRate {
    input_per_million: 3.0,
    output_per_million: 15.0,
    cache_creation_per_million: 3.75,
    cache_read_per_million: 0.3,
};

const HAIKU: PricingRate = PricingRate {
    input_per_million: 0.25,
    output_per_million: 1.25,
    cache_creation_per_million: 0.3125,
    cache_read_per_million: 0.025,
};

/// Pricing bracket chosen from the model identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingTier {
    Opus,
    Sonnet,
    Haiku,
    /// Unrecognized models, billed at sonnet rates
    Default,
}

impl PricingTier {
    pub const ALL: [PricingTier; 4] = [
        PricingTier::Opus,
        PricingTier::Sonnet,
        PricingTier::Haiku,
        PricingTier::Default,
    ];

    /// Substring dispatch, first match wins: `opus-4`, `sonnet-4`, `haiku`.
    pub fn for_model(model: &str) -> Self {
        if model.contains("opus-4") {
            PricingTier::Opus
        } else if model.contains("sonnet-4") {
            PricingTier::Sonnet
        } else if model.contains("haiku") {
            PricingTier::Haiku
        } else {
            PricingTier::Default
        }
    }

    pub fn rate(self) -> PricingRate {
        match self {
            PricingTier::Opus => OPUS,
            PricingTier::Sonnet | PricingTier::Default => SONNET,
            PricingTier::Haiku => HAIKU,
        }
    }
}

/// Model-to-rate lookup and per-record cost calculation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingTable;

impl PricingTable {
    pub fn new() -> Self {
        Self
    }

    pub fn rate_for(&self, model: &str) -> PricingRate {
        PricingTier::for_model(model).rate()
    }

    /// Cost of `tokens` tokens of one class for `model`.
    pub fn cost(&self, model: &str, class: TokenClass, tokens: u64) -> f64 {
        self.rate_for(model).cost(class, tokens)
    }

    /// Calculate cost from tokens (always calculates, ignores cost_usd)
    pub fn calculate_cost(&self, record: &UsageRecord) -> f64 {
        let rate = self.rate_for(record.model_or_unknown());

        rate.cost(TokenClass::Input, record.input_tokens)
            + rate.cost(TokenClass::Output, record.output_tokens)
            + rate.cost(TokenClass::CacheCreate, record.cache_creation_tokens)
            + rate.cost(TokenClass::CacheRead, record.cache_read_tokens)
    }

    /// Precomputed `cost_usd` when present (even zero), else the table cost.
    pub fn get_or_calculate_cost(&self, record: &UsageRecord) -> f64 {
        match record.cost_usd {
            Some(cost) => cost,
            None => self.calculate_cost(record),
        }
    }
}
