//! Services for deduplication, pricing, aggregation and querying

pub mod aggregator;
pub mod dedup;
pub mod normalizer;
pub mod pricing;
pub mod query;
pub mod scheduler;

pub use aggregator::Aggregator;
pub use dedup::Deduplicator;
pub use normalizer::{model_family, short_model_name};
pub use pricing::{PricingRate, PricingTable, PricingTier, TokenClass};
pub use query::{days_ending, LoadStats, LoadedRecords, UsageQueryService, UsageSnapshot};
pub use scheduler::{
    RefreshHandle, RefreshReport, RefreshScheduler, RefreshTrigger, DEFAULT_REFRESH_INTERVAL,
};
