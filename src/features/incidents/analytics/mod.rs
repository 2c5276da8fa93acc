//! Date normalization, latest-period resolution and aggregation

pub mod aggregator;
pub mod normalizer;
pub mod period;

pub use period::LatestPeriod;
