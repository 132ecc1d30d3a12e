//! Report computation over a normalized trade table.
//!
//! This crate handles:
//! - Schema validation and the quality report
//! - Per-column profiling
//! - Hourly volume aggregation in trading-day order
//!
//! All three are read-only over the finished table and independent of each
//! other.

pub mod aggregator;
pub mod profiler;
pub mod validator;

pub use aggregator::{aggregate, trading_day_position, HourlyAggregator, DAY_START_BUCKET};
pub use profiler::{profile, PROFILED_COLUMNS};
pub use validator::{SchemaRule, SchemaValidator, SchemaViolation, QUALITY_CHECKS};
