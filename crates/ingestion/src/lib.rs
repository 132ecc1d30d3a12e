//! Trade ingestion and timestamp normalization for the power position system.
//!
//! This crate handles:
//! - Fetching a day's raw trades from a trade source
//! - Exploding per-trade parallel arrays into one row per sample
//! - Reconstructing missing or anomalous sample times (sequential, stateful)

pub mod exploder;
pub mod normalizer;
pub mod source;

pub use exploder::explode;
pub use normalizer::{NormalizationState, NormalizationStats, ResolvedTime, TimeNormalizer};
pub use source::{JsonTradeSource, StaticTradeSource, SyntheticTradeSource, TradeSource};
