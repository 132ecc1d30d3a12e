//! Core types and configuration for the power position reporting system.
//!
//! This crate provides shared types used across all other crates:
//! - Trade record types for each pipeline stage (raw, flat, normalized)
//! - Report row types (quality, profile, aggregation)
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use types::*;
