//! Daily power position reporting pipeline.
//!
//! This crate provides:
//! - Report orchestration for one trading date
//! - A scoped per-run log file
//! - All-or-nothing CSV persistence of the three reports

pub mod report;
pub mod run_log;
pub mod writer;

pub use report::{PowerTradersReport, ReportSet};
pub use run_log::RunLog;
pub use writer::{ReportPaths, ReportWriter};
