//! Daily power position report.
//!
//! Fetches one trading date's trades, normalizes their sample times and
//! produces the quality, profile and hourly volume reports. Each stage logs
//! its failure to the run log and returns the typed error; nothing is written
//! unless every stage succeeds.

use chrono::Local;
use power_core::{
    AggregatedRow, Config, NormalizedRow, ProfileRow, QualityReport, Result, TradeDate,
};
use power_ingestion::{explode, TimeNormalizer, TradeSource};
use power_reports::{aggregate, profile, SchemaValidator};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::run_log::RunLog;
use crate::writer::{ReportPaths, ReportWriter};

/// The three reports of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSet {
    /// Rows in the normalized table.
    pub rows: usize,
    pub quality: QualityReport,
    pub profile: Vec<ProfileRow>,
    pub aggregated: Vec<AggregatedRow>,
}

/// Run `f` as the named stage, logging its failure before passing it on.
fn stage<T>(name: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    f().map_err(|e| {
        error!(stage = name, kind = ?e.kind(), "ERROR occurred when running {name}: {e}");
        e
    })
}

/// Power position report for one trading date.
pub struct PowerTradersReport<S> {
    date: TradeDate,
    output_location: PathBuf,
    source: S,
    config: Config,
    run_tag: String,
}

impl<S: TradeSource> PowerTradersReport<S> {
    /// Create a report for `date` (`dd/mm/yyyy`) with default configuration.
    ///
    /// Reports go to `output_location`, or to the configured default
    /// location when `None`.
    pub fn new(date: &str, output_location: Option<PathBuf>, source: S) -> Result<Self> {
        Self::with_config(date, output_location, source, Config::default())
    }

    /// Create a report with explicit configuration.
    pub fn with_config(
        date: &str,
        output_location: Option<PathBuf>,
        source: S,
        config: Config,
    ) -> Result<Self> {
        config.validate()?;
        let date: TradeDate = date.parse()?;
        let output_location =
            output_location.unwrap_or_else(|| config.report.output_location.clone());
        let run_tag = Local::now()
            .format(&config.report.run_tag_format)
            .to_string();

        Ok(Self {
            date,
            output_location,
            source,
            config,
            run_tag,
        })
    }

    /// Replace the run tag taken from the clock at construction.
    pub fn with_run_tag(mut self, run_tag: impl Into<String>) -> Self {
        self.run_tag = run_tag.into();
        self
    }

    /// Trading date of this report.
    pub fn date(&self) -> &TradeDate {
        &self.date
    }

    /// Tag embedded in this run's file names.
    pub fn run_tag(&self) -> &str {
        &self.run_tag
    }

    /// Directory receiving the reports.
    pub fn output_location(&self) -> &Path {
        &self.output_location
    }

    /// Configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn run_log(&self) -> RunLog {
        RunLog::open(&self.config.logging, &self.run_tag)
    }

    /// Fetch, explode and normalize the day's trades.
    pub fn get_trade_data(&self) -> Result<Vec<NormalizedRow>> {
        self.run_log().in_scope(|| self.trade_data())
    }

    /// Validate the normalized table and produce the quality report.
    pub fn get_quality_summary(&self) -> Result<QualityReport> {
        self.run_log().in_scope(|| {
            let rows = self.trade_data()?;
            self.quality_summary(&rows)
        })
    }

    /// Profile the text columns of the normalized table.
    pub fn get_data_profile(&self) -> Result<Vec<ProfileRow>> {
        self.run_log().in_scope(|| {
            let rows = self.trade_data()?;
            stage("get_data_profile", || Ok(profile(&rows)))
        })
    }

    /// Hourly volume in trading-day order.
    pub fn get_data_summary(&self) -> Result<Vec<AggregatedRow>> {
        self.run_log().in_scope(|| {
            let rows = self.trade_data()?;
            stage("get_data_summary", || Ok(aggregate(&rows)))
        })
    }

    /// Normalize once and produce all three reports.
    pub fn build_reports(&self) -> Result<ReportSet> {
        self.run_log().in_scope(|| self.reports())
    }

    /// Build and persist all three reports, or none of them.
    pub fn save_report(&self) -> Result<ReportPaths> {
        self.run_log().in_scope(|| {
            stage("save_report", || {
                let reports = self.reports()?;
                ReportWriter::new(
                    &self.output_location,
                    &self.config.report.file_prefix,
                    &self.run_tag,
                )
                .write(&reports)
            })
        })
    }

    fn trade_data(&self) -> Result<Vec<NormalizedRow>> {
        stage("get_trade_data", || {
            let trades = self.source.get_trades(&self.date)?;
            let flat = explode(trades)?;
            let normalizer = TimeNormalizer::new(&self.config.normalization)?;
            let (rows, stats) = normalizer.normalize_with_stats(flat)?;
            debug!(
                date = %self.date,
                rows = rows.len(),
                inferred = stats.inferred_times,
                wraps = stats.wrap_fixups,
                irregular = stats.irregular_intervals,
                "trade data normalized"
            );
            Ok(rows)
        })
    }

    fn quality_summary(&self, rows: &[NormalizedRow]) -> Result<QualityReport> {
        stage("get_quality_summary", || {
            SchemaValidator::new(&self.config.validation)?.validate(rows)
        })
    }

    fn reports(&self) -> Result<ReportSet> {
        let rows = self.trade_data()?;
        let quality = self.quality_summary(&rows)?;
        let profile = stage("get_data_profile", || Ok(profile(&rows)))?;
        let aggregated = stage("get_data_summary", || Ok(aggregate(&rows)))?;

        Ok(ReportSet {
            rows: rows.len(),
            quality,
            profile,
            aggregated,
        })
    }
}
