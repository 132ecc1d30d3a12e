//! Configuration structures for the power position reporting system.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::parse_hhmm;

/// Main configuration for the reporting pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Timestamp reconstruction configuration.
    pub normalization: NormalizationConfig,
    /// Schema validation configuration.
    pub validation: ValidationConfig,
    /// Report output configuration.
    pub report: ReportConfig,
    /// Per-run log configuration.
    pub logging: LoggingConfig,
    /// Synthetic trade source configuration.
    pub synthetic: SyntheticConfig,
}

impl Config {
    /// Load configuration from a JSON file. Missing sections take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {e}", path.display())))?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        let n = &self.normalization;
        if n.step_minutes <= 0 {
            return Err(Error::config("normalization.step_minutes must be positive"));
        }
        parse_hhmm(&n.initial_time)
            .map_err(|e| Error::config(format!("normalization.initial_time: {e}")))?;

        for (name, pattern) in [
            ("validation.time_fixed_pattern", &self.validation.time_fixed_pattern),
            ("validation.hour_within_pattern", &self.validation.hour_within_pattern),
        ] {
            Regex::new(pattern).map_err(|e| Error::config(format!("{name}: {e}")))?;
        }

        if self.report.file_prefix.is_empty() {
            return Err(Error::config("report.file_prefix must not be empty"));
        }

        let s = &self.synthetic;
        if s.volume_min > s.volume_max {
            return Err(Error::config("synthetic.volume_min exceeds volume_max"));
        }
        if !(0.0..=1.0).contains(&s.missing_time_probability) {
            return Err(Error::config(
                "synthetic.missing_time_probability must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

/// Timestamp reconstruction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Carry state at the start of every run.
    pub initial_time: String,
    /// Sampling step in minutes; a missing time is inferred as previous + step.
    pub step_minutes: i64,
    /// The single interval treated as a legitimate midnight wrap.
    pub wrap_interval_minutes: i64,
    /// Interval assigned to the first row of a run.
    pub first_row_interval: f64,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            initial_time: "00:00".to_string(),
            step_minutes: 5,
            wrap_interval_minutes: -1435,
            first_row_interval: 5.0,
        }
    }
}

/// Schema validation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Required value of every row's interval.
    pub expected_interval: f64,
    /// Pattern every `time_fixed` must match in full.
    pub time_fixed_pattern: String,
    /// Pattern every `hour_within` must match in full.
    pub hour_within_pattern: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            expected_interval: 5.0,
            time_fixed_pattern: r"^\d{2}:\d{2}$".to_string(),
            hour_within_pattern: r"^\d{2}:00$".to_string(),
        }
    }
}

/// Report output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory used when no output location is passed explicitly.
    pub output_location: PathBuf,
    /// File name prefix of every report.
    pub file_prefix: String,
    /// chrono format of the run tag embedded in file names.
    pub run_tag_format: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_location: PathBuf::from("reports"),
            file_prefix: "PowerPosition".to_string(),
            run_tag_format: "%Y%m%d_%H%M".to_string(),
        }
    }
}

/// Per-run log configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory holding per-run log files.
    pub log_dir: PathBuf,
    /// Log file name prefix; the run tag is appended.
    pub log_file_prefix: String,
    /// Minimum level written to the run log (trace, debug, info, warn, error).
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            log_file_prefix: "error_message".to_string(),
            level: "error".to_string(),
        }
    }
}

/// Synthetic trade source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    /// Number of trades generated per day.
    pub trade_count: usize,
    /// Minutes between samples.
    pub step_minutes: u32,
    /// Smallest generated volume.
    pub volume_min: u32,
    /// Largest generated volume.
    pub volume_max: u32,
    /// Chance that a sample's time is dropped.
    pub missing_time_probability: f64,
    /// RNG seed; the same seed and date always give the same trades.
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            trade_count: 2,
            step_minutes: 5,
            volume_min: 0,
            volume_max: 1000,
            missing_time_probability: 0.05,
            seed: 42,
        }
    }
}
