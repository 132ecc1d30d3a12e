//! Schema validation of the normalized table.
//!
//! Every rule must hold on every row. A passing table yields a fixed quality
//! report; a failing one yields an error naming each violated rule and row.

use power_core::config::ValidationConfig;
use power_core::{Error, NormalizedRow, QualityCheck, QualityReport, Result};
use regex::Regex;
use std::fmt;
use tracing::debug;

/// Checks listed in the quality report, with their confirmation labels.
pub const QUALITY_CHECKS: [(&str, &str); 4] = [
    ("time_format", "correct"),
    ("date_format", "correct"),
    ("minute_interval", "5min"),
    ("id", "not null"),
];

/// Violations quoted in a validation error message.
const MAX_REPORTED_VIOLATIONS: usize = 5;

/// A schema rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaRule {
    /// `date` is present.
    DatePresent,
    /// `id` is present.
    IdPresent,
    /// `time_fixed` is `HH:MM`.
    TimeFixedFormat,
    /// `hour_within` is `HH:00`.
    HourWithinFormat,
    /// `interval` equals the expected step.
    IntervalEqualsStep,
}

impl SchemaRule {
    /// Column the rule applies to.
    pub fn column(self) -> &'static str {
        match self {
            SchemaRule::DatePresent => "date",
            SchemaRule::IdPresent => "id",
            SchemaRule::TimeFixedFormat => "time_fixed",
            SchemaRule::HourWithinFormat => "hour_within",
            SchemaRule::IntervalEqualsStep => "interval",
        }
    }
}

impl fmt::Display for SchemaRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SchemaRule::DatePresent => "date must not be null",
            SchemaRule::IdPresent => "id must not be null",
            SchemaRule::TimeFixedFormat => "time_fixed must match HH:MM",
            SchemaRule::HourWithinFormat => "hour_within must match HH:00",
            SchemaRule::IntervalEqualsStep => "interval must equal the sampling step",
        };
        f.write_str(text)
    }
}

/// One failed rule on one row.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaViolation {
    pub rule: SchemaRule,
    pub row: usize,
    /// Offending value as text.
    pub value: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {} (got {:?})", self.row, self.rule, self.value)
    }
}

/// Validates normalized tables against the quality schema.
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    time_fixed: Regex,
    hour_within: Regex,
    expected_interval: f64,
}

impl SchemaValidator {
    /// Create a validator from configuration.
    pub fn new(config: &ValidationConfig) -> Result<Self> {
        let compile = |name: &str, pattern: &str| {
            Regex::new(pattern).map_err(|e| Error::config(format!("{name} pattern: {e}")))
        };

        Ok(Self {
            time_fixed: compile("time_fixed", &config.time_fixed_pattern)?,
            hour_within: compile("hour_within", &config.hour_within_pattern)?,
            expected_interval: config.expected_interval,
        })
    }

    /// Every rule violation in the table, in row order.
    pub fn check(&self, rows: &[NormalizedRow]) -> Vec<SchemaViolation> {
        let mut violations = Vec::new();
        let mut fail = |rule, row, value: &str| {
            violations.push(SchemaViolation {
                rule,
                row,
                value: value.to_string(),
            })
        };

        for (i, r) in rows.iter().enumerate() {
            if r.row.date.trim().is_empty() {
                fail(SchemaRule::DatePresent, i, &r.row.date);
            }
            if r.row.id.trim().is_empty() {
                fail(SchemaRule::IdPresent, i, &r.row.id);
            }
            if !self.time_fixed.is_match(&r.time_fixed) {
                fail(SchemaRule::TimeFixedFormat, i, &r.time_fixed);
            }
            if !self.hour_within.is_match(&r.hour_within) {
                fail(SchemaRule::HourWithinFormat, i, &r.hour_within);
            }
            if r.interval != self.expected_interval {
                fail(SchemaRule::IntervalEqualsStep, i, &r.interval.to_string());
            }
        }

        violations
    }

    /// Validate the table, producing the quality report if every rule holds.
    pub fn validate(&self, rows: &[NormalizedRow]) -> Result<QualityReport> {
        let violations = self.check(rows);
        if !violations.is_empty() {
            let quoted: Vec<String> = violations
                .iter()
                .take(MAX_REPORTED_VIOLATIONS)
                .map(ToString::to_string)
                .collect();
            let more = violations.len().saturating_sub(MAX_REPORTED_VIOLATIONS);
            let mut msg = format!(
                "{} schema violation(s): {}",
                violations.len(),
                quoted.join("; ")
            );
            if more > 0 {
                msg.push_str(&format!("; and {more} more"));
            }
            return Err(Error::validation(msg));
        }

        debug!(rows = rows.len(), "schema validation passed");
        Ok(Self::passed_report())
    }

    /// The fixed report of a passing validation.
    pub fn passed_report() -> QualityReport {
        QualityReport {
            checks: QUALITY_CHECKS
                .iter()
                .map(|(check, result)| QualityCheck {
                    check: check.to_string(),
                    result: result.to_string(),
                })
                .collect(),
        }
    }
}
