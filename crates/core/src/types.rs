//! Core data types for the power position reporting system.

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Volume type.
pub type Volume = f64;

/// Input format of a trading date.
pub const TRADE_DATE_FORMAT: &str = "%d/%m/%Y";

/// Format of a time-of-day field.
pub const TIME_FORMAT: &str = "%H:%M";

/// Parse an `HH:MM` time-of-day.
#[inline]
pub fn parse_hhmm(s: &str) -> Result<NaiveTime> {
    if s.trim() != s {
        return Err(Error::parse(format!("{s:?} is not a valid HH:MM time (surrounding whitespace)")));
    }
    NaiveTime::parse_from_str(s, TIME_FORMAT)
        .map_err(|e| Error::parse(format!("{s:?} is not a valid HH:MM time ({e})")))
}

/// Format a time-of-day as zero-padded `HH:MM`.
#[inline]
pub fn format_hhmm(t: NaiveTime) -> String {
    format!("{:02}:{:02}", t.hour(), t.minute())
}

/// Hour bucket label `HH:00` for a time-of-day.
#[inline]
pub fn hour_bucket(t: NaiveTime) -> String {
    format!("{:02}:00", t.hour())
}

/// A trading date, written `dd/mm/yyyy` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TradeDate(NaiveDate);

impl TradeDate {
    /// Wrap a calendar date.
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Underlying calendar date.
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Compact `yyyymmdd` form, used for file names.
    pub fn compact(&self) -> String {
        self.0.format("%Y%m%d").to_string()
    }
}

impl FromStr for TradeDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s.trim(), TRADE_DATE_FORMAT)
            .map(TradeDate)
            .map_err(|e| Error::parse(format!("trade date {s:?} must be dd/mm/yyyy ({e})")))
    }
}

impl fmt::Display for TradeDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TRADE_DATE_FORMAT))
    }
}

/// One trade as delivered by the trade source.
///
/// `times` and `volumes` are index-aligned: sample `k` of this trade is
/// `(times[k], volumes[k])`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTradeRecord {
    /// Trade identifier.
    pub id: String,
    /// Trading date as supplied by the source.
    pub date: String,
    /// Sample times, `HH:MM` or missing.
    #[serde(rename = "time")]
    pub times: Vec<Option<String>>,
    /// Sample volumes.
    #[serde(rename = "volume")]
    pub volumes: Vec<Volume>,
}

/// One sample of one trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRow {
    pub date: String,
    pub id: String,
    /// Raw time field, `None` when the source had no timestamp.
    pub time: Option<String>,
    pub volume: Volume,
}

/// A flat row with its reconstructed timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow {
    /// Original sample.
    #[serde(flatten)]
    pub row: FlatRow,
    /// Reconstructed time, `HH:MM`.
    pub time_fixed: String,
    /// Hour bucket, `HH:00`.
    pub hour_within: String,
    /// Minutes since the previous row's `time_fixed`.
    pub interval: f64,
}

/// One named quality check and its result label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityCheck {
    pub check: String,
    pub result: String,
}

/// Evidence that schema validation ran and passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityReport {
    pub checks: Vec<QualityCheck>,
}

impl QualityReport {
    /// Result label of the named check.
    pub fn result(&self, check: &str) -> Option<&str> {
        self.checks
            .iter()
            .find(|c| c.check == check)
            .map(|c| c.result.as_str())
    }
}

/// Descriptive statistics for one text column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRow {
    /// Column name.
    pub columns: String,
    /// Non-null values.
    pub count: usize,
    /// Rows minus non-null values.
    pub total_missing_value: usize,
    /// Distinct non-null values.
    pub unique: usize,
}

/// Summed volume for one hour bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRow {
    #[serde(rename = "Local Time")]
    pub local_time: String,
    #[serde(rename = "Volume")]
    pub volume: Volume,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_format_hhmm() {
        let t = parse_hhmm("07:05").unwrap();
        assert_eq!(format_hhmm(t), "07:05");
        assert_eq!(hour_bucket(t), "07:00");
    }

    #[test]
    fn test_parse_hhmm_rejects_garbage() {
        assert!(parse_hhmm("abc").is_err());
        assert!(parse_hhmm("24:00").is_err());
        assert!(parse_hhmm("").is_err());
    }

    #[test]
    fn test_parse_hhmm_rejects_padding() {
        assert!(parse_hhmm(" 07:05").is_err());
        assert!(parse_hhmm("07:05 ").is_err());
        assert!(parse_hhmm("07:05\n").is_err());
    }

    #[test]
    fn test_trade_date_round_trip() {
        let date: TradeDate = "01/04/2024".parse().unwrap();
        assert_eq!(date.date(), NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(date.to_string(), "01/04/2024");
        assert_eq!(date.compact(), "20240401");
    }

    #[test]
    fn test_trade_date_rejects_iso() {
        assert!("2024-04-01".parse::<TradeDate>().is_err());
        assert!("31/02/2024".parse::<TradeDate>().is_err());
    }

    #[test]
    fn test_raw_record_wire_shape() {
        let json = r#"{"id":"A","date":"01/01/2024","time":["23:55",null],"volume":[10,20]}"#;
        let record: RawTradeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.times, vec![Some("23:55".to_string()), None]);
        assert_eq!(record.volumes, vec![10.0, 20.0]);
    }

    #[test]
    fn test_quality_report_lookup() {
        let report = QualityReport {
            checks: vec![QualityCheck {
                check: "id".to_string(),
                result: "not null".to_string(),
            }],
        };
        assert_eq!(report.result("id"), Some("not null"));
        assert_eq!(report.result("missing"), None);
    }
}
