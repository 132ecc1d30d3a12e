//! Trade sources.
//!
//! A trade source returns one day's raw trades. The pipeline only sees the
//! [`TradeSource`] trait; the implementations here cover fixed in-memory
//! data, JSON files exported from the trading service, and a seeded
//! synthetic generator shaped like the trading service's output.

use chrono::Datelike;
use power_core::config::SyntheticConfig;
use power_core::{Error, RawTradeRecord, Result, TradeDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Supplier of a day's raw trades.
pub trait TradeSource {
    /// Fetch all trades for `date`.
    fn get_trades(&self, date: &TradeDate) -> Result<Vec<RawTradeRecord>>;
}

impl<S: TradeSource + ?Sized> TradeSource for &S {
    fn get_trades(&self, date: &TradeDate) -> Result<Vec<RawTradeRecord>> {
        (**self).get_trades(date)
    }
}

impl<S: TradeSource + ?Sized> TradeSource for Box<S> {
    fn get_trades(&self, date: &TradeDate) -> Result<Vec<RawTradeRecord>> {
        (**self).get_trades(date)
    }
}

/// Returns the same records for every date.
#[derive(Debug, Clone, Default)]
pub struct StaticTradeSource {
    records: Vec<RawTradeRecord>,
}

impl StaticTradeSource {
    /// Create a source over fixed records.
    pub fn new(records: Vec<RawTradeRecord>) -> Self {
        Self { records }
    }
}

impl TradeSource for StaticTradeSource {
    fn get_trades(&self, _date: &TradeDate) -> Result<Vec<RawTradeRecord>> {
        Ok(self.records.clone())
    }
}

/// Reads `<dir>/<yyyymmdd>.json`, an array of trade objects.
#[derive(Debug, Clone)]
pub struct JsonTradeSource {
    dir: PathBuf,
}

impl JsonTradeSource {
    /// Create a source reading from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File holding the trades for `date`.
    pub fn path_for(&self, date: &TradeDate) -> PathBuf {
        self.dir.join(format!("{}.json", date.compact()))
    }
}

impl TradeSource for JsonTradeSource {
    fn get_trades(&self, date: &TradeDate) -> Result<Vec<RawTradeRecord>> {
        let path = self.path_for(date);
        let raw = fs::read_to_string(&path)
            .map_err(|e| Error::source(format!("cannot read {}: {e}", path.display())))?;
        let records: Vec<RawTradeRecord> = serde_json::from_str(&raw)
            .map_err(|e| Error::source(format!("malformed trades in {}: {e}", path.display())))?;

        debug!(path = %path.display(), trades = records.len(), "loaded trades");
        Ok(records)
    }
}

/// Seeded stand-in for the trading service.
///
/// Each trade covers one trading day: samples every `step_minutes` from
/// 23:00 on the previous calendar day through the last step before 23:00.
#[derive(Debug, Clone)]
pub struct SyntheticTradeSource {
    config: SyntheticConfig,
}

impl SyntheticTradeSource {
    /// Create a generator.
    pub fn new(config: SyntheticConfig) -> Self {
        Self { config }
    }
}

/// First sample of a trading day, in minutes after midnight (23:00).
const DAY_START_MINUTE: u32 = 23 * 60;
const MINUTES_PER_DAY: u32 = 24 * 60;

impl TradeSource for SyntheticTradeSource {
    fn get_trades(&self, date: &TradeDate) -> Result<Vec<RawTradeRecord>> {
        let c = &self.config;
        if c.step_minutes == 0
            || c.volume_min > c.volume_max
            || !(0.0..=1.0).contains(&c.missing_time_probability)
        {
            return Err(Error::source("synthetic source misconfigured"));
        }
        let samples = (MINUTES_PER_DAY / c.step_minutes) as usize;

        let seed = c.seed.wrapping_add(date.date().num_days_from_ce() as u64);
        let mut rng = StdRng::seed_from_u64(seed);

        let records = (0..c.trade_count)
            .map(|_| {
                let id = format!("{:032x}", rng.gen::<u128>());
                let mut minute = DAY_START_MINUTE;
                let mut times = Vec::with_capacity(samples);
                let mut volumes = Vec::with_capacity(samples);

                for _ in 0..samples {
                    let missing = rng.gen_bool(c.missing_time_probability);
                    times.push((!missing).then(|| format!("{:02}:{:02}", minute / 60, minute % 60)));
                    volumes.push(f64::from(rng.gen_range(c.volume_min..=c.volume_max)));
                    minute = (minute + c.step_minutes) % MINUTES_PER_DAY;
                }

                RawTradeRecord {
                    id,
                    date: date.to_string(),
                    times,
                    volumes,
                }
            })
            .collect();

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> TradeDate {
        "01/04/2024".parse().unwrap()
    }

    #[test]
    fn test_static_source() {
        let record = RawTradeRecord {
            id: "A".to_string(),
            date: "01/04/2024".to_string(),
            times: vec![Some("23:00".to_string())],
            volumes: vec![1.0],
        };
        let source = StaticTradeSource::new(vec![record.clone()]);
        assert_eq!(source.get_trades(&date()).unwrap(), vec![record]);
    }

    #[test]
    fn test_json_source_reads_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("20240401.json"),
            r#"[{"id":"A","date":"01/04/2024","time":["23:00",null],"volume":[5,6]}]"#,
        )
        .unwrap();

        let source = JsonTradeSource::new(dir.path());
        let trades = source.get_trades(&date()).unwrap();

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].times, vec![Some("23:00".to_string()), None]);
    }

    #[test]
    fn test_json_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonTradeSource::new(dir.path()).get_trades(&date()).unwrap_err();
        assert!(matches!(err, Error::Source(_)));
    }

    #[test]
    fn test_json_source_malformed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("20240401.json"), r#"{"id": 1}"#).unwrap();
        let err = JsonTradeSource::new(dir.path()).get_trades(&date()).unwrap_err();
        assert!(matches!(err, Error::Source(_)));
    }

    #[test]
    fn test_synthetic_shape() {
        let source = SyntheticTradeSource::new(SyntheticConfig {
            trade_count: 3,
            missing_time_probability: 0.0,
            ..Default::default()
        });
        let trades = source.get_trades(&date()).unwrap();

        assert_eq!(trades.len(), 3);
        for trade in &trades {
            assert_eq!(trade.date, "01/04/2024");
            assert_eq!(trade.times.len(), 288);
            assert_eq!(trade.volumes.len(), 288);
            assert_eq!(trade.times[0].as_deref(), Some("23:00"));
            assert_eq!(trade.times[12].as_deref(), Some("00:00"));
            assert_eq!(trade.times[287].as_deref(), Some("22:55"));
            assert!(trade.volumes.iter().all(|v| (0.0..=1000.0).contains(v)));
        }
    }

    #[test]
    fn test_synthetic_is_deterministic() {
        let source = SyntheticTradeSource::new(SyntheticConfig {
            missing_time_probability: 0.2,
            ..Default::default()
        });
        assert_eq!(
            source.get_trades(&date()).unwrap(),
            source.get_trades(&date()).unwrap()
        );
    }

    #[test]
    fn test_synthetic_drops_times() {
        let source = SyntheticTradeSource::new(SyntheticConfig {
            missing_time_probability: 1.0,
            ..Default::default()
        });
        let trades = source.get_trades(&date()).unwrap();
        assert!(trades.iter().flat_map(|t| &t.times).all(Option::is_none));
    }
}
