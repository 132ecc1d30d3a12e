//! Sample time reconstruction.
//!
//! Rows are resolved strictly in order: a missing time is inferred from the
//! previous row's resolved time, and each row's interval is measured against
//! it. The carried time lives in a [`NormalizationState`] owned by a single
//! call to [`TimeNormalizer::normalize`], so independent runs never share it.

use chrono::{Duration, NaiveTime};
use power_core::config::NormalizationConfig;
use power_core::{format_hhmm, hour_bucket, parse_hhmm, Error, FlatRow, NormalizedRow, Result};
use tracing::{debug, warn};

/// Time and interval resolved for one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTime {
    /// Resolved time-of-day.
    pub time: NaiveTime,
    /// Whole minutes since the previous resolved time.
    pub interval_minutes: i64,
    /// The raw time was missing and has been inferred.
    pub inferred: bool,
    /// The interval was a midnight wrap corrected to one step.
    pub wrapped: bool,
}

/// Statistics about one normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizationStats {
    /// Rows processed.
    pub rows: u64,
    /// Rows whose time was missing and inferred.
    pub inferred_times: u64,
    /// Midnight wraps corrected to one step.
    pub wrap_fixups: u64,
    /// Rows after the first whose interval is not one step.
    pub irregular_intervals: u64,
}

/// Carry state of a normalization pass.
///
/// A segmented scan can seed a state with the last resolved time of the
/// preceding segment via [`NormalizationState::starting_at`].
#[derive(Debug, Clone)]
pub struct NormalizationState {
    previous_time: NaiveTime,
    step: Duration,
    wrap_interval_minutes: i64,
}

impl NormalizationState {
    /// Create a state carrying `previous_time`.
    pub fn starting_at(
        previous_time: NaiveTime,
        step_minutes: i64,
        wrap_interval_minutes: i64,
    ) -> Self {
        Self {
            previous_time,
            step: Duration::minutes(step_minutes),
            wrap_interval_minutes,
        }
    }

    /// Last resolved time.
    pub fn previous_time(&self) -> NaiveTime {
        self.previous_time
    }

    /// Resolve the next raw time and advance the carry.
    pub fn advance(&mut self, raw: Option<&str>) -> Result<ResolvedTime> {
        let (time, inferred) = match raw {
            Some(s) => (parse_hhmm(s)?, false),
            None => (self.previous_time.overflowing_add_signed(self.step).0, true),
        };

        let mut interval_minutes = time.signed_duration_since(self.previous_time).num_minutes();
        // 23:55 -> 00:00 is the one wrap that counts as a regular step.
        let wrapped = interval_minutes == self.wrap_interval_minutes;
        if wrapped {
            interval_minutes = self.step.num_minutes();
        }

        self.previous_time = time;

        Ok(ResolvedTime {
            time,
            interval_minutes,
            inferred,
            wrapped,
        })
    }
}

/// Reconstructs `time_fixed`, `hour_within` and `interval` for a table.
#[derive(Debug, Clone)]
pub struct TimeNormalizer {
    initial_time: NaiveTime,
    step_minutes: i64,
    wrap_interval_minutes: i64,
    first_row_interval: f64,
}

impl TimeNormalizer {
    /// Create a normalizer from configuration.
    pub fn new(config: &NormalizationConfig) -> Result<Self> {
        if config.step_minutes <= 0 {
            return Err(Error::config("normalization step must be positive"));
        }
        let initial_time = parse_hhmm(&config.initial_time)
            .map_err(|e| Error::config(format!("initial time: {e}")))?;

        Ok(Self {
            initial_time,
            step_minutes: config.step_minutes,
            wrap_interval_minutes: config.wrap_interval_minutes,
            first_row_interval: config.first_row_interval,
        })
    }

    /// Fresh carry state for one run.
    pub fn start(&self) -> NormalizationState {
        NormalizationState::starting_at(
            self.initial_time,
            self.step_minutes,
            self.wrap_interval_minutes,
        )
    }

    /// Normalize rows in order. Any unparseable time aborts the whole pass.
    pub fn normalize(&self, rows: Vec<FlatRow>) -> Result<Vec<NormalizedRow>> {
        self.normalize_with_stats(rows).map(|(rows, _)| rows)
    }

    /// Normalize rows in order and report what had to be repaired.
    pub fn normalize_with_stats(
        &self,
        rows: Vec<FlatRow>,
    ) -> Result<(Vec<NormalizedRow>, NormalizationStats)> {
        let mut state = self.start();
        let mut stats = NormalizationStats::default();
        let mut normalized = Vec::with_capacity(rows.len());

        for (index, row) in rows.into_iter().enumerate() {
            let resolved = state
                .advance(row.time.as_deref())
                .map_err(|e| Error::parse(format!("row {index} (id {}): {e}", row.id)))?;

            stats.rows += 1;
            if resolved.inferred {
                stats.inferred_times += 1;
            }
            if resolved.wrapped {
                stats.wrap_fixups += 1;
            }
            if index > 0 && resolved.interval_minutes != self.step_minutes {
                stats.irregular_intervals += 1;
                warn!(
                    row = index,
                    id = %row.id,
                    interval = resolved.interval_minutes,
                    time = %format_hhmm(resolved.time),
                    "irregular sample interval"
                );
            }

            normalized.push(NormalizedRow {
                time_fixed: format_hhmm(resolved.time),
                hour_within: hour_bucket(resolved.time),
                interval: resolved.interval_minutes as f64,
                row,
            });
        }

        // The first row has no predecessor within the run.
        if let Some(first) = normalized.first_mut() {
            first.interval = self.first_row_interval;
        }

        debug!(
            rows = stats.rows,
            inferred = stats.inferred_times,
            irregular = stats.irregular_intervals,
            "normalized trade samples"
        );

        Ok((normalized, stats))
    }
}
