//! Hourly volume aggregation in trading-day order.
//!
//! Buckets are grouped by `hour_within` label (ascending, as a group-by
//! yields them) and then ordered by [`trading_day_position`]: the day's
//! first hour, 23:00 of the previous calendar day, comes first and every
//! other bucket keeps its grouped order. This is neither a calendar nor a
//! plain lexicographic order.

use power_core::{AggregatedRow, NormalizedRow, Volume};
use std::collections::BTreeMap;

/// Hour bucket that opens the trading day.
pub const DAY_START_BUCKET: &str = "23:00";

/// Display position of a bucket, given its index in grouped order.
#[inline]
pub fn trading_day_position(bucket: &str, group_index: usize) -> usize {
    if bucket == DAY_START_BUCKET {
        0
    } else {
        group_index + 1
    }
}

/// Accumulates volume per hour bucket.
#[derive(Debug, Clone, Default)]
pub struct HourlyAggregator {
    buckets: BTreeMap<String, Volume>,
}

impl HourlyAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one row's volume to its bucket.
    pub fn add_row(&mut self, row: &NormalizedRow) {
        *self.buckets.entry(row.hour_within.clone()).or_insert(0.0) += row.row.volume;
    }

    /// Add multiple rows.
    pub fn add_rows(&mut self, rows: &[NormalizedRow]) {
        for row in rows {
            self.add_row(row);
        }
    }

    /// Number of distinct buckets seen.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Summed buckets in trading-day order.
    pub fn finish(&self) -> Vec<AggregatedRow> {
        let mut ranked: Vec<(usize, AggregatedRow)> = self
            .buckets
            .iter()
            .enumerate()
            .map(|(i, (bucket, &volume))| {
                (
                    trading_day_position(bucket, i),
                    AggregatedRow {
                        local_time: bucket.clone(),
                        volume,
                    },
                )
            })
            .collect();

        ranked.sort_by_key(|(position, _)| *position);
        ranked.into_iter().map(|(_, row)| row).collect()
    }
}

/// Sum volume per hour bucket and order the buckets by trading-day position.
pub fn aggregate(rows: &[NormalizedRow]) -> Vec<AggregatedRow> {
    let mut aggregator = HourlyAggregator::new();
    aggregator.add_rows(rows);
    aggregator.finish()
}
