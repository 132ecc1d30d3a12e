//! Per-column descriptive statistics of the normalized table.

use power_core::{NormalizedRow, ProfileRow};
use std::collections::HashSet;

/// Text columns covered by the profile, in report order.
pub const PROFILED_COLUMNS: [&str; 5] = ["date", "id", "time", "time_fixed", "hour_within"];

fn column_value<'a>(row: &'a NormalizedRow, column: &str) -> Option<&'a str> {
    match column {
        "date" => Some(row.row.date.as_str()),
        "id" => Some(row.row.id.as_str()),
        "time" => row.row.time.as_deref(),
        "time_fixed" => Some(row.time_fixed.as_str()),
        "hour_within" => Some(row.hour_within.as_str()),
        _ => None,
    }
}

/// Count, missing count and distinct count for each text column.
pub fn profile(rows: &[NormalizedRow]) -> Vec<ProfileRow> {
    PROFILED_COLUMNS
        .iter()
        .map(|&column| {
            let mut count = 0;
            let mut distinct = HashSet::new();
            for value in rows.iter().filter_map(|r| column_value(r, column)) {
                count += 1;
                distinct.insert(value);
            }

            ProfileRow {
                columns: column.to_string(),
                count,
                total_missing_value: rows.len() - count,
                unique: distinct.len(),
            }
        })
        .collect()
}
