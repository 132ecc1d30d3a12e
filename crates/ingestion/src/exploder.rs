//! Unzips per-trade parallel arrays into one row per sample.

use power_core::{Error, FlatRow, RawTradeRecord, Result};

/// Expand trades into flat rows, keeping record order and sample order.
///
/// A record whose `times` and `volumes` differ in length is rejected.
pub fn explode(records: Vec<RawTradeRecord>) -> Result<Vec<FlatRow>> {
    let total: usize = records.iter().map(|r| r.volumes.len()).sum();
    let mut rows = Vec::with_capacity(total);

    for (index, record) in records.into_iter().enumerate() {
        if record.times.len() != record.volumes.len() {
            return Err(Error::source(format!(
                "trade {index} (id {}): {} times but {} volumes",
                record.id,
                record.times.len(),
                record.volumes.len()
            )));
        }

        let RawTradeRecord { id, date, times, volumes } = record;
        rows.extend(times.into_iter().zip(volumes).map(|(time, volume)| FlatRow {
            date: date.clone(),
            id: id.clone(),
            time,
            volume,
        }));
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(id: &str, times: &[Option<&str>], volumes: &[f64]) -> RawTradeRecord {
        RawTradeRecord {
            id: id.to_string(),
            date: "01/01/2024".to_string(),
            times: times.iter().map(|t| t.map(str::to_string)).collect(),
            volumes: volumes.to_vec(),
        }
    }

    #[test]
    fn test_explode_preserves_order() {
        let records = vec![
            make_record("A", &[Some("23:55"), Some("00:00"), None], &[10.0, 20.0, 30.0]),
            make_record("B", &[Some("23:00")], &[7.0]),
        ];

        let rows = explode(records).unwrap();

        assert_eq!(rows.len(), 4);
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["A", "A", "A", "B"]);
        assert_eq!(rows[0].time.as_deref(), Some("23:55"));
        assert_eq!(rows[2].time, None);
        assert_eq!(rows[2].volume, 30.0);
        assert_eq!(rows[3].volume, 7.0);
        assert!(rows.iter().all(|r| r.date == "01/01/2024"));
    }

    #[test]
    fn test_explode_rejects_unequal_lengths() {
        let records = vec![make_record("A", &[Some("00:00"), None], &[1.0])];
        let err = explode(records).unwrap_err();
        assert!(matches!(err, Error::Source(_)));
        assert!(err.to_string().contains("id A"));
    }

    #[test]
    fn test_explode_empty() {
        assert!(explode(Vec::new()).unwrap().is_empty());
        let rows = explode(vec![make_record("A", &[], &[])]).unwrap();
        assert!(rows.is_empty());
    }
}
