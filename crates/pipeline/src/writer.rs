//! CSV persistence of a run's reports.
//!
//! Reports are first written next to their targets as `*.partial` files and
//! renamed into place only once all of them are written. A report already
//! at a target is set aside as `*.previous` until the commit succeeds. On
//! failure every file this writer created is removed and the set-aside
//! reports are put back, so a run leaves all three reports or none.

use crate::report::ReportSet;
use power_core::{QualityReport, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const AGGREGATED_HEADER: [&str; 2] = ["Local Time", "Volume"];
const PROFILE_HEADER: [&str; 4] = ["columns", "count", "total_missing_value", "unique"];

/// Locations of a run's reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    /// `<prefix>_<tag>.csv`
    pub aggregated: PathBuf,
    /// `<prefix>_<tag>_data_profiling.csv`
    pub profile: PathBuf,
    /// `<prefix>_<tag>_data_quality.csv`
    pub quality: PathBuf,
}

impl ReportPaths {
    fn all(&self) -> [&Path; 3] {
        [&self.quality, &self.profile, &self.aggregated]
    }
}

/// Writes the three reports of one run.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
    prefix: String,
    run_tag: String,
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".previous");
    PathBuf::from(name)
}

/// Progress of a commit, for rollback.
#[derive(Debug, Default)]
struct Commit {
    /// Targets renamed into place, in `ReportPaths::all` order.
    committed: usize,
    /// Targets whose earlier file was moved to its backup path.
    backed_up: Vec<PathBuf>,
}

fn write_rows<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_quality(path: &Path, report: &QualityReport) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    let header = std::iter::once("columns").chain(report.checks.iter().map(|c| c.check.as_str()));
    writer.write_record(header)?;
    let row = std::iter::once("check_result").chain(report.checks.iter().map(|c| c.result.as_str()));
    writer.write_record(row)?;
    writer.flush()?;
    Ok(())
}

fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "could not remove report file");
        }
    }
}

fn commit(paths: &ReportPaths, progress: &mut Commit) -> Result<()> {
    for target in paths.all() {
        if target.exists() {
            fs::rename(target, backup_path(target))?;
            progress.backed_up.push(target.to_path_buf());
        }
        fs::rename(partial_path(target), target)?;
        progress.committed += 1;
    }
    Ok(())
}

impl ReportWriter {
    /// Create a writer for reports named `<prefix>_<run_tag>*` under `dir`.
    pub fn new(
        dir: impl Into<PathBuf>,
        prefix: impl Into<String>,
        run_tag: impl Into<String>,
    ) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            run_tag: run_tag.into(),
        }
    }

    /// Where the reports will be written.
    pub fn paths(&self) -> ReportPaths {
        let stem = format!("{}_{}", self.prefix, self.run_tag);
        ReportPaths {
            aggregated: self.dir.join(format!("{stem}.csv")),
            profile: self.dir.join(format!("{stem}_data_profiling.csv")),
            quality: self.dir.join(format!("{stem}_data_quality.csv")),
        }
    }

    /// Write all three reports, or none of them.
    pub fn write(&self, reports: &ReportSet) -> Result<ReportPaths> {
        fs::create_dir_all(&self.dir)?;
        let paths = self.paths();
        let mut progress = Commit::default();

        let result = self
            .stage(&paths, reports)
            .and_then(|()| commit(&paths, &mut progress));

        if let Err(e) = result {
            for target in paths.all() {
                remove_quietly(&partial_path(target));
            }
            for target in paths.all().into_iter().take(progress.committed) {
                remove_quietly(target);
            }
            for target in &progress.backed_up {
                if let Err(restore) = fs::rename(backup_path(target), target) {
                    warn!(path = %target.display(), error = %restore, "could not restore earlier report");
                }
            }
            return Err(e);
        }

        for target in &progress.backed_up {
            remove_quietly(&backup_path(target));
        }
        for target in paths.all() {
            info!(path = %target.display(), "report saved");
        }
        Ok(paths)
    }

    fn stage(&self, paths: &ReportPaths, reports: &ReportSet) -> Result<()> {
        write_quality(&partial_path(&paths.quality), &reports.quality)?;
        write_rows(&partial_path(&paths.profile), &PROFILE_HEADER, &reports.profile)?;
        write_rows(&partial_path(&paths.aggregated), &AGGREGATED_HEADER, &reports.aggregated)?;
        debug!(dir = %self.dir.display(), "reports staged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use power_core::{AggregatedRow, ProfileRow, QualityCheck};

    fn make_reports() -> ReportSet {
        ReportSet {
            rows: 3,
            quality: QualityReport {
                checks: vec![
                    QualityCheck {
                        check: "time_format".to_string(),
                        result: "correct".to_string(),
                    },
                    QualityCheck {
                        check: "id".to_string(),
                        result: "not null".to_string(),
                    },
                ],
            },
            profile: vec![ProfileRow {
                columns: "time".to_string(),
                count: 2,
                total_missing_value: 1,
                unique: 2,
            }],
            aggregated: vec![
                AggregatedRow {
                    local_time: "23:00".to_string(),
                    volume: 10.0,
                },
                AggregatedRow {
                    local_time: "00:00".to_string(),
                    volume: 50.5,
                },
            ],
        }
    }

    #[test]
    fn test_paths_are_distinct() {
        let writer = ReportWriter::new("out", "PowerPosition", "20240101_0930");
        let paths = writer.paths();
        assert_eq!(paths.aggregated, Path::new("out/PowerPosition_20240101_0930.csv"));
        assert_eq!(
            paths.profile,
            Path::new("out/PowerPosition_20240101_0930_data_profiling.csv")
        );
        assert_eq!(
            paths.quality,
            Path::new("out/PowerPosition_20240101_0930_data_quality.csv")
        );
    }

    #[test]
    fn test_writes_all_reports() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("reports");
        let paths = ReportWriter::new(&out, "PowerPosition", "tag")
            .write(&make_reports())
            .unwrap();

        let quality = fs::read_to_string(&paths.quality).unwrap();
        assert_eq!(quality, "columns,time_format,id\ncheck_result,correct,not null\n");

        let profile = fs::read_to_string(&paths.profile).unwrap();
        assert_eq!(profile, "columns,count,total_missing_value,unique\ntime,2,1,2\n");

        let mut reader = csv::Reader::from_path(&paths.aggregated).unwrap();
        let header: Vec<&str> = reader.headers().unwrap().iter().collect();
        assert_eq!(header, ["Local Time", "Volume"]);
        let rows: Vec<(String, f64)> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows, vec![("23:00".to_string(), 10.0), ("00:00".to_string(), 50.5)]);

        let leftovers = fs::read_dir(&out)
            .unwrap()
            .filter(|e| e.as_ref().unwrap().path().to_string_lossy().ends_with(".partial"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_empty_aggregation_keeps_header() {
        let dir = tempfile::tempdir().unwrap();
        let mut reports = make_reports();
        reports.aggregated.clear();
        let paths = ReportWriter::new(dir.path(), "P", "t").write(&reports).unwrap();
        assert_eq!(fs::read_to_string(paths.aggregated).unwrap(), "Local Time,Volume\n");
    }

    /// Makes the commit of the aggregated report fail: a non-empty directory
    /// squats on its target and another on its backup path.
    fn block_aggregated(paths: &ReportPaths) {
        for dir in [paths.aggregated.clone(), backup_path(&paths.aggregated)] {
            fs::create_dir(&dir).unwrap();
            fs::write(dir.join("keep"), b"x").unwrap();
        }
    }

    #[test]
    fn test_failure_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path(), "P", "t");
        let paths = writer.paths();
        block_aggregated(&paths);

        assert!(writer.write(&make_reports()).is_err());
        assert!(!paths.quality.exists());
        assert!(!paths.profile.exists());
        assert!(!partial_path(&paths.aggregated).exists());
        assert!(!partial_path(&paths.quality).exists());
    }

    #[test]
    fn test_failure_restores_earlier_reports() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path(), "P", "t");
        let paths = writer.paths();
        fs::write(&paths.quality, "earlier quality\n").unwrap();
        fs::write(&paths.profile, "earlier profile\n").unwrap();
        block_aggregated(&paths);

        assert!(writer.write(&make_reports()).is_err());

        assert_eq!(fs::read_to_string(&paths.quality).unwrap(), "earlier quality\n");
        assert_eq!(fs::read_to_string(&paths.profile).unwrap(), "earlier profile\n");
        assert!(!backup_path(&paths.quality).exists());
        assert!(!backup_path(&paths.profile).exists());
        assert!(!partial_path(&paths.quality).exists());
    }

    #[test]
    fn test_rewrite_replaces_earlier_reports() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path(), "P", "t");
        let paths = writer.paths();
        fs::write(&paths.quality, "earlier quality\n").unwrap();

        writer.write(&make_reports()).unwrap();

        let quality = fs::read_to_string(&paths.quality).unwrap();
        assert!(quality.starts_with("columns,time_format"));
        assert!(!backup_path(&paths.quality).exists());
    }
}
