//! Per-run log file.
//!
//! A [`RunLog`] owns a file sink tagged with the run's start time. Events
//! emitted inside [`RunLog::in_scope`] go to that file only; the sink is
//! flushed and closed when the `RunLog` is dropped. Opening is best-effort:
//! a run whose log cannot be created still runs, it just isn't logged to a
//! file.

use power_core::config::LoggingConfig;
use power_core::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{warn, Dispatch};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;

/// Scoped log sink for one pipeline run.
pub struct RunLog {
    path: Option<PathBuf>,
    dispatch: Option<Dispatch>,
    // Dropped after `dispatch`; flushes pending lines to the file.
    _guard: Option<WorkerGuard>,
}

impl RunLog {
    /// Open the log for `run_tag`, or a no-op log if that fails.
    pub fn open(config: &LoggingConfig, run_tag: &str) -> Self {
        match Self::try_open(config, run_tag) {
            Ok(log) => log,
            Err(e) => {
                warn!(error = %e, "run log unavailable, continuing without it");
                Self::disabled()
            }
        }
    }

    /// Open the log for `run_tag`.
    pub fn try_open(config: &LoggingConfig, run_tag: &str) -> Result<Self> {
        let level: LevelFilter = config
            .level
            .parse()
            .map_err(|_| Error::config(format!("unknown log level {:?}", config.level)))?;

        fs::create_dir_all(&config.log_dir)?;
        let stem = format!("{}_{}", config.log_file_prefix, run_tag);
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(&stem)
            .filename_suffix("log")
            .build(&config.log_dir)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let subscriber = tracing_subscriber::fmt()
            .with_writer(writer)
            .with_ansi(false)
            .with_max_level(level)
            .finish();

        Ok(Self {
            path: Some(config.log_dir.join(format!("{stem}.log"))),
            dispatch: Some(Dispatch::new(subscriber)),
            _guard: Some(guard),
        })
    }

    /// A log without a file; events go to the ambient subscriber.
    pub fn disabled() -> Self {
        Self {
            path: None,
            dispatch: None,
            _guard: None,
        }
    }

    /// Path of the log file, if one is open.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run `f` with this log as the current subscriber.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
            None => f(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{error, info};

    fn config(dir: &Path, level: &str) -> LoggingConfig {
        LoggingConfig {
            log_dir: dir.join("logs"),
            log_file_prefix: "error_message".to_string(),
            level: level.to_string(),
        }
    }

    #[test]
    fn test_writes_tagged_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::try_open(&config(dir.path(), "error"), "20240101_0930").unwrap();
        let path = log.path().unwrap().to_path_buf();
        assert!(path.ends_with("logs/error_message_20240101_0930.log"));

        log.in_scope(|| {
            info!("below threshold");
            error!("ERROR occurred when running get_trade_data");
        });
        drop(log);

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("ERROR occurred when running get_trade_data"));
        assert!(!contents.contains("below threshold"));
    }

    #[test]
    fn test_bad_level_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = RunLog::try_open(&config(dir.path(), "loud"), "tag");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_open_falls_back_to_disabled() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the log directory should be.
        let blocker = dir.path().join("logs");
        fs::write(&blocker, b"").unwrap();

        let log = RunLog::open(&config(dir.path(), "error"), "tag");
        assert!(log.path().is_none());
        assert_eq!(log.in_scope(|| 7), 7);
    }
}
