// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Unified logging initialization
//!
//! Provides console output plus daily-rotated JSON log files, one folder per run,
//! with configurable retention.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::path::{Path, PathBuf};
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;

const RUN_FOLDER_PREFIX: &str = "run_";
const RUN_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Logging initialization result
///
/// Must be held for the process lifetime; dropping it flushes and closes the
/// file writers.
pub struct LoggingGuard {
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: PathBuf,
}

impl LoggingGuard {
    /// Get the log directory path of this run
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// Retention policy for old run folders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRetention {
    pub days: u64,
    pub runs: usize,
}

impl Default for LogRetention {
    fn default() -> Self {
        Self { days: 30, runs: 10 }
    }
}

/// Initialize logging with file output and console output
///
/// Creates a timestamped folder structure:
/// ```text
/// ./logs/
///   └── run_20250101_120000/
///       └── tangible-dashboard.log.2025-01-01 (JSON, rotated daily)
/// ```
///
/// # Arguments
/// * `debug_flags` - Per-crate debug flags for filtering
/// * `base_level` - Level for everything not raised by a debug flag
/// * `log_dir` - Base directory for logs (default: `./logs`)
/// * `retention` - Age and count limits for old run folders
pub fn init_logging(
    debug_flags: &CrateDebugFlags,
    base_level: &str,
    log_dir: Option<PathBuf>,
    retention: LogRetention,
) -> Result<LoggingGuard> {
    let base_log_dir = log_dir.unwrap_or_else(|| PathBuf::from("./logs"));

    let timestamp = Utc::now().format(RUN_TIMESTAMP_FORMAT);
    let run_folder = base_log_dir.join(format!("{}{}", RUN_FOLDER_PREFIX, timestamp));
    std::fs::create_dir_all(&run_folder)
        .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

    cleanup_old_logs(&base_log_dir, retention, Utc::now())?;

    let filter = debug_flags.to_filter_string(base_level);
    let build_filter =
        || EnvFilter::try_new(&filter).with_context(|| format!("Invalid log filter: {}", filter));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_filter(build_filter()?)
        .boxed();

    let file_appender = rolling::daily(&run_folder, "tangible-dashboard.log");
    let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .json()
        .with_filter(build_filter()?)
        .boxed();

    Registry::default()
        .with(vec![console_layer, file_layer])
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(LoggingGuard {
        _file_guards: vec![file_guard],
        log_dir: run_folder,
    })
}

/// Initialize logging with default settings
pub fn init_logging_default(debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    init_logging(debug_flags, "info", None, LogRetention::default())
}

/// Clean up old run directories based on retention policy
///
/// Folders older than `retention.days` are removed first; of the rest, only
/// the newest `retention.runs` are kept. Folders whose name does not parse as
/// a run timestamp are left alone.
fn cleanup_old_logs(base_log_dir: &Path, retention: LogRetention, now: DateTime<Utc>) -> Result<()> {
    if !base_log_dir.exists() {
        return Ok(());
    }

    let cutoff_date = now - chrono::Duration::days(retention.days as i64);

    let mut runs: Vec<(PathBuf, DateTime<Utc>)> = Vec::new();
    for entry in std::fs::read_dir(base_log_dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let started_at = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_prefix(RUN_FOLDER_PREFIX))
            .and_then(|stamp| NaiveDateTime::parse_from_str(stamp, RUN_TIMESTAMP_FORMAT).ok())
            .map(|naive| naive.and_utc());
        if let Some(started_at) = started_at {
            runs.push((path, started_at));
        }
    }

    // Newest first
    runs.sort_by(|a, b| b.1.cmp(&a.1));

    for (index, (path, started_at)) in runs.iter().enumerate() {
        if *started_at < cutoff_date || index >= retention.runs {
            if let Err(e) = std::fs::remove_dir_all(path) {
                eprintln!(
                    "Warning: Failed to remove old log directory {}: {}",
                    path.display(),
                    e
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn make_run(base: &Path, stamp: &str) -> PathBuf {
        let path = base.join(format!("run_{}", stamp));
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    #[test]
    fn test_cleanup_by_age() {
        let dir = tempdir().unwrap();
        let old = make_run(dir.path(), "20240101_000000");
        let recent = make_run(dir.path(), "20250601_120000");
        let now = Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap();

        cleanup_old_logs(dir.path(), LogRetention { days: 30, runs: 10 }, now).unwrap();

        assert!(!old.exists());
        assert!(recent.exists());
    }

    #[test]
    fn test_cleanup_by_count() {
        let dir = tempdir().unwrap();
        let first = make_run(dir.path(), "20250601_100000");
        let second = make_run(dir.path(), "20250601_110000");
        let third = make_run(dir.path(), "20250601_120000");
        let unrelated = dir.path().join("keep_me");
        std::fs::create_dir_all(&unrelated).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap();

        cleanup_old_logs(dir.path(), LogRetention { days: 30, runs: 2 }, now).unwrap();

        assert!(!first.exists());
        assert!(second.exists());
        assert!(third.exists());
        assert!(unrelated.exists());
    }

    #[test]
    fn test_cleanup_missing_dir_is_ok() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(cleanup_old_logs(&missing, LogRetention::default(), Utc::now()).is_ok());
    }
}
