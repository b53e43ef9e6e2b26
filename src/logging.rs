use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{DiscoveryError, Result};

const LOG_PREFIX: &str = "nexa-node";
const LOG_SUFFIX: &str = "log";

/// Installs the global subscriber: console output, plus daily-rotated JSON
/// files when a log directory is configured.
///
/// `RUST_LOG` overrides the configured level. Keep the returned guard alive
/// for as long as file logging should be flushed.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let console = fmt::Layer::new()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(filter());

    let (file, guard) = match &config.dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            cleanup_old_logs(dir, config.files_to_keep);

            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_PREFIX)
                .filename_suffix(LOG_SUFFIX)
                .build(dir)
                .map_err(|e| DiscoveryError::logging(format!("Failed to create file appender: {}", e)))?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::Layer::new()
                .json()
                .with_writer(writer)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_target(true)
                .with_ansi(false)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| DiscoveryError::logging(format!("Failed to set tracing subscriber: {}", e)))?;
    Ok(guard)
}

/// Removes all but the newest `keep` log files in `log_dir`. The newest file
/// is always kept.
pub fn cleanup_old_logs(log_dir: &Path, keep: usize) {
    let keep = keep.max(1);
    let Ok(entries) = fs::read_dir(log_dir) else {
        return;
    };
    let mut log_files: Vec<_> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name.starts_with(LOG_PREFIX) && name.ends_with(LOG_SUFFIX)
        })
        .collect();

    // newest first
    log_files.sort_by_key(|entry| {
        std::cmp::Reverse(
            entry
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH),
        )
    });

    for old_file in log_files.iter().skip(keep) {
        let _ = fs::remove_file(old_file.path());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    #[test]
    fn test_cleanup_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        for day in 0..5u64 {
            let path = dir.path().join(format!("{}.2026-01-0{}.{}", LOG_PREFIX, day + 1, LOG_SUFFIX));
            let file = fs::File::create(&path).unwrap();
            file.set_modified(now - Duration::from_secs(86_400 * (5 - day))).unwrap();
        }
        fs::write(dir.path().join("unrelated.txt"), "keep me").unwrap();

        cleanup_old_logs(dir.path(), 2);

        let mut remaining: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        remaining.sort();
        assert_eq!(
            remaining,
            vec![
                format!("{}.2026-01-04.{}", LOG_PREFIX, LOG_SUFFIX),
                format!("{}.2026-01-05.{}", LOG_PREFIX, LOG_SUFFIX),
                "unrelated.txt".to_string(),
            ]
        );
    }

    #[test]
    fn test_cleanup_keeps_at_least_one() {
        let dir = tempfile::tempdir().unwrap();
        let now = SystemTime::now();
        for day in 1..=3u64 {
            let path = dir.path().join(format!("{}.2026-02-0{}.{}", LOG_PREFIX, day, LOG_SUFFIX));
            let file = fs::File::create(&path).unwrap();
            file.set_modified(now - Duration::from_secs(86_400 * (4 - day))).unwrap();
        }

        cleanup_old_logs(dir.path(), 0);

        let remaining: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(remaining, vec![format!("{}.2026-02-03.{}", LOG_PREFIX, LOG_SUFFIX)]);
    }

    #[test]
    fn test_cleanup_missing_dir() {
        cleanup_old_logs(Path::new("/definitely/not/here"), 1);
    }
}
