//! Logging infrastructure for ffs.
//!
//! Provides structured logging to stderr and, optionally, a log file:
//! - stderr keeps stdout free for command output (`ffs find` prints paths)
//! - the file is truncated at session start and written without ANSI colours
//! - levels are configurable via `RUST_LOG`, e.g. `RUST_LOG=info,ffs=debug`

use std::fs;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard flushes and closes the log file writer.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Truncate (creating if needed) the log file and its directory.
fn prepare_log_file(log_file: &Path) -> io::Result<()> {
    if let Some(dir) = log_file.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    fs::write(log_file, "")
}

/// Initialize the global subscriber.
///
/// # Arguments
///
/// * `log_file` - Optional file receiving a copy of every event
///
/// # Returns
///
/// LoggingGuard that must be kept alive for file logging to work
///
/// # Errors
///
/// Returns an error if the log file or its directory cannot be created
pub fn init_logging(log_file: Option<&Path>) -> Result<LoggingGuard, io::Error> {
    let (file_layer, file_guard) = match log_file {
        Some(path) => {
            prepare_log_file(path)?;

            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "log file has no name"))?;

            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .compact();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // init_logging installs a global subscriber, so only the file handling
    // is tested here.

    #[test]
    fn test_prepare_creates_nested_directory() {
        let temp = tempfile::tempdir().unwrap();
        let log_file = temp.path().join("deep/nested/ffs.log");

        prepare_log_file(&log_file).unwrap();

        assert!(log_file.exists());
        assert_eq!(fs::read_to_string(&log_file).unwrap(), "");
    }

    #[test]
    fn test_prepare_truncates_existing_file() {
        let temp = tempfile::tempdir().unwrap();
        let log_file = temp.path().join("ffs.log");
        fs::write(&log_file, "old log data").unwrap();

        prepare_log_file(&log_file).unwrap();

        assert_eq!(fs::read_to_string(&log_file).unwrap(), "");
    }

    #[test]
    fn test_prepare_fails_under_a_file() {
        let temp = tempfile::tempdir().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        assert!(prepare_log_file(&blocker.join("ffs.log")).is_err());
    }
}
