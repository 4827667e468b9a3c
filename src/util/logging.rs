// LogSift - util/logging.rs
//
// Structured logging with runtime-selectable debug mode.
//
// Activation:
//   - Environment variable: RUST_LOG=debug (or trace)
//   - CLI flag: --debug
//   - Config file: [logging] level = "debug"
//
// Output: stderr always. Optionally also to a file through a non-blocking
// appender whose worker is owned by the returned `LoggingGuard`.
// Never logs secrets, tokens, or PII at any level.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Owns the logging pipeline for the lifetime of the process.
///
/// Created once in `main`; dropping it at shutdown flushes any buffered
/// file output.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file_worker: Option<WorkerGuard>,
}

/// Resolve the filter directive with the documented priority.
///
/// Priority: RUST_LOG env var > CLI --debug flag > config level > default "info".
pub fn resolve_filter(debug_flag: bool, config_level: Option<&str>) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug_flag {
        EnvFilter::new("debug")
    } else if let Some(level) = config_level {
        EnvFilter::new(level)
    } else {
        EnvFilter::new(super::constants::DEFAULT_LOG_LEVEL)
    }
}

/// Initialise the logging subsystem.
///
/// `debug_flag` is true when the user passed --debug on the CLI.
/// `config_level` is the level from config.toml (if present).
/// `log_file` is the optional log file path from config.toml.
///
/// Calling this twice is harmless: the second subscriber is discarded and a
/// warning is emitted through the first.
pub fn init(debug_flag: bool, config_level: Option<&str>, log_file: Option<&Path>) -> LoggingGuard {
    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_filter(resolve_filter(debug_flag, config_level));

    let (file_layer, file_worker) = match log_file.and_then(file_writer) {
        Some((writer, worker)) => {
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer)
                .with_filter(resolve_filter(debug_flag, config_level));
            (Some(layer), Some(worker))
        }
        None => (None, None),
    };

    let installed = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    if let Err(e) = installed {
        tracing::warn!(error = %e, "Logging already initialised; keeping existing subscriber");
    }

    tracing::debug!(
        app = super::constants::APP_NAME,
        version = super::constants::APP_VERSION,
        file = ?log_file.map(|p| p.display().to_string()),
        "Logging initialised"
    );

    LoggingGuard {
        _file_worker: file_worker,
    }
}

/// Build a non-blocking writer appending to `path`.
///
/// Returns `None` when the path has no file name or its directory cannot be
/// created. The latter goes to stderr since no subscriber exists yet.
fn file_writer(path: &Path) -> Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let file_name = path.file_name()?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!(
            "{}: cannot create log directory '{}': {e}; file logging disabled",
            super::constants::APP_NAME,
            dir.display()
        );
        return None;
    }
    let appender = tracing_appender::rolling::never(dir, file_name);
    Some(tracing_appender::non_blocking(appender))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_writer_rejects_path_without_file_name() {
        assert!(file_writer(Path::new("/")).is_none());
    }

    #[test]
    fn test_file_writer_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("logsift.log");
        let writer = file_writer(&path);
        assert!(writer.is_some());
        assert!(dir.path().join("nested").is_dir());
    }
}
