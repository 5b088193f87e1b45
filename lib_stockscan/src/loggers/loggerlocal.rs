use std::path::PathBuf;

use thiserror::Error;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid log filter {filter:?}: {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("A global subscriber is already installed: {0}")]
    AlreadyInstalled(String),
}

/// # Logger Options
///
/// Controls where log records go. `RUST_LOG`, when set, overrides `level`.
#[derive(Debug, Clone)]
pub struct LoggerOptions {
    /// Filter directive used when `RUST_LOG` is absent (e.g. `info`, `lib_stockscan=debug`).
    pub level: String,
    /// Print human-readable records to stderr, leaving stdout to the program's output.
    pub console: bool,
    /// Directory for daily-rotated JSON log files. `None` disables file output.
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console: true,
            log_dir: None,
        }
    }
}

/// Builds the subscriber described by `options` without installing it.
///
/// The returned guard, if any, must outlive all logging: dropping it flushes
/// and stops the file writer.
pub fn build_subscriber(
    app_name: &str,
    options: &LoggerOptions,
) -> Result<(Box<dyn Subscriber + Send + Sync>, Option<WorkerGuard>), LoggingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&options.level))
        .map_err(|e| LoggingError::InvalidFilter {
            filter: options.level.clone(),
            reason: e.to_string(),
        })?;

    let console_layer = options
        .console
        .then(|| fmt::layer().with_target(true).with_ansi(true).with_writer(std::io::stderr));

    let (file_layer, guard) = match &options.log_dir {
        Some(log_dir) => {
            std::fs::create_dir_all(log_dir)?;
            let file_appender = rolling::daily(log_dir, app_name);
            let (writer, guard) = non_blocking(file_appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer).json();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer);

    Ok((Box::new(subscriber), guard))
}

/// Installs the subscriber described by `options` as the global default.
///
/// Keep the returned guard alive for the lifetime of the program.
pub fn init_logging(app_name: &str, options: &LoggerOptions) -> Result<Option<WorkerGuard>, LoggingError> {
    let (subscriber, guard) = build_subscriber(app_name, options)?;
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| LoggingError::AlreadyInstalled(e.to_string()))?;

    tracing::info!(app = app_name, level = %options.level, "Logging initialized");
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn file_layer_writes_json_records() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let options = LoggerOptions {
            level: "info".to_string(),
            console: false,
            log_dir: Some(temp_dir.path().to_path_buf()),
        };

        let (subscriber, guard) = build_subscriber("stockscan_test", &options).unwrap();
        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(action = "stock_scanner_get_quote", "Admin-ajax request failed");
        });
        // Flushes the non-blocking writer.
        drop(guard);

        let log_files: Vec<_> = fs::read_dir(temp_dir.path())
            .expect("Failed to read log directory")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .collect();
        assert_eq!(log_files.len(), 1, "expected exactly one log file");

        let contents = fs::read_to_string(&log_files[0]).unwrap();
        assert!(contents.contains("Admin-ajax request failed"));
        assert!(contents.contains(r#""action":"stock_scanner_get_quote""#));
    }

    #[test]
    fn console_only_needs_no_guard() {
        let options = LoggerOptions {
            console: true,
            ..LoggerOptions::default()
        };
        let (_subscriber, guard) = build_subscriber("stockscan_test", &options).unwrap();
        assert!(guard.is_none());
    }
}
