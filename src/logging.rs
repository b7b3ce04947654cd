use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "eta-engine.log";

/// Where and how much to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub filter: String,
    /// Directory for the daily-rolling log file; `None` keeps logs on stderr only.
    pub file_dir: Option<PathBuf>,
}

impl LogSettings {
    /// File logging is switched on by `ENABLE_FILE_LOGS` and lands in `LOG_DIR`
    /// (default `./logs`).
    pub fn from_env(filter: impl Into<String>) -> Self {
        let enabled = std::env::var("ENABLE_FILE_LOGS")
            .map(|v| flag_enabled(&v))
            .unwrap_or(false);
        let file_dir = enabled.then(|| {
            std::env::var("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./logs"))
        });

        Self {
            filter: filter.into(),
            file_dir,
        }
    }
}

/// Keeps the file writer flushing; drop it only on exit.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

fn flag_enabled(value: &str) -> bool {
    matches!(value.trim(), "true" | "1")
}

pub fn env_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber. Console output goes to stderr so stdout
/// stays machine-readable. A log directory that cannot be created disables
/// the file layer instead of failing startup.
pub fn init_tracing(settings: &LogSettings) -> Option<FileLogGuard> {
    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(true);

    let mut dir_error = None;
    let (file_layer, guard) = match settings.file_dir.as_deref() {
        Some(dir) => match std::fs::create_dir_all(dir) {
            Ok(()) => {
                let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true);
                (Some(layer), Some(FileLogGuard { _guard: guard }))
            }
            Err(err) => {
                dir_error = Some((dir.display().to_string(), err));
                (None, None)
            }
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter(&settings.filter))
        .with(console_layer)
        .with(file_layer)
        .init();

    if let Some((dir, err)) = dir_error {
        tracing::warn!(%dir, error = %err, "could not create log directory, file logging disabled");
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_directive_falls_back_to_info() {
        let filter = env_filter("eta_engine=verbose");
        assert_eq!(filter.to_string(), "info");
    }

    #[test]
    fn test_file_log_flag_accepts_true_and_one() {
        assert!(flag_enabled("true"));
        assert!(flag_enabled(" 1 "));
        assert!(!flag_enabled("yes"));
        assert!(!flag_enabled("false"));
        assert!(!flag_enabled(""));
    }
}
