use std::io;
use std::str::FromStr;

use serde::Deserialize;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Logging section of the application config
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset (default: info)
    pub level: String,

    /// Directory for hourly rolling log files; stdout only when unset
    pub log_dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), log_dir: None }
    }
}

impl LoggingConfig {
    /// Configured level, falling back to INFO when unparseable
    pub fn level(&self) -> Level {
        Level::from_str(&self.level).unwrap_or(Level::INFO)
    }
}

/// Initialise tracing with stdout output and, if configured, a non-blocking file appender
///
/// Keep the returned guard alive for as long as file logs should be flushed.
pub fn init(app_name: &str, logging: &LoggingConfig) -> Option<WorkerGuard> {
    // Respects RUST_LOG env var, falls back to the configured level
    let env_filter = EnvFilter::builder().with_default_directive(logging.level().into()).from_env_lossy();

    let stdout_layer =
        fmt::layer().with_writer(io::stdout).with_target(true).with_thread_ids(true).with_line_number(true).with_ansi(true).compact();

    let (file_layer, guard) = match &logging.log_dir {
        Some(log_dir) => {
            let _ = std::fs::create_dir_all(log_dir);

            // Background thread handles all file I/O
            let file_appender = tracing_appender::rolling::hourly(log_dir, format!("{app_name}.log"));
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let layer =
                fmt::layer().with_writer(non_blocking).with_target(true).with_thread_ids(true).with_line_number(true).with_ansi(false).compact();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry().with(env_filter).with(stdout_layer).with(file_layer).init();

    guard
}
