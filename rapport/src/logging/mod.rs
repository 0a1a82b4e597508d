//! Structured logging infrastructure for Rapport.
//!
//! Built on `tracing`: one `fmt` subscriber per configured format, an `EnvFilter`
//! that honours `RUST_LOG` when present, and an optional non-blocking file writer.

#[cfg(test)]
mod tests;

use crate::config::{LogFormat, LogLevel, LoggingConfig};
use std::path::Path;
use std::sync::OnceLock;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;

/// Keeps the file writer flushing for the lifetime of the process.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Error type for logging operations
#[derive(Debug)]
pub enum LogError {
    /// IO error occurred
    IoError(std::io::Error),

    /// Error parsing log level
    InvalidLogLevel(String),

    /// Error in subscriber setup
    SubscriberError(Box<dyn std::error::Error + Send + Sync>),
}

impl From<std::io::Error> for LogError {
    fn from(err: std::io::Error) -> Self {
        LogError::IoError(err)
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for LogError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        LogError::SubscriberError(err)
    }
}

/// Result type for logging operations
pub type Result<T> = std::result::Result<T, LogError>;

/// Install a configured builder as the global subscriber, routing output to the
/// configured file or stdout.
///
/// A macro rather than a function: each format yields a distinct builder type.
macro_rules! install {
    ($builder:expr, $config:expr) => {{
        let builder = $builder
            .with_level(true)
            .with_target(true)
            .with_line_number(true)
            .with_thread_ids(true);

        match (&$config.file, $config.stdout) {
            (Some(file_path), false) => {
                let (writer, guard) = create_non_blocking_file(file_path)?;
                builder.with_writer(writer).try_init()?;
                let _ = FILE_GUARD.set(guard);
            }
            (Some(_), true) => {
                builder.with_writer(std::io::stdout).try_init()?;
                tracing::warn!("Configured for stdout; file logging ignored");
            }
            (None, true) => {
                builder.with_writer(std::io::stdout).try_init()?;
            }
            (None, false) => {}
        }

        Ok(())
    }};
}

/// Initialize the logging system with the given configuration.
///
/// Calling this more than once is harmless: an already-installed global subscriber
/// is reported as success.
pub fn init(config: &LoggingConfig) -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let filter = build_filter(config.level);

    match config.format {
        LogFormat::Json => install!(
            tracing_subscriber::fmt().json().with_env_filter(filter),
            config
        ),
        LogFormat::Compact => install!(
            tracing_subscriber::fmt().compact().with_env_filter(filter),
            config
        ),
        LogFormat::Pretty => install!(
            tracing_subscriber::fmt().pretty().with_env_filter(filter),
            config
        ),
        LogFormat::Default => install!(tracing_subscriber::fmt().with_env_filter(filter), config),
    }
}

/// `RUST_LOG` wins over the configured level when it is set and parses.
fn build_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()))
}

/// Create a non-blocking file writer.
fn create_non_blocking_file(path: impl AsRef<Path>) -> Result<(NonBlocking, WorkerGuard)> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        path.parent().unwrap_or_else(|| Path::new(".")),
        path.file_name().unwrap_or_default(),
    );

    Ok(tracing_appender::non_blocking(file_appender))
}

/// Parse a log level string into a LogLevel enum.
pub fn parse_log_level(level: &str) -> Result<LogLevel> {
    level.parse().map_err(|_| LogError::InvalidLogLevel(level.to_string()))
}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogError::IoError(e) => write!(f, "IO error: {}", e),
            LogError::SubscriberError(e) => write!(f, "Subscriber error: {}", e),
            LogError::InvalidLogLevel(s) => write!(f, "Invalid log level: {}", s),
        }
    }
}

impl std::error::Error for LogError {}
