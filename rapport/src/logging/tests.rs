use crate::config::{LogFormat, LogLevel, LoggingConfig};
use crate::logging::{create_non_blocking_file, parse_log_level};
use std::sync::Once;
use tempfile::tempdir;

// Use this to ensure init is only called once across all tests
static INIT: Once = Once::new();

#[test]
fn test_init_console_logging() {
    INIT.call_once(|| {
        let config = LoggingConfig {
            level: LogLevel::Debug,
            format: LogFormat::Compact,
            file: None,
            stdout: true,
        };

        assert!(crate::logging::init(&config).is_ok());
    });

    // A second initialisation is a no-op, not an error
    assert!(crate::logging::init(&LoggingConfig::default()).is_ok());
}

#[test]
fn test_file_writer_creates_missing_directories() {
    let temp_dir = tempdir().unwrap();
    let log_path = temp_dir.path().join("nested").join("rapport.log");

    let (_writer, _guard) = create_non_blocking_file(&log_path).unwrap();

    assert!(temp_dir.path().join("nested").is_dir());
}

#[test]
fn test_parse_log_level() {
    assert_eq!(parse_log_level("trace").unwrap(), LogLevel::Trace);
    assert_eq!(parse_log_level("DEBUG").unwrap(), LogLevel::Debug);
    assert!(parse_log_level("info").is_ok());
    assert!(parse_log_level("warn").is_ok());
    assert!(parse_log_level("error").is_ok());
    assert!(parse_log_level("invalid").is_err());
}
