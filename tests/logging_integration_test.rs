//! Integration tests for logging functionality
//!
//! The global subscriber can be installed once per process, so every check
//! that initializes logging lives in a single test.

use occurrence_ingest::config::LoggingConfig;
use occurrence_ingest::domain::IngestError;
use occurrence_ingest::logging::init_logging;
use occurrence_ingest::{log_annotation_committed, log_error_with_context, log_ingest_complete};
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_rotation, "daily");
    assert_eq!(config.local_path, "/var/log/occurrence-ingest");
}

#[test]
fn test_invalid_level_rejected_before_install() {
    let result = init_logging("chatty", &LoggingConfig::default());
    assert!(matches!(result, Err(IngestError::Configuration(_))));
}

#[test]
fn test_file_logging_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
        local_max_size_mb: 100,
    };

    assert!(!log_path.exists());
    let guard = init_logging("debug", &config).unwrap();
    assert!(log_path.exists());

    // Macro targets are this test crate, outside the default filter
    log_annotation_committed!("run-1", "urn:uuid:a1", "00012345", "inserted");
    log_ingest_complete!("run-1", 1, Duration::from_millis(12));
    let error = IngestError::Other("boom".to_string());
    log_error_with_context!(&error, "While testing");

    // A second install in the same process is refused
    assert!(init_logging("info", &LoggingConfig::default()).is_err());

    drop(guard);
    let log_file = log_path.join("occurrence-ingest.log");
    let contents = std::fs::read_to_string(log_file).unwrap();
    assert!(contents.contains("Logging initialized"));
    assert!(contents.contains("occurrence_ingest::logging"));
}
