//! Logging and observability
//!
//! Structured logging with:
//! - Console output filtered by level or `RUST_LOG`
//! - Optional JSON file logging with rotation
//! - Macros for the events every ingest run reports
//!
//! # Example
//!
//! ```no_run
//! use occurrence_ingest::logging::init_logging;
//! use occurrence_ingest::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a committed annotation and what happened to its occurrence
///
/// # Example
///
/// ```no_run
/// use occurrence_ingest::log_annotation_committed;
///
/// log_annotation_committed!("run-1", "urn:uuid:a1", "00012345", "inserted");
/// ```
#[macro_export]
macro_rules! log_annotation_committed {
    ($run_id:expr, $annotation_id:expr, $catalog_number:expr, $outcome:expr) => {
        tracing::info!(
            run_id = %$run_id,
            annotation_id = %$annotation_id,
            catalog_number = %$catalog_number,
            outcome = %$outcome,
            "Annotation committed"
        );
    };
}

/// Log the completion of an ingest run
///
/// # Example
///
/// ```no_run
/// use occurrence_ingest::log_ingest_complete;
/// use std::time::Duration;
///
/// log_ingest_complete!("run-1", 42, Duration::from_secs(10));
/// ```
#[macro_export]
macro_rules! log_ingest_complete {
    ($run_id:expr, $count:expr, $duration:expr) => {
        tracing::info!(
            run_id = %$run_id,
            count = $count,
            duration_ms = $duration.as_millis() as u64,
            "Document processed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use occurrence_ingest::log_error_with_context;
/// use occurrence_ingest::domain::IngestError;
///
/// let error = IngestError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
