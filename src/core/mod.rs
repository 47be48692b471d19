//! Core business logic for occurrence ingest.
//!
//! # Modules
//!
//! - [`parse`] - Streaming XML events and the annotation state machine
//! - [`synthesis`] - Field derivation and record writes for sealed occurrences
//! - [`ingest`] - Document processing and the ingest summary
//!
//! # Ingest Workflow
//!
//! 1. **Read**: Pull markup events from the document
//! 2. **Parse**: Route events into annotation, occurrence and child builders
//! 3. **Synthesize**: On annotation close, resolve identity and write the occurrence,
//!    its determinations and images
//! 4. **Report**: Merge each outcome into the document summary
//!
//! # Example
//!
//! ```rust,no_run
//! use occurrence_ingest::config::load_config;
//! use occurrence_ingest::core::ingest::AnnotationProcessor;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("ingest.toml")?;
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let processor = AnnotationProcessor::from_config(&config)
//!     .await?
//!     .with_shutdown(shutdown_rx);
//!
//! let summary = processor.process_file("annotations.rdf").await;
//! println!("Inserted: {}", summary.insert_count);
//! println!("Failed: {}", summary.failure_count);
//! # Ok(())
//! # }
//! ```

pub mod ingest;
pub mod parse;
pub mod synthesis;
