// Occurrence Ingest - Annotation documents to natural history collection records
// Copyright (c) 2025 Occurrence Ingest Contributors
// Licensed under the MIT License

//! # Occurrence Ingest
//!
//! Occurrence Ingest reads specimen-occurrence annotation documents (RDF/XML using the
//! Open Annotation, Darwin Core and Audubon Core vocabularies) and writes occurrence,
//! determination and image records into a Symbiota-shaped collection database.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Parsing** annotation documents as a stream, one annotation at a time
//! - **Synthesizing** database rows: collector splitting, date truncation, taxon rank
//!   inference, authority name resolution and record identity
//! - **Resolving** image access points to derivative URLs through an image service
//! - **Reporting** per-document counts, errors and warnings
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Parse state machine, record synthesis and document processing
//! - [`adapters`] - External integrations (PostgreSQL, image service, in-memory stores)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use occurrence_ingest::config::IngestConfig;
//! use occurrence_ingest::core::ingest::AnnotationProcessor;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = IngestConfig::from_file("ingest.toml")?;
//!
//!     let processor = AnnotationProcessor::from_config(&config).await?;
//!     let summary = processor.process_file("annotations.rdf").await;
//!
//!     println!(
//!         "Inserted {}, updated {}, failed {}",
//!         summary.insert_count, summary.update_count, summary.failure_count
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Streaming Parse
//!
//! Each annotation is handed on as soon as it closes, so memory use does not grow
//! with the document:
//!
//! ```rust
//! use occurrence_ingest::core::parse::{AnnotationStateMachine, EventReader};
//!
//! # async fn example() -> occurrence_ingest::domain::Result<()> {
//! let xml = r#"<rdf:RDF><oa:Annotation rdf:about="urn:uuid:a1">
//!   <dwcFP:Occurrence><dwc:catalogNumber>00012345</dwc:catalogNumber></dwcFP:Occurrence>
//! </oa:Annotation></rdf:RDF>"#;
//!
//! let mut events = EventReader::new(xml.as_bytes());
//! let mut machine = AnnotationStateMachine::new();
//! while let Some(event) = events.next_event().await? {
//!     if let Some(annotation) = machine.handle(event) {
//!         assert_eq!(annotation.id, "urn:uuid:a1");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return [`domain::IngestError`]. Per-record problems never abort a
//! document; they are collected in the [`core::ingest::IngestSummary`].
//!
//! ## Logging
//!
//! Structured logging uses the `tracing` crate; every line of a run carries its `run_id`.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
