//! Annotation processor - drives one document from bytes to stored records
//!
//! Events are pulled from the reader, fed to the state machine, and every
//! sealed annotation is handed to the synthesizer before the next event is
//! read. Processing is strictly sequential.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, BufReader};
use tokio::sync::watch;
use uuid::Uuid;

use super::summary::IngestSummary;
use crate::adapters::database::create_gateways;
use crate::adapters::imaging::{HttpImageResolver, ImageResolver};
use crate::adapters::memory::MemoryImageResolver;
use crate::config::IngestConfig;
use crate::core::parse::{AnnotationStateMachine, EventReader};
use crate::core::synthesis::RecordSynthesizer;
use crate::domain::{Annotation, Result};
use crate::{log_annotation_committed, log_ingest_complete};

/// Processes annotation documents into the collection database
pub struct AnnotationProcessor {
    synthesizer: RecordSynthesizer,
    shutdown: Option<watch::Receiver<bool>>,
}

impl AnnotationProcessor {
    /// Create a processor around an existing synthesizer
    pub fn new(synthesizer: RecordSynthesizer) -> Self {
        Self {
            synthesizer,
            shutdown: None,
        }
    }

    /// Build the gateways and image resolver the configuration asks for
    ///
    /// A dry run uses in-memory stores and resolves image URIs locally.
    pub async fn from_config(config: &IngestConfig) -> Result<Self> {
        let gateways = create_gateways(config).await?;

        let resolver: Arc<dyn ImageResolver + Send + Sync> = if config.application.dry_run {
            Arc::new(MemoryImageResolver::new())
        } else {
            Arc::new(HttpImageResolver::new(config.images.clone())?)
        };

        let synthesizer = RecordSynthesizer::new(
            gateways,
            resolver,
            config.ingest.clone(),
            &config.images.derivative_base_url,
        )?;

        Ok(Self::new(synthesizer))
    }

    /// Stop before the next commit once the channel carries `true`
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Process one document read from `reader`
    ///
    /// Never fails: parse errors and per-record failures are reported in the
    /// returned summary. Annotations committed before a parse error stay
    /// committed.
    pub async fn process<R>(&self, reader: R, source: &str) -> IngestSummary
    where
        R: AsyncBufRead + Unpin,
    {
        let run_id = Uuid::new_v4().to_string();
        let start = Instant::now();
        let mut summary = IngestSummary::new(run_id.clone(), source);
        let mut events = EventReader::new(reader);
        let mut machine = AnnotationStateMachine::new();

        tracing::info!(run_id = %run_id, source = %source, "Processing annotation document");

        loop {
            let event = match events.next_event().await {
                Ok(Some(event)) => event,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(
                        run_id = %run_id,
                        position = events.position(),
                        error = %e,
                        "Document could not be parsed"
                    );
                    summary.parse_failed(e.to_string());
                    break;
                }
            };

            let Some(annotation) = machine.handle(event) else {
                continue;
            };

            if self.shutdown_requested() {
                tracing::warn!(
                    run_id = %run_id,
                    annotation_id = %annotation.id,
                    "Shutdown requested, stopping before commit"
                );
                summary.add_warning(format!(
                    "Shutdown requested; stopped before annotation {}",
                    annotation.id
                ));
                break;
            }

            self.commit(&run_id, annotation, &mut summary).await;
        }

        summary.record_count = machine.occurrences_seen();
        summary.expected_annotations = machine.expected_annotations();
        summary.annotations_closed = machine.annotations_closed();
        summary.finish(start.elapsed());

        log_ingest_complete!(run_id, summary.record_count, summary.duration);
        summary.log_summary();
        summary
    }

    /// Process the document at `path`
    ///
    /// A file that cannot be opened is reported as unparseable.
    pub async fn process_file(&self, path: impl AsRef<Path>) -> IngestSummary {
        let path = path.as_ref();
        let source = path.display().to_string();

        match File::open(path).await {
            Ok(file) => self.process(BufReader::new(file), &source).await,
            Err(e) => {
                tracing::error!(path = %source, error = %e, "Failed to open annotation document");
                let mut summary = IngestSummary::new(Uuid::new_v4().to_string(), source.clone());
                summary.parse_failed(format!("Failed to open {source}: {e}"));
                summary.finish(Duration::ZERO);
                summary
            }
        }
    }

    async fn commit(&self, run_id: &str, annotation: Annotation, summary: &mut IngestSummary) {
        let Some(occurrence) = annotation.occurrence.as_ref() else {
            tracing::warn!(
                run_id = %run_id,
                annotation_id = %annotation.id,
                "Annotation closed without an occurrence"
            );
            summary.record_failure(format!(
                "Error: annotation {} contains no occurrence",
                annotation.id
            ));
            return;
        };

        tracing::debug!(
            run_id = %run_id,
            annotation_id = %annotation.id,
            expectation = %annotation.expectation,
            annotator = %annotation.annotator_name(),
            "Submitting occurrence"
        );

        let outcome = self.synthesizer.submit(occurrence).await;
        log_annotation_committed!(
            run_id,
            annotation.id,
            occurrence.catalog_number,
            outcome.kind
        );
        summary.record_outcome(outcome);
    }
}
