//! Ingest summary and reporting
//!
//! Counts and error text gathered while processing one annotation document.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::time::Duration;

use crate::core::synthesis::{OccurrenceOutcome, OutcomeKind};

/// Summary of one processed document
#[derive(Debug, Clone, Serialize)]
pub struct IngestSummary {
    /// Identifier of this run, repeated in every log line
    pub run_id: String,

    /// Document path or label
    pub source: String,

    pub started_at: DateTime<Utc>,

    /// Whether the document tokenized completely
    pub could_parse: bool,

    /// `could_parse` and no failed records
    pub success: bool,

    /// Error lines, in the order they occurred
    pub errors: Vec<String>,

    pub warnings: Vec<String>,

    /// Occurrence elements seen
    pub record_count: u64,

    /// Records inserted or updated
    pub success_count: u64,

    pub failure_count: u64,
    pub insert_count: u64,
    pub update_count: u64,

    /// Existing records left alone because updates are disabled
    pub skipped_count: u64,

    /// Count declared by the document, if any
    pub expected_annotations: Option<u64>,

    pub annotations_closed: u64,

    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

impl IngestSummary {
    /// Create an empty summary for a document
    pub fn new(run_id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            source: source.into(),
            started_at: Utc::now(),
            could_parse: true,
            success: false,
            errors: Vec::new(),
            warnings: Vec::new(),
            record_count: 0,
            success_count: 0,
            failure_count: 0,
            insert_count: 0,
            update_count: 0,
            skipped_count: 0,
            expected_annotations: None,
            annotations_closed: 0,
            duration: Duration::from_secs(0),
        }
    }

    /// Merge the outcome of one occurrence
    pub fn record_outcome(&mut self, outcome: OccurrenceOutcome) {
        match outcome.kind {
            OutcomeKind::Inserted => {
                self.insert_count += 1;
                self.success_count += 1;
            }
            OutcomeKind::Updated => {
                self.update_count += 1;
                self.success_count += 1;
            }
            OutcomeKind::Skipped => self.skipped_count += 1,
            OutcomeKind::Failed => self.failure_count += 1,
        }
        self.errors.extend(outcome.errors);
        self.warnings.extend(outcome.warnings);
    }

    /// Count a record that failed before reaching the synthesizer
    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.failure_count += 1;
        self.errors.push(message.into());
    }

    /// Mark the document as unparseable
    pub fn parse_failed(&mut self, message: impl Into<String>) {
        self.could_parse = false;
        self.errors.push(message.into());
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Close the summary once the document is done
    ///
    /// A declared annotation count that differs from the annotations closed
    /// becomes a warning.
    pub fn finish(&mut self, duration: Duration) {
        self.duration = duration;
        if let Some(expected) = self.expected_annotations {
            if expected != self.annotations_closed {
                self.warnings.push(format!(
                    "Expected {expected} annotations, found {}",
                    self.annotations_closed
                ));
            }
        }
        self.success = self.could_parse && self.failure_count == 0;
    }

    /// Newline-joined error text
    pub fn error_text(&self) -> String {
        self.errors.join("\n")
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            source = %self.source,
            could_parse = self.could_parse,
            success = self.success,
            records = self.record_count,
            inserted = self.insert_count,
            updated = self.update_count,
            skipped = self.skipped_count,
            failed = self.failure_count,
            annotations_closed = self.annotations_closed,
            duration_ms = self.duration.as_millis() as u64,
            "Ingest completed"
        );

        for warning in &self.warnings {
            tracing::warn!(run_id = %self.run_id, message = %warning, "Ingest warning");
        }

        if !self.errors.is_empty() {
            tracing::warn!(
                run_id = %self.run_id,
                error_count = self.errors.len(),
                "Ingest completed with errors"
            );
            for error in &self.errors {
                tracing::warn!(run_id = %self.run_id, message = %error, "Ingest error");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OccurrenceId;

    fn outcome(kind: OutcomeKind) -> OccurrenceOutcome {
        OccurrenceOutcome {
            kind,
            occid: OccurrenceId::new(1).ok(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_summary_creation() {
        let summary = IngestSummary::new("run", "doc.rdf");
        assert!(summary.could_parse);
        assert!(!summary.success);
        assert_eq!(summary.record_count, 0);
        assert!(summary.errors.is_empty());
    }

    #[test]
    fn test_outcomes_are_counted() {
        let mut summary = IngestSummary::new("run", "doc.rdf");
        summary.record_outcome(outcome(OutcomeKind::Inserted));
        summary.record_outcome(outcome(OutcomeKind::Updated));
        summary.record_outcome(outcome(OutcomeKind::Skipped));
        summary.finish(Duration::from_millis(5));

        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.insert_count, 1);
        assert_eq!(summary.update_count, 1);
        assert_eq!(summary.skipped_count, 1);
        assert_eq!(summary.failure_count, 0);
        assert!(summary.success);
    }

    #[test]
    fn test_failure_clears_success() {
        let mut summary = IngestSummary::new("run", "doc.rdf");
        summary.record_outcome(OccurrenceOutcome::failed("Error: [boom]"));
        summary.finish(Duration::from_millis(1));

        assert_eq!(summary.failure_count, 1);
        assert_eq!(summary.error_text(), "Error: [boom]");
        assert!(!summary.success);
    }

    #[test]
    fn test_parse_failure_clears_success() {
        let mut summary = IngestSummary::new("run", "doc.rdf");
        summary.parse_failed("Parse error at byte 10: unexpected end");
        summary.finish(Duration::from_millis(1));
        assert!(!summary.could_parse);
        assert!(!summary.success);
    }

    #[test]
    fn test_count_mismatch_is_warning() {
        let mut summary = IngestSummary::new("run", "doc.rdf");
        summary.expected_annotations = Some(3);
        summary.annotations_closed = 2;
        summary.finish(Duration::from_millis(1));

        assert!(summary.success);
        assert_eq!(summary.warnings, vec!["Expected 3 annotations, found 2"]);
    }

    #[test]
    fn test_summary_serializes_duration_in_millis() {
        let mut summary = IngestSummary::new("run", "doc.rdf");
        summary.finish(Duration::from_millis(1500));
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["duration_ms"], 1500);
        assert_eq!(json["could_parse"], true);
        assert!(json["started_at"].as_str().unwrap().contains('T'));
    }
}
