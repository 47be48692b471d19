//! Document ingest: the processor driving parse and synthesis, and the
//! summary it reports

pub mod processor;
pub mod summary;

pub use processor::AnnotationProcessor;
pub use summary::IngestSummary;
