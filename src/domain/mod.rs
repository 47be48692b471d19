//! Domain models and types for the occurrence ingest pipeline.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Parsed document model** ([`Annotation`], [`Occurrence`], [`Identification`],
//!   [`CollectingEvent`], [`AssociatedMedia`], [`AccessPoint`])
//! - **Output records** ([`OccurrenceRecord`], [`DeterminationRecord`], [`ImageRecord`])
//! - **Strongly-typed identifiers** ([`OccurrenceId`], [`CollectionId`], [`TaxonId`], [`ImageId`])
//! - **Error types** ([`IngestError`], [`GatewayError`], [`ImageServiceError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Database keys use the newtype pattern so different key kinds cannot be mixed:
//!
//! ```rust
//! use occurrence_ingest::domain::{CollectionId, OccurrenceId};
//!
//! # fn example() -> Result<(), String> {
//! let occid = OccurrenceId::new(1201)?;
//! let collid = CollectionId::new(4)?;
//!
//! // This won't compile - type safety prevents mixing keys
//! // let wrong: OccurrenceId = collid;
//! # let _ = (occid, collid);
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, IngestError>`]:
//!
//! ```rust
//! use occurrence_ingest::domain::Result;
//!
//! fn example() -> Result<()> {
//!     let _config = occurrence_ingest::config::IngestConfig::from_file("ingest.toml")?;
//!     Ok(())
//! }
//! ```

pub mod annotation;
pub mod errors;
pub mod event;
pub mod identification;
pub mod ids;
pub mod media;
pub mod occurrence;
pub mod records;
pub mod result;

// Re-export commonly used types for convenience
pub use annotation::{Annotation, Annotator, Expectation};
pub use errors::{GatewayError, ImageServiceError, IngestError};
pub use event::CollectingEvent;
pub use identification::{Identification, DEFAULT_NOMENCLATURAL_CODE};
pub use ids::{CollectionId, ImageId, OccurrenceId, TaxonId};
pub use media::{AccessPoint, AssociatedMedia, MediaFormat};
pub use occurrence::{Occurrence, DEFAULT_BASIS_OF_RECORD};
pub use records::{
    DeterminationRecord, EventDates, Georeference, ImageRecord, OccurrenceRecord,
    RecordIdentity, StoredImage, StoredOccurrence, TaxonFields,
};
pub use result::Result;
