//! Record synthesis
//!
//! Turns a sealed [`Occurrence`](crate::domain::Occurrence) into occurrence,
//! determination and image rows written through the gateway traits.

pub mod fields;
pub mod images;
pub mod synthesizer;

pub use images::{DerivativeUrlBuilder, MediaUrls};
pub use synthesizer::{OccurrenceOutcome, OutcomeKind, RecordSynthesizer};
