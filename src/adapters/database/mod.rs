//! Record store abstraction layer
//!
//! Trait-based seams for persisting occurrences, determinations and images,
//! so the synthesizer works against PostgreSQL or the in-memory stores alike.

pub mod factory;
pub mod traits;

pub use factory::{create_gateways, Gateways};
pub use traits::{Gazetteer, GatewayResult, ImageStore, OccurrenceGateway};
