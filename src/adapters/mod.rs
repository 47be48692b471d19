//! External system integrations.
//!
//! - [`database`] - Gateway traits and the factory that builds them
//! - [`postgresql`] - PostgreSQL record and image store
//! - [`imaging`] - Image resolution service client
//! - [`memory`] - In-memory implementations for dry runs and tests
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits so the record
//! synthesizer can run against a live collection database or in-memory
//! stores:
//!
//! ```rust
//! use occurrence_ingest::adapters::database::OccurrenceGateway;
//! use occurrence_ingest::adapters::memory::MemoryGateway;
//! use occurrence_ingest::domain::ids::CollectionId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = MemoryGateway::new()
//!     .with_collection(CollectionId::new(1)?, "HUH", "GH");
//! let collid = gateway.resolve_collection_id("HUH", "GH").await?;
//! assert_eq!(collid.map(|c| c.get()), Some(1));
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod imaging;
pub mod memory;
pub mod postgresql;
