//! PostgreSQL database integration
//!
//! Stores occurrences, determinations and images in a Symbiota-shaped
//! schema and resolves collections and taxa against it.

pub mod adapter;
pub mod client;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;
