//! Configuration management.
//!
//! `ingest.toml` is parsed with `toml`, supports `${VAR_NAME}` environment
//! substitution, `INGEST_*` environment overrides and is validated on load.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use occurrence_ingest::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("ingest.toml")?;
//! println!("Allow updates: {}", config.ingest.allow_updates);
//! println!("Resolver: {}", config.images.resolver_url);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and dry-run switch
//! - [`IngestPolicyConfig`] - Update policy and synthesis defaults
//! - [`DatabaseConfig`] - PostgreSQL record store
//! - [`ImageServiceConfig`] - Image resolution service and retries
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [ingest]
//! allow_updates = false
//! default_country = "United States of America"
//!
//! [database]
//! connection_string = "${INGEST_DB_URL}"
//!
//! [images]
//! resolver_url = "http://bovary.iplantcollaborative.org/image_service/resource_by_uri"
//! derivative_base_url = "http://bovary.iplantcollaborative.org/image_service/image/"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, read_config};
pub use schema::{
    ApplicationConfig, DatabaseConfig, ImageServiceConfig, IngestConfig, IngestPolicyConfig,
    LoggingConfig, RetryConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};

impl IngestConfig {
    /// Loads and validates a configuration file
    ///
    /// # Errors
    ///
    /// See [`load_config`].
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::domain::Result<Self> {
        load_config(path)
    }
}
