//! Gateway factory
//!
//! Builds the record store and image store from configuration.

use crate::adapters::database::traits::{ImageStore, OccurrenceGateway};
use crate::adapters::memory::{MemoryGateway, MemoryImageStore};
use crate::adapters::postgresql::adapter::PostgreSQLAdapter;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::config::IngestConfig;
use crate::domain::{IngestError, Result};
use std::sync::Arc;

/// Occurrence and image gateways sharing one backend
#[derive(Clone)]
pub struct Gateways {
    pub occurrences: Arc<dyn OccurrenceGateway + Send + Sync>,
    pub images: Arc<dyn ImageStore + Send + Sync>,
}

/// Create the gateways described by the configuration
///
/// Dry runs use permissive in-memory stores so nothing is written. Otherwise
/// a PostgreSQL pool is created, the connection tested and the schema
/// ensured, and one adapter serves both traits.
///
/// # Errors
///
/// Returns an error if the database section is missing or the database
/// cannot be reached.
pub async fn create_gateways(config: &IngestConfig) -> Result<Gateways> {
    if config.application.dry_run {
        tracing::info!("Creating in-memory gateways for dry run");
        return Ok(Gateways {
            occurrences: Arc::new(MemoryGateway::permissive()),
            images: Arc::new(MemoryImageStore::new()),
        });
    }

    let pg_config = config.database.as_ref().ok_or_else(|| {
        IngestError::Configuration("database configuration is required".to_string())
    })?;

    tracing::info!("Creating PostgreSQL gateways");
    let client = Arc::new(PostgreSQLClient::new(pg_config.clone()).await?);
    client.test_connection().await?;
    client.ensure_schema().await?;
    let adapter = Arc::new(PostgreSQLAdapter::new_with_arc(client));

    Ok(Gateways {
        occurrences: adapter.clone() as Arc<dyn OccurrenceGateway + Send + Sync>,
        images: adapter as Arc<dyn ImageStore + Send + Sync>,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_uses_memory_gateways() {
        let mut config = IngestConfig::default();
        config.application.dry_run = true;

        let gateways = create_gateways(&config).await.unwrap();
        let collid = gateways
            .occurrences
            .resolve_collection_id("HUH", "GH")
            .await
            .unwrap();
        assert!(collid.is_some());
        assert!(gateways
            .images
            .find_by_source_url("http://x/1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_missing_database_is_configuration_error() {
        let config = IngestConfig::default();
        assert!(matches!(
            create_gateways(&config).await,
            Err(IngestError::Configuration(_))
        ));
    }
}
