//! PostgreSQL client implementation
//!
//! Connection pooling over `deadpool-postgres`, with TLS through
//! `postgres-native-tls` when the configured `ssl_mode` asks for it.

use crate::config::DatabaseConfig;
use crate::domain::{IngestError, Result};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use postgres_native_tls::MakeTlsConnector;
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::config::SslMode;
use tokio_postgres::{NoTls, Row};

/// PostgreSQL client for the collection database
///
/// Provides methods for connecting, initializing the schema and running
/// statements using a connection pool.
pub struct PostgreSQLClient {
    /// Connection pool
    pool: Pool,

    /// Configuration
    config: DatabaseConfig,
}

/// How the pool negotiates TLS for a configured `ssl_mode`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TlsPolicy {
    Plain,
    Encrypted { verify: bool },
}

fn tls_policy(ssl_mode: &str) -> TlsPolicy {
    match ssl_mode {
        "require" => TlsPolicy::Encrypted { verify: false },
        "verify-ca" | "verify-full" => TlsPolicy::Encrypted { verify: true },
        _ => TlsPolicy::Plain,
    }
}

impl PostgreSQLClient {
    /// Create a new PostgreSQL client
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string does not parse, the TLS
    /// connector cannot be built or the pool cannot be created.
    pub async fn new(config: DatabaseConfig) -> Result<Self> {
        let connection_string: &str = config.connection_string.expose_secret().as_ref();
        let mut pg_config: tokio_postgres::Config = connection_string.parse().map_err(|e| {
            IngestError::Configuration(format!("Invalid PostgreSQL connection string: {e}"))
        })?;

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let manager = match tls_policy(&config.ssl_mode) {
            TlsPolicy::Plain => {
                if config.ssl_mode == "disable" {
                    pg_config.ssl_mode(SslMode::Disable);
                }
                Manager::from_config(pg_config, NoTls, manager_config)
            }
            TlsPolicy::Encrypted { verify } => {
                pg_config.ssl_mode(SslMode::Require);
                let connector = native_tls::TlsConnector::builder()
                    .danger_accept_invalid_certs(!verify)
                    .danger_accept_invalid_hostnames(config.ssl_mode != "verify-full")
                    .build()
                    .map_err(|e| {
                        IngestError::Configuration(format!("Failed to build TLS connector: {e}"))
                    })?;
                Manager::from_config(pg_config, MakeTlsConnector::new(connector), manager_config)
            }
        };

        let timeout = Duration::from_secs(config.connection_timeout_seconds);
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .wait_timeout(Some(timeout))
            .create_timeout(Some(timeout))
            .recycle_timeout(Some(timeout))
            .runtime(deadpool_postgres::Runtime::Tokio1)
            .build()
            .map_err(|e| IngestError::Database(format!("Failed to create connection pool: {e}")))?;

        Ok(Self { pool, config })
    }

    /// Test the connection to PostgreSQL
    pub async fn test_connection(&self) -> Result<()> {
        let client = self.get_connection().await?;

        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| IngestError::Database(format!("Connection test failed: {e}")))?;

        tracing::info!(database = %self.connection_string_safe(), "PostgreSQL connection test successful");
        Ok(())
    }

    /// Create the collection schema if it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the migration fails.
    pub async fn ensure_schema(&self) -> Result<()> {
        let client = self.get_connection().await?;

        let migration_sql = include_str!("../../../migrations/001_initial_schema.sql");

        client
            .batch_execute(migration_sql)
            .await
            .map_err(|e| IngestError::Database(format!("Failed to execute migration: {e}")))?;

        tracing::info!("PostgreSQL schema initialized successfully");
        Ok(())
    }

    /// Get a connection from the pool with the statement timeout applied
    ///
    /// # Errors
    ///
    /// Returns an error if a connection cannot be obtained.
    pub async fn get_connection(&self) -> Result<deadpool_postgres::Object> {
        let client = self.pool.get().await.map_err(|e| {
            IngestError::Database(format!("Failed to get connection from pool: {e}"))
        })?;

        let timeout_query = format!(
            "SET statement_timeout = {}",
            self.config.statement_timeout_seconds * 1000
        );
        client.batch_execute(&timeout_query).await.map_err(|e| {
            IngestError::Database(format!("Failed to set statement timeout: {e}"))
        })?;

        Ok(client)
    }

    /// Execute a query and return rows
    ///
    /// The error text is the server's own message so callers can report it
    /// unchanged.
    pub async fn query(
        &self,
        query: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> std::result::Result<Vec<Row>, String> {
        let client = self.get_connection().await.map_err(|e| e.to_string())?;
        client.query(query, params).await.map_err(db_message)
    }

    /// Execute a query expecting at most one row
    pub async fn query_opt(
        &self,
        query: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> std::result::Result<Option<Row>, String> {
        let client = self.get_connection().await.map_err(|e| e.to_string())?;
        client.query_opt(query, params).await.map_err(db_message)
    }

    /// Execute a statement and return the number of affected rows
    pub async fn execute(
        &self,
        statement: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> std::result::Result<u64, String> {
        let client = self.get_connection().await.map_err(|e| e.to_string())?;
        client.execute(statement, params).await.map_err(db_message)
    }

    /// Get the connection string (without password)
    pub fn connection_string_safe(&self) -> String {
        let connection_string: &str = self.config.connection_string.expose_secret().as_ref();
        redact_connection_string(connection_string)
    }

    /// Get the pool statistics
    pub fn pool_status(&self) -> deadpool_postgres::Status {
        self.pool.status()
    }
}

fn redact_connection_string(connection_string: &str) -> String {
    match connection_string.rsplit_once('@') {
        Some((_, host)) => format!("postgresql://***@{host}"),
        None => "postgresql://***".to_string(),
    }
}

/// Prefers the server's error message over the driver's wrapper text
fn db_message(error: tokio_postgres::Error) -> String {
    match error.as_db_error() {
        Some(db) => db.message().to_string(),
        None => error.to_string(),
    }
}
