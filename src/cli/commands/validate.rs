//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the ingest configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates after parsing
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Allow Updates: {}", config.ingest.allow_updates);
        println!("  Default Country: {}", config.ingest.default_country);

        match config.database {
            Some(ref database) => {
                use secrecy::ExposeSecret;
                let connection_string: &str = database.connection_string.expose_secret().as_ref();
                println!(
                    "  Database: {}",
                    connection_string.split('@').next_back().unwrap_or("***")
                );
                println!("  Max Connections: {}", database.max_connections);
                println!("  SSL Mode: {}", database.ssl_mode);
            }
            None => println!("  Database: none (in-memory stores)"),
        }

        println!("  Image Resolver: {}", config.images.resolver_url);
        println!("  Image Derivatives: {}", config.images.derivative_base_url);
        println!(
            "  Image Retries: {} (initial delay {}ms)",
            config.images.retry.max_retries, config.images.retry.initial_delay_ms
        );
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_valid_dry_run_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[application]\ndry_run = true").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_missing_database_is_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[application]\nlog_level = \"info\"").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
