//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for occurrence-ingest using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// occurrence-ingest - Annotation documents to collection records
#[derive(Parser, Debug)]
#[command(name = "occurrence-ingest")]
#[command(version, about, long_about = None)]
#[command(author = "Occurrence Ingest Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "ingest.toml", env = "INGEST_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "INGEST_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest annotation documents into the collection database
    Ingest(commands::ingest::IngestArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use commands::ingest::OutputFormat;

    #[test]
    fn test_cli_parse_ingest() {
        let cli = Cli::parse_from(["occurrence-ingest", "ingest", "a.rdf", "b.rdf"]);
        assert_eq!(cli.config, "ingest.toml");
        match cli.command {
            Commands::Ingest(args) => {
                assert_eq!(args.files.len(), 2);
                assert!(!args.dry_run);
                assert_eq!(args.format, OutputFormat::Text);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_ingest_flags() {
        let cli = Cli::parse_from([
            "occurrence-ingest",
            "ingest",
            "--dry-run",
            "--allow-updates",
            "--format",
            "json",
            "a.rdf",
        ]);
        match cli.command {
            Commands::Ingest(args) => {
                assert!(args.dry_run);
                assert!(args.allow_updates);
                assert_eq!(args.format, OutputFormat::Json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_ingest_requires_files() {
        assert!(Cli::try_parse_from(["occurrence-ingest", "ingest"]).is_err());
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["occurrence-ingest", "--config", "custom.toml", "init"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["occurrence-ingest", "--log-level", "debug", "validate-config"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["occurrence-ingest", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
