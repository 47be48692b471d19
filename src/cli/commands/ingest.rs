//! Ingest command implementation
//!
//! This module implements the `ingest` command, which processes one or more
//! annotation documents into the collection database.

use crate::config::read_config;
use crate::core::ingest::{AnnotationProcessor, IngestSummary};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use tokio::sync::watch;

/// Summary output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Arguments for the ingest command
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Annotation documents to process, in order
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Dry run mode - synthesize records against in-memory stores only
    #[arg(long)]
    pub dry_run: bool,

    /// Update records that already exist instead of skipping them
    #[arg(long)]
    pub allow_updates: bool,

    /// Summary output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl IngestArgs {
    /// Execute the ingest command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(files = self.files.len(), "Starting ingest command");

        let mut config = match read_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        // Apply CLI overrides
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if self.allow_updates {
            tracing::info!("Enabling record updates from CLI");
            config.ingest.allow_updates = true;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        if config.application.dry_run && self.format == OutputFormat::Text {
            println!("🔍 DRY RUN MODE - No records will be written to the database");
            println!();
        }

        let processor = match AnnotationProcessor::from_config(&config).await {
            Ok(p) => p.with_shutdown(shutdown_signal.clone()),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create annotation processor");
                eprintln!("Failed to initialize ingest: {e}");
                return Ok(5);
            }
        };

        let mut summaries = Vec::with_capacity(self.files.len());
        for path in &self.files {
            if *shutdown_signal.borrow() {
                tracing::info!(path = %path.display(), "Shutdown requested, skipping remaining documents");
                break;
            }
            summaries.push(processor.process_file(path).await);
        }

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
            OutputFormat::Text => summaries.iter().for_each(print_summary),
        }

        Ok(exit_code(&summaries))
    }
}

fn print_summary(summary: &IngestSummary) {
    println!("📊 Ingest Summary: {}", summary.source);
    println!("  Run ID: {}", summary.run_id);
    println!("  Started: {}", summary.started_at.to_rfc3339());
    println!("  Parsed: {}", if summary.could_parse { "yes" } else { "no" });
    println!("  Records: {}", summary.record_count);
    println!("  Inserted: {}", summary.insert_count);
    println!("  Updated: {}", summary.update_count);
    println!("  Skipped: {}", summary.skipped_count);
    println!("  Failed: {}", summary.failure_count);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());

    if !summary.warnings.is_empty() {
        println!("  ⚠️  Warnings:");
        for warning in &summary.warnings {
            println!("    - {warning}");
        }
    }

    if !summary.errors.is_empty() {
        println!("  ❌ Errors:");
        for error in &summary.errors {
            println!("    - {error}");
        }
    }

    if summary.success {
        println!("✅ Document ingested successfully");
    }
    println!();
}

/// Worst outcome across documents: 3 if any could not be parsed, 1 if any
/// record failed, otherwise 0
fn exit_code(summaries: &[IngestSummary]) -> i32 {
    if summaries.iter().any(|s| !s.could_parse) {
        3
    } else if summaries.iter().any(|s| s.failure_count > 0) {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn summary() -> IngestSummary {
        IngestSummary::new("run", "doc.rdf")
    }

    #[test]
    fn test_ingest_args_defaults() {
        let args = IngestArgs {
            files: vec![PathBuf::from("doc.rdf")],
            dry_run: false,
            allow_updates: false,
            format: OutputFormat::default(),
        };

        assert_eq!(args.files.len(), 1);
        assert!(!args.dry_run);
        assert!(!args.allow_updates);
        assert_eq!(args.format, OutputFormat::Text);
    }

    #[test]
    fn test_exit_code_success() {
        let mut ok = summary();
        ok.finish(Duration::ZERO);
        assert_eq!(exit_code(&[ok]), 0);
        assert_eq!(exit_code(&[]), 0);
    }

    #[test]
    fn test_exit_code_record_failure() {
        let mut failed = summary();
        failed.record_failure("Error: [boom]");
        assert_eq!(exit_code(&[summary(), failed]), 1);
    }

    #[test]
    fn test_exit_code_parse_failure_wins() {
        let mut failed = summary();
        failed.record_failure("Error: [boom]");
        let mut unparsed = summary();
        unparsed.parse_failed("Parse error at byte 3: unexpected end");
        assert_eq!(exit_code(&[failed, unparsed]), 3);
    }
}
