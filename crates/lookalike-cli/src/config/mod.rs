//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── store: StoreKind            # postgres | memory
//! ├── log_format: LogFormat       # text | json
//! ├── pipeline: PipelineConfig    # Embedding widths, timeouts, ingest locking
//! ├── postgres: PgConfig          # Connection pool
//! ├── inference: ReqwestConfig    # Embedding service endpoint
//! └── command: Command            # What to run
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! lookalike --postgres-url "postgresql://..." search --text "red bicycle"
//!
//! # Or via environment variables
//! POSTGRES_URL="postgresql://..." lookalike search --text "red bicycle"
//! ```

mod command;
mod provider;

use anyhow::Context;
use clap::{Parser, ValueEnum};
pub use command::{Command, IngestArgs, QuerySource, SearchArgs, SimilarArgs};
use lookalike_engine::PipelineConfig;
use lookalike_postgres::PgConfig;
use lookalike_reqwest::ReqwestConfig;
pub use provider::{create_pipeline, create_postgres_client};
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Backing store for vector records and item metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// PostgreSQL with the pgvector extension.
    #[default]
    Postgres,
    /// In-process store, empty on every run.
    Memory,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "lookalike")]
#[command(about = "Visual similarity search and duplicate detection")]
#[command(version)]
pub struct Cli {
    /// Backing store for records and metadata.
    #[arg(
        long,
        env = "LOOKALIKE_STORE",
        value_enum,
        default_value_t = StoreKind::Postgres,
        global = true
    )]
    pub store: StoreKind,

    /// Log output format.
    #[arg(
        long,
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Text,
        global = true
    )]
    pub log_format: LogFormat,

    /// Pipeline configuration.
    #[clap(flatten)]
    pub pipeline: PipelineConfig,

    /// PostgreSQL connection pool configuration.
    #[clap(flatten)]
    pub postgres: PgConfig,

    /// Inference service configuration.
    #[clap(flatten)]
    pub inference: ReqwestConfig,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Loads `.env` (when enabled) and parses the command line.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(error) = dotenvy::dotenv()
            && !error.not_found()
        {
            eprintln!("Warning: failed to load .env file: {error}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Validates every configuration group the selected store needs.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.pipeline
            .validate()
            .context("invalid pipeline configuration")?;

        if self.store == StoreKind::Postgres {
            self.postgres
                .validate()
                .context("invalid postgres configuration")?;
        }

        self.inference
            .validate()
            .context("invalid inference configuration")?;

        Ok(())
    }

    /// Logs the effective configuration.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            store = ?self.store,
            image_dimensions = self.pipeline.dimensions.image,
            text_dimensions = self.pipeline.dimensions.text,
            request_timeout_ms = self.pipeline.request_timeout_ms,
            serialize_ingest = self.pipeline.serialize_ingest,
            "pipeline configuration"
        );

        if self.store == StoreKind::Postgres {
            tracing::debug!(
                target: TRACING_TARGET_CONFIG,
                postgres = ?self.postgres,
                "postgres configuration"
            );
        }

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            inference_url = %self.inference.inference_url,
            inference_timeout_secs = self.inference.inference_timeout_secs,
            "inference configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use lookalike_core::types::Modality;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("lookalike").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["health", "--store", "memory", "--log-format", "json"]);
        assert_eq!(cli.store, StoreKind::Memory);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(matches!(cli.command, Command::Health));
    }

    #[test]
    fn test_pipeline_flags() {
        let cli = parse(&[
            "--image-dimensions",
            "768",
            "--text-dimensions",
            "384",
            "--serialize-ingest",
            "migrate",
        ]);
        assert_eq!(cli.pipeline.dimensions.image, 768);
        assert_eq!(cli.pipeline.dimensions.text, 384);
        assert!(cli.pipeline.serialize_ingest);
        assert!(matches!(cli.command, Command::Migrate));
    }

    #[test]
    fn test_ingest_requires_exactly_one_image_source() {
        let cli = parse(&["ingest", "--id", "7", "--embedding", "item.json"]);
        let Command::Ingest(args) = cli.command else {
            panic!("expected ingest");
        };
        assert_eq!(args.id, 7);
        assert_eq!(args.source.embedding.as_deref(), Some(std::path::Path::new("item.json")));

        let both = ["lookalike", "ingest", "--id", "7", "--embedding", "a.json", "--image", "a.jpg"];
        assert!(Cli::try_parse_from(both).is_err());

        let neither = ["lookalike", "ingest", "--id", "7"];
        assert!(Cli::try_parse_from(neither).is_err());
    }

    #[test]
    fn test_ingest_text_sources_conflict() {
        let args = [
            "lookalike",
            "ingest",
            "--id",
            "1",
            "--image",
            "a.jpg",
            "--caption",
            "a red bicycle",
            "--text-embedding",
            "caption.json",
        ];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_search_with_tags_and_modality() {
        let cli = parse(&[
            "search",
            "--embedding",
            "query.json",
            "--modality",
            "text",
            "--tag",
            "cat",
            "--tag",
            "outdoor",
        ]);
        let Command::Search(args) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(args.modality, Some(Modality::Text));
        assert_eq!(args.tags, vec!["cat", "outdoor"]);
    }

    #[test]
    fn test_modality_requires_embedding_source() {
        let args = ["lookalike", "search", "--text", "sunset", "--modality", "text"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_memory_store_validates_without_database() {
        let mut cli = parse(&["--store", "memory", "health"]);
        cli.postgres.postgres_url = String::new();
        assert!(cli.validate().is_ok());

        cli.store = StoreKind::Postgres;
        assert!(cli.validate().is_err());
    }
}
