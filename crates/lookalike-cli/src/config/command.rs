//! Subcommands and their arguments.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use lookalike_core::types::{ItemId, Modality};

/// What the CLI runs.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Applies pending database migrations.
    Migrate,
    /// Ingests an item with duplicate detection.
    Ingest(IngestArgs),
    /// Searches and ranks the results into similarity bands.
    Search(SearchArgs),
    /// Lists the nearest non-duplicate items without banding.
    Similar(SimilarArgs),
    /// Removes an item's vector record.
    Delete {
        /// Item identifier.
        #[arg(long)]
        id: ItemId,
    },
    /// Reports the health of every collaborator.
    Health,
}

/// Where an ingested item's image embedding comes from.
#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct ImageSource {
    /// JSON file holding a precomputed image embedding.
    #[arg(long, value_name = "FILE")]
    pub embedding: Option<PathBuf>,

    /// Image file to embed through the inference service.
    #[arg(long, value_name = "FILE")]
    pub image: Option<PathBuf>,
}

/// Arguments of the `ingest` subcommand.
#[derive(Debug, Clone, Args)]
pub struct IngestArgs {
    /// Item identifier.
    #[arg(long)]
    pub id: ItemId,

    #[command(flatten)]
    pub source: ImageSource,

    /// JSON file holding a precomputed text embedding.
    #[arg(long, value_name = "FILE", conflicts_with = "caption")]
    pub text_embedding: Option<PathBuf>,

    /// Caption to embed as the item's text embedding.
    #[arg(long)]
    pub caption: Option<String>,
}

/// Where a query embedding comes from.
#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct QuerySource {
    /// JSON file holding a query embedding.
    #[arg(long, value_name = "FILE")]
    pub embedding: Option<PathBuf>,

    /// Image file to embed as the query.
    #[arg(long, value_name = "FILE")]
    pub image: Option<PathBuf>,

    /// Text to embed as the query; compared against image embeddings.
    #[arg(long)]
    pub text: Option<String>,
}

/// Arguments of the `search` subcommand.
#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    #[command(flatten)]
    pub source: QuerySource,

    /// Embedding column a `--embedding` query is compared against [default: image].
    #[arg(long, value_enum, requires = "embedding")]
    pub modality: Option<Modality>,

    /// Only return items carrying this tag. Repeatable.
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,
}

/// Arguments of the `similar` subcommand.
#[derive(Debug, Clone, Args)]
pub struct SimilarArgs {
    #[command(flatten)]
    pub source: QuerySource,

    /// Embedding column a `--embedding` query is compared against [default: image].
    #[arg(long, value_enum, requires = "embedding")]
    pub modality: Option<Modality>,
}
