//! Subcommand execution.
//!
//! Command output is printed to stdout as pretty JSON.

mod signal;

use std::path::Path;

use anyhow::{Context, bail};
use lookalike_core::ServiceStatus;
use lookalike_core::types::{EmbeddingVector, ItemId, Modality};
use lookalike_engine::{IngestOutcome, IngestRequest, Pipeline, SearchRequest, SearchResults};
use lookalike_postgres::PgClientMigrationExt;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::TRACING_TARGET_COMMAND;
use crate::config::{
    Cli, Command, IngestArgs, QuerySource, SearchArgs, SimilarArgs, StoreKind, create_pipeline,
    create_postgres_client,
};

/// Migration summary printed by `migrate`.
#[derive(Debug, Serialize)]
struct MigrationReport<'a> {
    applied_versions: &'a [String],
    duration_ms: u128,
}

/// Confirmation printed by `delete`.
#[derive(Debug, Serialize)]
struct Deleted {
    deleted: ItemId,
}

/// Runs the parsed command.
pub async fn execute(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Command::Migrate => migrate(cli).await,
        command => {
            let pipeline = create_pipeline(cli)?;
            run(&pipeline, command).await
        }
    }
}

/// Runs a pipeline command and prints its result.
async fn run(pipeline: &Pipeline, command: &Command) -> anyhow::Result<()> {
    match command {
        Command::Migrate => bail!("migrations are not a pipeline command"),
        Command::Ingest(args) => print_json(&ingest(pipeline, args).await?),
        Command::Search(args) => print_json(&search(pipeline, args).await?),
        Command::Similar(args) => print_json(&similar(pipeline, args).await?),
        Command::Delete { id } => {
            pipeline
                .delete(*id)
                .await
                .with_context(|| format!("failed to delete item {id}"))?;
            print_json(&Deleted { deleted: *id })
        }
        Command::Health => {
            let health = pipeline.health().await;
            print_json(&health)?;

            if health.status() == ServiceStatus::Unhealthy {
                bail!("one or more collaborators are unhealthy");
            }
            Ok(())
        }
    }
}

async fn migrate(cli: &Cli) -> anyhow::Result<()> {
    if cli.store != StoreKind::Postgres {
        bail!("migrations require the postgres store");
    }

    let client = create_postgres_client(cli)?;
    let result = client
        .run_pending_migrations()
        .await
        .context("failed to run database migrations")?;

    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        applied = result.applied_count(),
        up_to_date = result.is_up_to_date(),
        "migrations finished"
    );

    print_json(&MigrationReport {
        applied_versions: &result.applied_versions,
        duration_ms: result.duration.as_millis(),
    })
}

/// Ingests one item, cancelling cleanly on Ctrl+C.
async fn ingest(pipeline: &Pipeline, args: &IngestArgs) -> anyhow::Result<IngestOutcome> {
    let image_embedding = match (&args.source.embedding, &args.source.image) {
        (Some(path), _) => read_embedding(path).await?,
        (None, Some(path)) => embed_image(pipeline, path).await?,
        (None, None) => bail!("either --embedding or --image is required"),
    };

    let mut request = IngestRequest::new(args.id, image_embedding);
    if let Some(path) = &args.text_embedding {
        request = request.with_text_embedding(read_embedding(path).await?);
    } else if let Some(caption) = &args.caption {
        let embedding = pipeline
            .embedder()?
            .embed_text(caption)
            .await
            .context("failed to embed caption")?;
        request = request.with_text_embedding(embedding);
    }

    let cancel = CancellationToken::new();
    let signal = signal::cancel_on_signal(cancel.clone());
    let outcome = pipeline.ingest_with_cancellation(request, cancel).await;
    signal.abort();

    outcome.with_context(|| format!("failed to ingest item {}", args.id))
}

async fn search(pipeline: &Pipeline, args: &SearchArgs) -> anyhow::Result<SearchResults> {
    if let Some(text) = &args.source.text {
        return pipeline
            .search_text(text, &args.tags)
            .await
            .context("text search failed");
    }

    let (embedding, modality) = query_embedding(pipeline, &args.source, args.modality).await?;
    let request =
        SearchRequest::new(embedding, modality).with_required_tags(args.tags.iter().cloned());

    pipeline.search(&request).await.context("search failed")
}

async fn similar(pipeline: &Pipeline, args: &SimilarArgs) -> anyhow::Result<SearchResults> {
    let (embedding, modality) = query_embedding(pipeline, &args.source, args.modality).await?;

    pipeline
        .similar(&embedding, modality)
        .await
        .context("similar lookup failed")
}

/// Resolves a query source to an embedding and the column it is compared against.
///
/// Image and text queries both compare against image embeddings.
async fn query_embedding(
    pipeline: &Pipeline,
    source: &QuerySource,
    modality: Option<Modality>,
) -> anyhow::Result<(EmbeddingVector, Modality)> {
    if let Some(path) = &source.embedding {
        let embedding = read_embedding(path).await?;
        return Ok((embedding, modality.unwrap_or(Modality::Image)));
    }

    if let Some(path) = &source.image {
        return Ok((embed_image(pipeline, path).await?, Modality::Image));
    }

    if let Some(text) = &source.text {
        let embedding = pipeline
            .embedder()?
            .embed_text(text)
            .await
            .context("failed to embed text query")?;
        return Ok((embedding, Modality::Image));
    }

    bail!("one of --embedding, --image or --text is required")
}

/// Reads an embedding stored as a JSON array of numbers.
async fn read_embedding(path: &Path) -> anyhow::Result<EmbeddingVector> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read embedding file {}", path.display()))?;

    serde_json::from_slice(&bytes)
        .with_context(|| format!("{} is not a JSON array of numbers", path.display()))
}

async fn embed_image(pipeline: &Pipeline, path: &Path) -> anyhow::Result<EmbeddingVector> {
    let image = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read image {}", path.display()))?;

    pipeline
        .embedder()?
        .embed_image(image)
        .await
        .with_context(|| format!("failed to embed image {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}
