//! Collaborator wiring.

use anyhow::Context;
use lookalike_core::{MetadataStore, VectorStore};
use lookalike_engine::{Embedder, MemoryMetadataStore, MemoryVectorStore, Pipeline};
use lookalike_postgres::{PgClient, PgMetadataStore, PgVectorStore};
use lookalike_reqwest::ReqwestClient;

use super::{Cli, StoreKind};

/// Creates the PostgreSQL connection pool.
///
/// # Errors
///
/// Returns an error if the pool configuration is invalid. No connection is
/// opened until first use.
pub fn create_postgres_client(cli: &Cli) -> anyhow::Result<PgClient> {
    PgClient::new(cli.postgres.clone()).context("failed to create postgres client")
}

/// Creates the embedder backed by the HTTP inference service.
pub fn create_embedder(cli: &Cli) -> anyhow::Result<Embedder> {
    let client =
        ReqwestClient::new(cli.inference.clone()).context("failed to create inference client")?;
    Ok(Embedder::new(client.into_service(), cli.pipeline.dimensions))
}

/// Creates the pipeline over the selected store.
pub fn create_pipeline(cli: &Cli) -> anyhow::Result<Pipeline> {
    let dimensions = cli.pipeline.dimensions;

    let (store, metadata) = match cli.store {
        StoreKind::Postgres => {
            let client = create_postgres_client(cli)?;
            (
                VectorStore::new(PgVectorStore::new(client.clone(), dimensions)),
                MetadataStore::new(PgMetadataStore::new(client)),
            )
        }
        StoreKind::Memory => (
            VectorStore::new(MemoryVectorStore::new(dimensions)),
            MetadataStore::new(MemoryMetadataStore::new()),
        ),
    };

    let embedder = create_embedder(cli)?;
    let pipeline = Pipeline::new(store, metadata, cli.pipeline.clone())
        .context("failed to create pipeline")?;

    Ok(pipeline.with_embedder(embedder))
}
