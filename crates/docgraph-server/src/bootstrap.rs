//! Startup wiring: definitions, seed data and the derived graph.

use std::path::Path;
use std::sync::Arc;

use docgraph_core::{CollectionRegistry, CoreError, RawSchema};
use docgraph_db_memory::InMemoryStore;
use docgraph_graphql::{DocGraph, GraphQLError};
use docgraph_storage::{DynStore, StoreError};
use thiserror::Error;

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to load collection definitions from {path}: {source}")]
    Definitions { path: String, source: CoreError },

    #[error("failed to read seed file {path}: {source}")]
    SeedRead {
        path: String,
        source: std::io::Error,
    },

    #[error("seed file {path} is not valid JSON: {source}")]
    SeedParse {
        path: String,
        source: serde_json::Error,
    },

    #[error("failed to seed store: {0}")]
    Seed(#[from] StoreError),

    #[error("failed to build GraphQL schema: {0}")]
    Schema(#[from] GraphQLError),
}

/// Reads collection definitions from a JSON or TOML file.
pub fn load_registry(path: &str) -> Result<CollectionRegistry, BootstrapError> {
    RawSchema::from_path(path)
        .and_then(RawSchema::into_registry)
        .map_err(|source| BootstrapError::Definitions {
            path: path.to_string(),
            source,
        })
}

/// Loads the seed file into the store. Returns the number of documents.
pub async fn seed_store(store: &InMemoryStore, path: &Path) -> Result<usize, BootstrapError> {
    let display = path.display().to_string();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| BootstrapError::SeedRead {
            path: display.clone(),
            source,
        })?;
    let seed = serde_json::from_str(&text).map_err(|source| BootstrapError::SeedParse {
        path: display,
        source,
    })?;
    Ok(store.seed(seed).await?)
}

/// Builds the in-memory store and the graph described by `cfg`.
pub async fn build_graph(cfg: &AppConfig) -> Result<Arc<DocGraph>, BootstrapError> {
    let registry = load_registry(&cfg.schema.collections)?;
    tracing::info!(
        path = %cfg.schema.collections,
        collections = registry.len(),
        "Collection definitions loaded"
    );

    let store = Arc::new(InMemoryStore::new());
    if let Some(path) = &cfg.seed.path {
        let documents = seed_store(&store, Path::new(path)).await?;
        tracing::info!(path = %path, documents, "Seed data loaded");
    }

    let store: DynStore = store;
    let graph = DocGraph::build(registry, store, cfg.graphql.clone())?;
    Ok(Arc::new(graph))
}
