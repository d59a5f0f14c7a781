//! # docgraph-graphql
//!
//! Derives a GraphQL query schema from a collection registry and resolves
//! queries against a document store.
//!
//! - One object type per collection, plus one per nested object path
//! - Singular and plural root fields per collection with filter arguments
//! - Link traversal across collections with identifier intersection
//! - Store projections compiled from the selection set, fragments included
//!
//! ## Example
//!
//! ```ignore
//! use docgraph_graphql::{DocGraph, GraphQLConfig};
//!
//! let graph = DocGraph::build(registry, store, GraphQLConfig::default())?;
//! let response = graph.query("{ users { name teamIds { name } } }").await;
//! ```
//!
//! ## Configuration
//!
//! ```toml
//! [graphql]
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Configuration options
//! - [`schema`] - Schema derivation
//! - [`resolvers`] - Field resolvers
//! - [`projection`] - Selection set to projection compilation
//! - [`query`] - Query entry point
//! - [`context`] - Per-query execution context
//! - [`handler`] - Axum HTTP handlers
//! - [`error`] - Error types for GraphQL operations

pub mod config;
pub mod context;
pub mod error;
pub mod handler;
pub mod projection;
pub mod query;
pub mod resolvers;
pub mod schema;

// Re-export main types
pub use config::GraphQLConfig;
pub use context::{ExecutionContext, ExecutionContextBuilder};
pub use error::GraphQLError;
pub use handler::{GraphQLState, graphiql_handler, graphql_handler, router};
pub use projection::{SelectionScope, compile_projection};
pub use query::{DocGraph, QueryInput, QueryOptions, QueryState, TemplateQuery};
pub use schema::{DocGraphSchemaBuilder, SchemaBuilderConfig};

/// Result type for GraphQL operations.
pub type Result<T> = std::result::Result<T, GraphQLError>;
