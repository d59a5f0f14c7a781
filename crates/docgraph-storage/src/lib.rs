//! # docgraph-storage
//!
//! Document store abstraction for docgraph.
//!
//! The GraphQL layer never talks to a database directly. Every read goes
//! through [`DocumentStore`], carrying a [`Filter`], an optional
//! [`Projection`] and the caller's authorization context.
//!
//! ## Example
//!
//! ```ignore
//! use docgraph_storage::{DocumentStore, FindOptions, Filter, FilterValue};
//!
//! async fn users_named(store: &dyn DocumentStore, name: &str) -> StoreResult<Vec<Document>> {
//!     let filter = Filter::new().with_field("name", vec![FilterValue::from(name)]);
//!     store.find_all("user", &FindOptions::new(filter)).await
//! }
//! ```

mod error;
mod traits;
mod types;

pub use error::{ErrorCategory, StoreError};
pub use traits::DocumentStore;
pub use types::{Filter, FilterValue, FindOptions, Projection, DEFAULT_PERMISSION};

pub use docgraph_core::Document;

/// Type alias for a store result.
pub type StoreResult<T> = Result<T, StoreError>;

/// Type alias for a shared store trait object.
pub type DynStore = std::sync::Arc<dyn DocumentStore>;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        Document, DocumentStore, DynStore, Filter, FilterValue, FindOptions, Projection,
        StoreError, StoreResult,
    };
}
