//! In-memory document store backend for docgraph.
//!
//! Documents are kept per collection in insertion order, so `find_all`
//! returns them in the order they were seeded.
//!
//! # Example
//!
//! ```ignore
//! use docgraph_db_memory::InMemoryStore;
//! use docgraph_storage::DocumentStore;
//!
//! let store = InMemoryStore::new();
//! let user = store.insert("user", serde_json::json!({"name": "ben"})).await?;
//! ```

mod store_impl;
pub mod storage;

pub use docgraph_storage::{DocumentStore, StoreError};
pub use storage::InMemoryStore;

/// Creates a new shareable in-memory store.
pub fn create_store() -> docgraph_storage::DynStore {
    std::sync::Arc::new(InMemoryStore::new())
}
