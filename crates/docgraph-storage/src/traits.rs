//! Store trait implemented by every document backend.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::FindOptions;
use crate::Document;

/// A collection-oriented document store.
///
/// `auth` and `perm` inside [`FindOptions`] are forwarded from the GraphQL
/// request untouched. Backends that enforce access control interpret them;
/// docgraph itself never does. Implementations must be thread-safe.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns the first document matching the filter, or `None`.
    ///
    /// When a projection is given, only the projected top-level fields (and
    /// `_id`) are returned.
    async fn find_one(
        &self,
        collection: &str,
        options: &FindOptions,
    ) -> Result<Option<Document>, StoreError>;

    /// Returns every document matching the filter, in store order.
    async fn find_all(
        &self,
        collection: &str,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError>;

    /// Stores a document, assigning `_id` when it has none.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidDocument` if the document is not a JSON object.
    async fn insert(&self, collection: &str, document: Document) -> Result<Document, StoreError>;

    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;
}
