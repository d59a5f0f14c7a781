//! Implementation of the DocumentStore trait for InMemoryStore.

use async_trait::async_trait;

use docgraph_core::Document;
use docgraph_storage::{DocumentStore, FindOptions, StoreError};

use crate::storage::InMemoryStore;

fn project(document: &Document, options: &FindOptions) -> Document {
    match &options.projection {
        Some(projection) => projection.apply(document),
        None => document.clone(),
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn find_one(
        &self,
        collection: &str,
        options: &FindOptions,
    ) -> Result<Option<Document>, StoreError> {
        let guard = self.collections.read().await;
        let found = guard
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| options.filter.matches(doc)))
            .map(|doc| project(doc, options));

        tracing::trace!(
            collection,
            filter = %options.filter.to_json(),
            found = found.is_some(),
            "find_one"
        );
        Ok(found)
    }

    async fn find_all(
        &self,
        collection: &str,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let guard = self.collections.read().await;
        let found: Vec<Document> = guard
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| options.filter.matches(doc))
                    .map(|doc| project(doc, options))
                    .collect()
            })
            .unwrap_or_default();

        tracing::trace!(
            collection,
            filter = %options.filter.to_json(),
            count = found.len(),
            "find_all"
        );
        Ok(found)
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<Document, StoreError> {
        self.insert_document(collection, document).await
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
