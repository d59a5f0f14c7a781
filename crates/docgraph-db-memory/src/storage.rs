//! Collection map backing [`InMemoryStore`].

use indexmap::IndexMap;
use serde_json::Value;
use tokio::sync::RwLock;

use docgraph_core::{Document, DocumentId, ID_FIELD};
use docgraph_storage::StoreError;

/// Thread-safe in-memory document store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    pub(crate) collections: RwLock<IndexMap<String, Vec<Document>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }

    /// Inserts every document of a seed value shaped as
    /// `{"collection": [doc, ...], ...}`. Returns the number inserted.
    pub async fn seed(&self, seed: Value) -> Result<usize, StoreError> {
        let Value::Object(collections) = seed else {
            return Err(StoreError::invalid_document(
                "Seed data must be an object keyed by collection name",
            ));
        };

        let mut inserted = 0;
        for (collection, documents) in collections {
            let Value::Array(documents) = documents else {
                return Err(StoreError::invalid_document(format!(
                    "Seed data for '{collection}' must be an array"
                )));
            };
            for document in documents {
                self.insert_document(&collection, document).await?;
                inserted += 1;
            }
        }
        tracing::debug!(documents = inserted, "Seeded in-memory store");
        Ok(inserted)
    }

    pub(crate) async fn insert_document(
        &self,
        collection: &str,
        mut document: Document,
    ) -> Result<Document, StoreError> {
        let Some(object) = document.as_object_mut() else {
            return Err(StoreError::invalid_document(format!(
                "Documents in '{collection}' must be JSON objects"
            )));
        };

        match object.get(ID_FIELD) {
            Some(id) => {
                DocumentId::from_value(id)
                    .map_err(|e| StoreError::invalid_document(e.to_string()))?;
            }
            None => {
                object.insert(ID_FIELD.to_string(), DocumentId::new().to_value());
            }
        }

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(document.clone());
        Ok(document)
    }
}
