//! Name-keyed set of collection definitions.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::collection::CollectionDef;
use crate::error::{CoreError, Result};

/// Registry of every known collection, in registration order.
#[derive(Debug, Clone, Default)]
pub struct CollectionRegistry {
    collections: IndexMap<String, Arc<CollectionDef>>,
}

impl CollectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from definitions, rejecting duplicate names.
    pub fn from_definitions(defs: impl IntoIterator<Item = CollectionDef>) -> Result<Self> {
        let mut registry = Self::new();
        for def in defs {
            registry.register(def)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, def: CollectionDef) -> Result<()> {
        if self.collections.contains_key(&def.name) {
            return Err(CoreError::duplicate_collection(&def.name));
        }
        tracing::trace!(collection = %def.name, fields = def.fields.len(), "Registered collection");
        self.collections.insert(def.name.clone(), Arc::new(def));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<CollectionDef>> {
        self.collections.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<CollectionDef>> {
        self.collections.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}
