//! Derived type bookkeeping shared by one schema build.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_graphql::dynamic::Object;
use docgraph_core::CollectionRegistry;
use docgraph_storage::DynStore;
use indexmap::IndexMap;

use crate::error::GraphQLError;
use crate::resolvers::CollectionResolver;

/// Maps collection names to their output type and keeps every object type
/// waiting to be registered with the engine.
///
/// A collection's entry is a placeholder name inserted before its fields are
/// derived, so links between collections resolve in any order.
#[derive(Default)]
pub struct TypeCache {
    collection_types: IndexMap<String, String>,
    type_names: HashSet<String>,
    objects: Vec<Object>,
    resolvers: HashMap<(String, bool), Arc<CollectionResolver>>,
}

impl TypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a type name. Names are never shared between two types.
    pub fn reserve_type_name(&mut self, name: &str) -> Result<(), GraphQLError> {
        if !self.type_names.insert(name.to_string()) {
            return Err(GraphQLError::DuplicateType(name.to_string()));
        }
        Ok(())
    }

    /// Registers the placeholder type for a collection.
    pub fn insert_placeholder(&mut self, collection: &str) -> Result<(), GraphQLError> {
        self.reserve_type_name(collection)?;
        self.collection_types
            .insert(collection.to_string(), collection.to_string());
        Ok(())
    }

    /// Output type name of a collection, if it was registered.
    pub fn type_name(&self, collection: &str) -> Option<&str> {
        self.collection_types.get(collection).map(String::as_str)
    }

    pub fn push_object(&mut self, object: Object) {
        self.objects.push(object);
    }

    pub fn take_objects(&mut self) -> Vec<Object> {
        std::mem::take(&mut self.objects)
    }

    pub fn resolver(&self, collection: &str, single: bool) -> Option<Arc<CollectionResolver>> {
        self.resolvers
            .get(&(collection.to_string(), single))
            .cloned()
    }

    pub fn memoize_resolver(&mut self, collection: &str, single: bool, resolver: Arc<CollectionResolver>) {
        self.resolvers
            .insert((collection.to_string(), single), resolver);
    }

    pub fn len(&self) -> usize {
        self.collection_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection_types.is_empty()
    }
}

/// State threaded through field derivation.
pub struct DeriveContext {
    pub registry: Arc<CollectionRegistry>,
    pub store: DynStore,
    pub cache: TypeCache,
}

impl DeriveContext {
    pub fn new(registry: Arc<CollectionRegistry>, store: DynStore) -> Self {
        Self {
            registry,
            store,
            cache: TypeCache::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_lookup() {
        let mut cache = TypeCache::new();
        cache.insert_placeholder("user").unwrap();
        assert_eq!(cache.type_name("user"), Some("user"));
        assert_eq!(cache.type_name("team"), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_duplicate_type_name() {
        let mut cache = TypeCache::new();
        cache.insert_placeholder("user_profile").unwrap();
        let err = cache.reserve_type_name("user_profile").unwrap_err();
        assert!(matches!(err, GraphQLError::DuplicateType(ref n) if n == "user_profile"));
    }

    #[test]
    fn test_objects_taken_once() {
        let mut cache = TypeCache::new();
        cache.push_object(Object::new("user_profile"));
        assert_eq!(cache.take_objects().len(), 1);
        assert!(cache.take_objects().is_empty());
    }
}
