//! Schema builder.

use std::collections::HashSet;
use std::sync::Arc;

use async_graphql::dynamic::{Object, Schema};
use docgraph_core::{CollectionDef, CollectionRegistry, FieldDef, FieldMap, ID_FIELD};
use docgraph_storage::DynStore;
use tracing::debug;

use super::fields::FieldThunk;
use super::scalars::is_valid_graphql_name;
use super::type_cache::DeriveContext;
use crate::error::GraphQLError;
use crate::resolvers::CollectionResolver;

/// Configuration for the schema builder.
#[derive(Debug, Clone)]
pub struct SchemaBuilderConfig {
    /// Maximum query depth allowed.
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    pub max_complexity: usize,

    /// Whether to enable introspection queries.
    pub introspection_enabled: bool,
}

impl Default for SchemaBuilderConfig {
    fn default() -> Self {
        Self {
            max_depth: 15,
            max_complexity: 500,
            introspection_enabled: true,
        }
    }
}

/// Name of the root query type.
pub const QUERY_TYPE: &str = "Query";

/// Plural root field name: `user` → `users`, `status` → `statuses`.
#[must_use]
pub fn plural_name(name: &str) -> String {
    if name.ends_with('s') {
        format!("{name}es")
    } else {
        format!("{name}s")
    }
}

/// Fields exposed on a collection's object type. Every document carries an
/// `_id`, so one is prepended when the definition leaves it out.
fn output_fields(collection: &CollectionDef) -> FieldMap {
    if collection.get_field(ID_FIELD).is_some() {
        return collection.fields.clone();
    }
    std::iter::once((ID_FIELD.to_string(), FieldDef::id()))
        .chain(collection.fields.clone())
        .collect()
}

/// Builds the GraphQL query schema from a collection registry.
///
/// Every collection gets one object type and two root fields: the singular
/// field named after the collection and the plural field.
///
/// # Example
///
/// ```ignore
/// let builder = DocGraphSchemaBuilder::new(registry, store, SchemaBuilderConfig::default());
/// let schema = builder.build()?;
/// ```
pub struct DocGraphSchemaBuilder {
    registry: Arc<CollectionRegistry>,
    store: DynStore,
    config: SchemaBuilderConfig,
}

impl DocGraphSchemaBuilder {
    #[must_use]
    pub fn new(
        registry: Arc<CollectionRegistry>,
        store: DynStore,
        config: SchemaBuilderConfig,
    ) -> Self {
        Self {
            registry,
            store,
            config,
        }
    }

    /// Builds the schema.
    ///
    /// Collections are first registered as placeholders together with their
    /// root fields. Field thunks are forced only afterwards, so links can
    /// point at collections registered later.
    ///
    /// # Errors
    ///
    /// Returns an error for empty collections, broken links, arrays without
    /// an element definition, invalid names, or when the engine rejects the
    /// assembled schema.
    pub fn build(&self) -> Result<Schema, GraphQLError> {
        debug!(collections = self.registry.len(), "Starting GraphQL schema build");

        let mut ctx = DeriveContext::new(self.registry.clone(), self.store.clone());
        ctx.cache.reserve_type_name(QUERY_TYPE)?;

        let mut thunks = Vec::with_capacity(self.registry.len());
        let mut root_fields = Vec::with_capacity(self.registry.len() * 2);
        let mut root_names = HashSet::new();

        for collection in self.registry.iter() {
            let name = &collection.name;
            if !is_valid_graphql_name(name) {
                return Err(GraphQLError::InvalidName(name.clone()));
            }
            if collection.fields.is_empty() {
                return Err(GraphQLError::MissingFields(name.clone()));
            }

            ctx.cache.insert_placeholder(name)?;
            thunks.push(FieldThunk::new(
                name.as_str(),
                output_fields(collection),
                vec![name.clone()],
            ));

            let single = CollectionResolver::build(collection, &mut ctx, true)?;
            let plural = CollectionResolver::build(collection, &mut ctx, false)?;

            for (field_name, resolver) in [(name.clone(), single), (plural_name(name), plural)] {
                if !root_names.insert(field_name.clone()) {
                    return Err(GraphQLError::DuplicateType(format!(
                        "{QUERY_TYPE}.{field_name}"
                    )));
                }
                root_fields.push(resolver.root_field(&field_name));
            }

            debug!(collection = %name, "Registered collection type");
        }

        for thunk in thunks {
            let type_name = thunk.type_name().to_string();
            let object = thunk
                .force(&mut ctx)?
                .ok_or(GraphQLError::MissingFields(type_name))?;
            ctx.cache.push_object(object);
        }

        let query = root_fields
            .into_iter()
            .fold(Object::new(QUERY_TYPE), Object::field);

        let mut schema_builder = Schema::build(QUERY_TYPE, None, None).register(query);
        for object in ctx.cache.take_objects() {
            schema_builder = schema_builder.register(object);
        }

        // Configure limits
        schema_builder = schema_builder
            .limit_depth(self.config.max_depth)
            .limit_complexity(self.config.max_complexity);

        if !self.config.introspection_enabled {
            schema_builder = schema_builder.disable_introspection();
        }

        let schema = schema_builder
            .finish()
            .map_err(|e| GraphQLError::SchemaBuildFailed(e.to_string()))?;

        debug!("GraphQL schema build complete");
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docgraph_core::FieldKind;
    use serde_json::json;

    fn build(defs: Vec<CollectionDef>) -> Result<Schema, GraphQLError> {
        let registry = CollectionRegistry::from_definitions(defs).unwrap();
        DocGraphSchemaBuilder::new(
            Arc::new(registry),
            docgraph_db_memory::create_store(),
            SchemaBuilderConfig::default(),
        )
        .build()
    }

    fn sample() -> Vec<CollectionDef> {
        vec![
            CollectionDef::new("user")
                .field("_id", FieldDef::id())
                .field("name", FieldDef::string())
                .field("organizationId", FieldDef::link("organization"))
                .field("teamIds", FieldDef::array(FieldDef::link("team")))
                .field("status", FieldDef::link("userStatus"))
                .field(
                    "profile",
                    FieldDef::object([("address", FieldDef::object([("city", FieldDef::string())]))]),
                ),
            CollectionDef::new("team")
                .field("_id", FieldDef::id())
                .field("name", FieldDef::string())
                .field("organizationId", FieldDef::link("organization")),
            CollectionDef::new("organization")
                .field("_id", FieldDef::id())
                .field("name", FieldDef::string()),
            CollectionDef::new("userStatus")
                .field("_id", FieldDef::scalar(FieldKind::Integer))
                .field("name", FieldDef::string())
                .with_values(vec![json!({"_id": 1, "name": "Active"})])
                .unwrap(),
        ]
    }

    #[test]
    fn test_plural_name() {
        assert_eq!(plural_name("user"), "users");
        assert_eq!(plural_name("status"), "statuses");
        assert_eq!(plural_name("userStatus"), "userStatuses");
    }

    #[test]
    fn test_root_fields_and_types() {
        let schema = build(sample()).unwrap();
        let sdl = schema.sdl();

        assert!(sdl.contains("type Query"));
        assert!(sdl.contains("user(_id: [ID], name: [String], organizationId: [ID], teamIds: [ID], status: [ID]): user"));
        assert!(sdl.contains("users(_id: [ID], name: [String], organizationId: [ID], teamIds: [ID], status: [ID]): [user]"));
        assert!(sdl.contains("organizations("));
        assert!(sdl.contains("userStatuses(_id: [Int], name: [String]): [userStatus]"));
        assert!(sdl.contains("type user_profile_address"));
        assert!(sdl.contains("profile: user_profile"));
        assert!(sdl.contains("teamIds(_id: [ID], name: [String], organizationId: [ID]): [team]"));
    }

    #[test]
    fn test_forward_reference_resolves() {
        // user links to organization, which is registered after it
        assert!(build(sample()).is_ok());
    }

    #[test]
    fn test_empty_collection_is_fatal() {
        let err = build(vec![CollectionDef::new("empty")]).err().unwrap();
        assert!(matches!(err, GraphQLError::MissingFields(ref n) if n == "empty"));
    }

    #[test]
    fn test_unresolved_link_is_fatal() {
        let err = build(vec![CollectionDef::new("user").field("orgId", FieldDef::link("nowhere"))])
            .err()
            .unwrap();
        assert!(matches!(err, GraphQLError::UnresolvedLink { .. }));
    }

    #[test]
    fn test_array_without_element_is_fatal() {
        let err = build(vec![CollectionDef::new("user")
            .field("_id", FieldDef::id())
            .field("tags", FieldDef::Array { of: None })])
        .err()
        .unwrap();
        assert!(matches!(err, GraphQLError::MissingArrayElement(ref p) if p == "user.tags"));
    }

    #[test]
    fn test_collection_with_only_dropped_fields_keeps_id() {
        let schema = build(vec![
            CollectionDef::new("user").field("meta", FieldDef::Object { fields: None }),
        ])
        .unwrap();
        let sdl = schema.sdl();
        assert!(sdl.contains("type user {\n\t_id: ID\n}"));
        assert!(sdl.contains("users(_id: [ID]): [user]"));
    }

    #[test]
    fn test_id_added_when_definition_omits_it() {
        let schema = build(vec![
            CollectionDef::new("team").field("name", FieldDef::string()),
            CollectionDef::new("user")
                .field("_id", FieldDef::id())
                .field("teamIds", FieldDef::array(FieldDef::link("team"))),
        ])
        .unwrap();
        let sdl = schema.sdl();

        assert!(sdl.contains("team(_id: [ID], name: [String]): team"));
        assert!(sdl.contains("teamIds(_id: [ID], name: [String]): [team]"));
        assert!(sdl.contains("type team {\n\t_id: ID\n\tname: String\n}"));
    }

    #[test]
    fn test_invalid_collection_name() {
        let err = build(vec![CollectionDef::new("user-accounts").field("name", FieldDef::string())])
            .err()
            .unwrap();
        assert!(matches!(err, GraphQLError::InvalidName(_)));
    }

    #[test]
    fn test_root_name_collision() {
        let err = build(vec![
            CollectionDef::new("user").field("name", FieldDef::string()),
            CollectionDef::new("users").field("name", FieldDef::string()),
        ])
        .err()
        .unwrap();
        assert!(matches!(err, GraphQLError::DuplicateType(ref n) if n == "Query.users"));
    }

    #[test]
    fn test_introspection_disabled() {
        let registry = CollectionRegistry::from_definitions(sample()).unwrap();
        let config = SchemaBuilderConfig {
            introspection_enabled: false,
            ..Default::default()
        };
        let schema = DocGraphSchemaBuilder::new(
            Arc::new(registry),
            docgraph_db_memory::create_store(),
            config,
        )
        .build()
        .unwrap();
        let response = tokio_test::block_on(schema.execute("{ __schema { queryType { name } } }"));
        assert!(!response.errors.is_empty());
    }
}
