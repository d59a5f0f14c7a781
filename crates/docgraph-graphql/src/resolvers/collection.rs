//! Collection resolvers backing root fields and link targets.

use std::sync::Arc;

use async_graphql::dynamic::{Field, FieldFuture, FieldValue, ResolverContext, TypeRef};
use docgraph_core::{CollectionDef, ID_FIELD};
use docgraph_storage::{DynStore, FindOptions};
use tracing::{debug, warn};

use super::{Resolved, field_error};
use crate::context::ExecutionContext;
use crate::error::GraphQLError;
use crate::projection::{SelectionScope, compile_projection};
use crate::schema::arguments::{
    ArgValues, ArgumentSpec, build_filter, collect_args, synthesize_arguments,
};
use crate::schema::type_cache::DeriveContext;

/// Resolves a collection in singular (`user`) or plural (`users`) mode.
///
/// Enumerated collections answer from their static values. Everything else
/// is read from the store with the filter built from the arguments and the
/// projection compiled from the selection.
pub struct CollectionResolver {
    collection: Arc<CollectionDef>,
    type_name: String,
    single: bool,
    args: Vec<ArgumentSpec>,
    store: DynStore,
}

impl CollectionResolver {
    /// Returns the memoized resolver for a collection and mode, creating it
    /// on first use.
    ///
    /// # Errors
    ///
    /// Fails when the collection has no type in the cache yet, or when one of
    /// its links points to an unknown collection.
    pub fn build(
        collection: &Arc<CollectionDef>,
        ctx: &mut DeriveContext,
        single: bool,
    ) -> Result<Arc<Self>, GraphQLError> {
        if let Some(existing) = ctx.cache.resolver(&collection.name, single) {
            return Ok(existing);
        }

        let type_name = ctx
            .cache
            .type_name(&collection.name)
            .ok_or_else(|| GraphQLError::UnregisteredType(collection.name.clone()))?
            .to_string();
        let args = synthesize_arguments(collection, &ctx.registry)?;

        let resolver = Arc::new(Self {
            collection: collection.clone(),
            type_name,
            single,
            args,
            store: ctx.store.clone(),
        });
        ctx.cache
            .memoize_resolver(&collection.name, single, resolver.clone());
        Ok(resolver)
    }

    pub fn collection(&self) -> &CollectionDef {
        &self.collection
    }

    pub fn is_single(&self) -> bool {
        self.single
    }

    pub fn type_ref(&self) -> TypeRef {
        if self.single {
            TypeRef::named(&self.type_name)
        } else {
            TypeRef::named_list(&self.type_name)
        }
    }

    pub fn args(&self) -> &[ArgumentSpec] {
        &self.args
    }

    /// Builds a root query field backed by this resolver.
    pub fn root_field(self: &Arc<Self>, name: &str) -> Field {
        let field = Field::new(name, self.type_ref(), Self::resolve(self.clone()));
        self.args
            .iter()
            .fold(field, |field, arg| field.argument(arg.input_value()))
    }

    /// Creates the resolver function for a root field.
    pub fn resolve(
        resolver: Arc<Self>,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let resolver = resolver.clone();
            FieldFuture::new(async move { resolver.resolve_field(&ctx).await })
        }
    }

    async fn resolve_field<'a>(
        &self,
        ctx: &ResolverContext<'a>,
    ) -> async_graphql::Result<Option<FieldValue<'a>>> {
        let exec = ExecutionContext::from_resolver(ctx);
        let resolved = match collect_args(ctx) {
            Ok(args) => {
                self.lookup(args, Some(SelectionScope::from_resolver(ctx)), exec)
                    .await
            }
            Err(e) => Err(e),
        };

        Ok(match resolved {
            Ok(resolved) => resolved.into_field_value(),
            Err(e) => field_error(ctx, e),
        })
    }

    /// Looks up documents matching `args`.
    pub async fn lookup(
        &self,
        args: ArgValues,
        scope: Option<SelectionScope<'_>>,
        exec: &ExecutionContext,
    ) -> Result<Resolved, GraphQLError> {
        if self.collection.is_enum() {
            return self.lookup_enum(args);
        }

        let filter = build_filter(&self.args, args, false)?;
        let projection = scope.and_then(|scope| compile_projection(&self.collection, scope));

        debug!(
            collection = %self.collection.name,
            single = self.single,
            filter = %filter.to_json(),
            projection = ?projection.as_ref().map(|p| p.to_json()),
            perm = %exec.perm,
            authenticated = exec.is_authenticated(),
            request_id = exec.request_id.as_deref().unwrap_or("-"),
            "Resolving collection"
        );

        let options = FindOptions::new(filter)
            .with_projection(projection)
            .with_auth(exec.auth.clone(), exec.perm.clone());
        let name = &self.collection.name;

        let resolved = if self.single {
            Resolved::One(self.store.find_one(name, &options).await.map_err(|e| {
                warn!(error = %e, collection = %name, "Store error in find_one");
                GraphQLError::from(e)
            })?)
        } else {
            Resolved::Many(self.store.find_all(name, &options).await.map_err(|e| {
                warn!(error = %e, collection = %name, "Store error in find_all");
                GraphQLError::from(e)
            })?)
        };
        Ok(resolved)
    }

    /// Answers from the enumerated values. A missing `_id` argument selects
    /// every value in declared order; other arguments filter the values.
    fn lookup_enum(&self, mut args: ArgValues) -> Result<Resolved, GraphQLError> {
        let ids = args
            .shift_remove(ID_FIELD)
            .unwrap_or_else(|| self.collection.enum_ids());
        let filter = build_filter(&self.args, args, true)?;

        let mut values = self
            .collection
            .by_ids(&ids)
            .into_iter()
            .filter(|value| filter.matches(value));

        debug!(
            collection = %self.collection.name,
            ids = ids.len(),
            "Resolving enumerated collection"
        );

        Ok(if self.single {
            Resolved::One(values.next())
        } else {
            Resolved::Many(values.collect())
        })
    }
}
