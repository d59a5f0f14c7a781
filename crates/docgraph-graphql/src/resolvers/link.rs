//! Link field resolver.
//!
//! A link field stores one identifier (or a list of them) pointing into
//! another collection. Resolution intersects those identifiers with an
//! optional `_id` argument and hands the survivors to the target
//! collection's resolver as its only filter.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_graphql::dynamic::{FieldFuture, FieldValue, ResolverContext};
use docgraph_core::{Document, ID_FIELD, id_key};
use serde_json::Value;
use tracing::trace;

use super::{CollectionResolver, Resolved, field_error, parent_document};
use crate::context::ExecutionContext;
use crate::error::GraphQLError;
use crate::projection::SelectionScope;
use crate::schema::arguments::{ArgValues, normalize_value};

/// Resolver for a link (or array-of-link) field.
pub struct LinkResolver {
    field_name: String,
    single: bool,
    target: Arc<CollectionResolver>,
}

impl LinkResolver {
    pub fn new(field_name: impl Into<String>, single: bool, target: Arc<CollectionResolver>) -> Self {
        Self {
            field_name: field_name.into(),
            single,
            target,
        }
    }

    pub fn target(&self) -> &CollectionResolver {
        &self.target
    }

    /// Creates the resolver function for a link field.
    pub fn resolve(
        link: Arc<Self>,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let link = link.clone();
            FieldFuture::new(async move { link.resolve_field(&ctx).await })
        }
    }

    async fn resolve_field<'a>(
        &self,
        ctx: &ResolverContext<'a>,
    ) -> async_graphql::Result<Option<FieldValue<'a>>> {
        Ok(match self.lookup_linked(ctx).await {
            Ok(resolved) => resolved.into_field_value(),
            Err(e) => field_error(ctx, e),
        })
    }

    async fn lookup_linked(&self, ctx: &ResolverContext<'_>) -> Result<Resolved, GraphQLError> {
        let parent = parent_document(ctx)?;

        let requested = match ctx.args.get(ID_FIELD) {
            Some(value) => {
                let json = value
                    .as_value()
                    .clone()
                    .into_json()
                    .map_err(|e| GraphQLError::InvalidArgument(format!("{ID_FIELD}: {e}")))?;
                normalize_value(json)
            }
            None => None,
        };

        let Some(ids) = self.linked_ids(parent.get(&self.field_name), requested.as_deref()) else {
            trace!(field = %self.field_name, "Link has no identifiers, skipping store");
            return Ok(Resolved::empty(self.single));
        };

        let mut args = ArgValues::new();
        args.insert(ID_FIELD.to_string(), ids.clone());

        let exec = ExecutionContext::from_resolver(ctx);
        let resolved = self
            .target
            .lookup(args, Some(SelectionScope::from_resolver(ctx)), exec)
            .await?;

        Ok(match resolved {
            Resolved::Many(documents) => Resolved::Many(order_by_ids(documents, &ids)),
            one => one,
        })
    }

    /// Identifiers to look up, or `None` when nothing can match.
    ///
    /// When `requested` is given only identifiers present in both lists
    /// survive, in the parent's order. Identifiers compare by string form.
    pub fn linked_ids(&self, linked: Option<&Value>, requested: Option<&[Value]>) -> Option<Vec<Value>> {
        let ids: Vec<Value> = match linked {
            None | Some(Value::Null) => return None,
            Some(Value::Array(items)) => items.iter().filter(|v| !v.is_null()).cloned().collect(),
            Some(single) => vec![single.clone()],
        };

        let ids = match requested {
            Some(requested) => {
                let wanted: HashSet<String> = requested.iter().map(id_key).collect();
                ids.into_iter()
                    .filter(|id| wanted.contains(&id_key(id)))
                    .collect()
            }
            None => ids,
        };

        if ids.is_empty() { None } else { Some(ids) }
    }
}

/// Sorts fetched documents into the order their ids appear in `ids`.
/// Documents without a listed id go last.
pub(crate) fn order_by_ids(mut documents: Vec<Document>, ids: &[Value]) -> Vec<Document> {
    let positions: HashMap<String, usize> = ids
        .iter()
        .enumerate()
        .map(|(position, id)| (id_key(id), position))
        .collect();

    documents.sort_by_key(|document| {
        document
            .get(ID_FIELD)
            .and_then(|id| positions.get(&id_key(id)).copied())
            .unwrap_or(usize::MAX)
    });
    documents
}
