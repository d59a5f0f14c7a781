//! Resolvers that read from the parent document without touching the store.

use async_graphql::dynamic::{FieldFuture, FieldValue, ResolverContext};
use docgraph_core::{Document, Getter};
use serde_json::Value;
use tracing::trace;

use super::{field_error, json_to_graphql_value, parent_document};

/// Reads a stored scalar (or list of scalars) from the parent document.
pub(crate) struct StoredResolver;

impl StoredResolver {
    pub(crate) fn resolve(
        field_name: String,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let field_name = field_name.clone();
            FieldFuture::new(async move {
                let parent = match parent_document(&ctx) {
                    Ok(parent) => parent,
                    Err(e) => return Ok(field_error(&ctx, e)),
                };
                Ok(scalar_value(parent.get(&field_name)))
            })
        }
    }
}

/// Calls a getter with the whole parent document.
pub(crate) struct ComputedResolver;

impl ComputedResolver {
    pub(crate) fn resolve(
        field_name: String,
        getter: Getter,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let field_name = field_name.clone();
            let getter = getter.clone();
            FieldFuture::new(async move {
                let parent = match parent_document(&ctx) {
                    Ok(parent) => parent,
                    Err(e) => return Ok(field_error(&ctx, e)),
                };
                trace!(field = %field_name, "Computing field from parent document");
                let value = getter.call(parent);
                Ok(scalar_value(Some(&value)))
            })
        }
    }
}

/// Exposes a nested object (or list of them) of the parent document as
/// child documents.
pub(crate) struct EmbeddedResolver;

impl EmbeddedResolver {
    pub(crate) fn resolve(
        field_name: String,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let field_name = field_name.clone();
            FieldFuture::new(async move {
                let parent = match parent_document(&ctx) {
                    Ok(parent) => parent,
                    Err(e) => return Ok(field_error(&ctx, e)),
                };
                Ok(parent.get(&field_name).and_then(embedded_value))
            })
        }
    }
}

fn scalar_value<'a>(value: Option<&Value>) -> Option<FieldValue<'a>> {
    match value {
        None | Some(Value::Null) => None,
        Some(value) => Some(FieldValue::value(json_to_graphql_value(value.clone()))),
    }
}

fn embedded_value<'a>(value: &Document) -> Option<FieldValue<'a>> {
    match value {
        Value::Null => None,
        Value::Array(items) => Some(FieldValue::list(
            items
                .iter()
                .map(|item| embedded_value(item).unwrap_or(FieldValue::NULL)),
        )),
        other => Some(FieldValue::owned_any(other.clone())),
    }
}
