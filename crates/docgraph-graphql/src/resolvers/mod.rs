//! Field resolvers.
//!
//! Every object-typed value flowing through the engine is a stored JSON
//! document wrapped with [`FieldValue::owned_any`]. Child resolvers recover
//! it with [`parent_document`].
//!
//! Resolver failures are recorded on the request with the field's path and
//! the field resolves to `null`, so sibling fields still resolve.

mod collection;
mod link;
mod value;

pub use collection::CollectionResolver;
pub use link::LinkResolver;
pub(crate) use value::{ComputedResolver, EmbeddedResolver, StoredResolver};

use async_graphql::dynamic::{FieldValue, ResolverContext};
use async_graphql::{ErrorExtensions, Value};
use docgraph_core::Document;
use tracing::warn;

use crate::error::GraphQLError;

/// Outcome of a collection lookup, before it is handed to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    One(Option<Document>),
    Many(Vec<Document>),
}

impl Resolved {
    /// Empty result for the given mode: `null` or `[]`.
    #[must_use]
    pub fn empty(single: bool) -> Self {
        if single {
            Self::One(None)
        } else {
            Self::Many(Vec::new())
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::One(doc) => usize::from(doc.is_some()),
            Self::Many(docs) => docs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn into_field_value<'a>(self) -> Option<FieldValue<'a>> {
        match self {
            Self::One(doc) => doc.map(|doc| FieldValue::owned_any(doc)),
            Self::Many(docs) => Some(FieldValue::list(
                docs.into_iter().map(|doc| FieldValue::owned_any(doc)),
            )),
        }
    }
}

/// Returns the document the current field belongs to.
pub(crate) fn parent_document<'a>(
    ctx: &'a ResolverContext<'_>,
) -> Result<&'a Document, GraphQLError> {
    ctx.parent_value
        .try_downcast_ref::<Document>()
        .map_err(|_| GraphQLError::Internal("parent value is not a document".into()))
}

/// Records `error` against the current field and resolves the field to `null`.
pub(crate) fn field_error<'a>(
    ctx: &ResolverContext<'_>,
    error: GraphQLError,
) -> Option<FieldValue<'a>> {
    warn!(
        field = %ctx.ctx.item.node.name.node,
        code = error.error_code(),
        error = %error,
        "Field resolution failed"
    );
    let server_error = error.extend().into_server_error(ctx.ctx.item.pos);
    ctx.ctx.add_error(ctx.ctx.set_error_path(server_error));
    None
}

/// Convert a serde_json::Value to async_graphql::Value.
pub(crate) fn json_to_graphql_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else if let Some(f) = n.as_f64() {
                async_graphql::Number::from_f64(f).map_or(Value::Null, Value::Number)
            } else {
                Value::Null
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => {
            Value::List(arr.into_iter().map(json_to_graphql_value).collect())
        }
        serde_json::Value::Object(obj) => Value::Object(
            obj.into_iter()
                .map(|(k, v)| (async_graphql::Name::new(k), json_to_graphql_value(v)))
                .collect(),
        ),
    }
}
