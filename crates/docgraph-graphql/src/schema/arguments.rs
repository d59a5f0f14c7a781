//! Filter argument synthesis and argument-to-filter conversion.
//!
//! Every stored scalar field becomes a list argument of the same scalar type.
//! Link and array-of-link fields become `[ID]` arguments. Values are always
//! membership sets: a single value is treated as a one-element list.

use std::sync::Arc;

use async_graphql::dynamic::{InputValue, ResolverContext, TypeRef};
use docgraph_core::{CollectionDef, CollectionRegistry, DocumentId, FieldDef, FieldKind, ID_FIELD};
use docgraph_storage::{Filter, FilterValue};
use indexmap::IndexMap;
use serde_json::Value;

use super::scalars::scalar_type_name;
use crate::error::GraphQLError;

/// Normalized argument values: field name to accepted values.
pub type ArgValues = IndexMap<String, Vec<Value>>;

/// How an argument's values become filter values.
#[derive(Debug, Clone)]
pub enum ArgKind {
    /// Compared as plain JSON values.
    Value,
    /// Parsed into native document identifiers.
    DocumentId,
    /// Mapped onto the `_id` of the matching enumerated value.
    EnumLink(Arc<CollectionDef>),
}

/// One synthesized filter argument.
#[derive(Debug, Clone)]
pub struct ArgumentSpec {
    pub name: String,
    pub type_ref: TypeRef,
    pub kind: ArgKind,
}

impl ArgumentSpec {
    pub(crate) fn input_value(&self) -> InputValue {
        InputValue::new(&self.name, self.type_ref.clone())
    }
}

/// Builds the filter arguments a collection's fields offer.
///
/// Computed, object, array-of-object and array-of-scalar fields get none.
pub fn synthesize_arguments(
    collection: &CollectionDef,
    registry: &CollectionRegistry,
) -> Result<Vec<ArgumentSpec>, GraphQLError> {
    let mut args = Vec::new();

    if collection.get_field(ID_FIELD).is_none() {
        args.push(ArgumentSpec {
            name: ID_FIELD.to_string(),
            type_ref: TypeRef::named_list(TypeRef::ID),
            kind: if collection.is_enum() {
                ArgKind::Value
            } else {
                ArgKind::DocumentId
            },
        });
    }

    for (name, def) in &collection.fields {
        match def {
            FieldDef::Scalar { kind, getter: None } => {
                let arg_kind = if *kind == FieldKind::Id {
                    ArgKind::DocumentId
                } else {
                    ArgKind::Value
                };
                args.push(ArgumentSpec {
                    name: name.clone(),
                    type_ref: TypeRef::named_list(scalar_type_name(*kind)),
                    kind: arg_kind,
                });
            }
            _ => {
                let Some(target_name) = def.link_target() else {
                    continue;
                };
                let target = registry.get(target_name).ok_or_else(|| {
                    GraphQLError::UnresolvedLink {
                        path: format!("{}.{}", collection.name, name),
                        target: target_name.to_string(),
                    }
                })?;
                let arg_kind = if target.is_enum() {
                    ArgKind::EnumLink(target.clone())
                } else {
                    ArgKind::DocumentId
                };
                args.push(ArgumentSpec {
                    name: name.clone(),
                    type_ref: TypeRef::named_list(TypeRef::ID),
                    kind: arg_kind,
                });
            }
        }
    }

    Ok(args)
}

/// Normalizes one argument value into a membership set. `null` means absent.
pub(crate) fn normalize_value(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Null => None,
        Value::Array(items) => Some(items.into_iter().filter(|v| !v.is_null()).collect()),
        single => Some(vec![single]),
    }
}

/// Collects the arguments of the current field as membership sets.
pub(crate) fn collect_args(ctx: &ResolverContext<'_>) -> Result<ArgValues, GraphQLError> {
    let mut args = ArgValues::new();
    for (name, value) in ctx.args.iter() {
        let json = value
            .as_value()
            .clone()
            .into_json()
            .map_err(|e| GraphQLError::InvalidArgument(format!("{name}: {e}")))?;
        if let Some(values) = normalize_value(json) {
            args.insert(name.to_string(), values);
        }
    }
    Ok(args)
}

/// Converts argument values into a store filter.
///
/// With `plain` set every value is compared as-is; enumerated collections use
/// this since their values never pass through the store.
pub fn build_filter(
    specs: &[ArgumentSpec],
    args: ArgValues,
    plain: bool,
) -> Result<Filter, GraphQLError> {
    let mut filter = Filter::new();

    for (name, values) in args {
        let kind = match specs.iter().find(|spec| spec.name == name) {
            Some(spec) => spec.kind.clone(),
            None if name == ID_FIELD => ArgKind::DocumentId,
            None => {
                return Err(GraphQLError::InvalidArgument(format!(
                    "unknown argument '{name}'"
                )));
            }
        };

        let converted = if plain {
            values.into_iter().map(FilterValue::Value).collect()
        } else {
            convert_values(&kind, values)?
        };
        filter.insert(name, converted);
    }

    Ok(filter)
}

fn convert_values(kind: &ArgKind, values: Vec<Value>) -> Result<Vec<FilterValue>, GraphQLError> {
    match kind {
        ArgKind::Value => Ok(values.into_iter().map(FilterValue::Value).collect()),
        ArgKind::DocumentId => values
            .iter()
            .map(|v| {
                DocumentId::from_value(v)
                    .map(FilterValue::Id)
                    .map_err(GraphQLError::from)
            })
            .collect(),
        ArgKind::EnumLink(target) => Ok(values
            .iter()
            .filter_map(|v| target.by_id(v))
            .filter_map(|found| found.get(ID_FIELD).cloned())
            .map(FilterValue::Value)
            .collect()),
    }
}
