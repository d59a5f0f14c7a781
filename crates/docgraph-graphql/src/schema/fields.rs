//! Field type derivation.
//!
//! [`derive_field`] turns one field definition into the GraphQL type,
//! arguments and resolver of the corresponding output field. Nested objects
//! are derived through a [`FieldThunk`] and get their own object type named
//! after the full field path.

use std::sync::Arc;

use async_graphql::dynamic::{Field, Object, TypeRef};
use docgraph_core::{FieldDef, FieldMap, Getter};
use tracing::{trace, warn};

use super::arguments::ArgumentSpec;
use super::scalars::{is_valid_graphql_name, scalar_type_name};
use super::type_cache::DeriveContext;
use crate::error::GraphQLError;
use crate::resolvers::{
    CollectionResolver, ComputedResolver, EmbeddedResolver, LinkResolver, StoredResolver,
};

/// How a derived field produces its value.
#[derive(Clone)]
pub enum FieldResolver {
    /// Value stored on the parent document.
    Stored,
    /// Value computed from the parent document.
    Computed(Getter),
    /// Nested object(s) stored on the parent document.
    Embedded,
    /// Linked document(s) in another collection.
    Link(Arc<LinkResolver>),
}

/// Everything needed to attach one field to an object type.
#[derive(Clone)]
pub struct FieldConfig {
    pub type_ref: TypeRef,
    pub args: Vec<ArgumentSpec>,
    pub resolver: FieldResolver,
}

impl FieldConfig {
    fn value(type_ref: TypeRef, resolver: FieldResolver) -> Self {
        Self {
            type_ref,
            args: Vec::new(),
            resolver,
        }
    }

    pub fn into_field(self, name: &str) -> Field {
        let field = match self.resolver {
            FieldResolver::Stored => {
                Field::new(name, self.type_ref, StoredResolver::resolve(name.to_string()))
            }
            FieldResolver::Computed(getter) => Field::new(
                name,
                self.type_ref,
                ComputedResolver::resolve(name.to_string(), getter),
            ),
            FieldResolver::Embedded => {
                Field::new(name, self.type_ref, EmbeddedResolver::resolve(name.to_string()))
            }
            FieldResolver::Link(link) => Field::new(name, self.type_ref, LinkResolver::resolve(link)),
        };

        self.args
            .iter()
            .fold(field, |field, arg| field.argument(arg.input_value()))
    }
}

/// Deferred derivation of an object's fields.
///
/// Forcing consumes the thunk, so every set of fields is derived once.
pub struct FieldThunk {
    type_name: String,
    fields: FieldMap,
    path: Vec<String>,
}

impl FieldThunk {
    pub fn new(type_name: impl Into<String>, fields: FieldMap, path: Vec<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields,
            path,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Derives every field into an object type. Returns `None` when every
    /// field was dropped.
    pub fn force(self, ctx: &mut DeriveContext) -> Result<Option<Object>, GraphQLError> {
        let mut object = Object::new(&self.type_name);
        let mut derived = 0usize;

        for (name, def) in &self.fields {
            let mut path = self.path.clone();
            path.push(name.clone());

            if !is_valid_graphql_name(name) {
                return Err(GraphQLError::InvalidName(path.join(".")));
            }

            if let Some(config) = derive_field(def, ctx, name, &path, true)? {
                object = object.field(config.into_field(name));
                derived += 1;
            }
        }

        if derived == 0 {
            warn!(type_name = %self.type_name, "Every field was dropped, omitting type");
            return Ok(None);
        }

        trace!(type_name = %self.type_name, fields = derived, "Derived object type");
        Ok(Some(object))
    }
}

fn wrap(type_name: &str, single: bool) -> TypeRef {
    if single {
        TypeRef::named(type_name)
    } else {
        TypeRef::named_list(type_name)
    }
}

/// Derives the output field for one definition.
///
/// `single` is false when the definition is the element of an array, in
/// which case the derived type is a list. Returns `Ok(None)` for fields that
/// are dropped with a warning.
pub fn derive_field(
    def: &FieldDef,
    ctx: &mut DeriveContext,
    field_name: &str,
    path: &[String],
    single: bool,
) -> Result<Option<FieldConfig>, GraphQLError> {
    match def {
        FieldDef::Scalar { kind, getter } => {
            let type_ref = wrap(scalar_type_name(*kind), single);
            let resolver = match getter {
                Some(getter) => FieldResolver::Computed(getter.clone()),
                None => FieldResolver::Stored,
            };
            Ok(Some(FieldConfig::value(type_ref, resolver)))
        }

        FieldDef::Link { collection } => {
            let target = ctx.registry.get(collection).cloned().ok_or_else(|| {
                GraphQLError::UnresolvedLink {
                    path: path.join("."),
                    target: collection.clone(),
                }
            })?;
            let target_resolver = CollectionResolver::build(&target, ctx, single)?;

            Ok(Some(FieldConfig {
                type_ref: target_resolver.type_ref(),
                args: target_resolver.args().to_vec(),
                resolver: FieldResolver::Link(Arc::new(LinkResolver::new(
                    field_name,
                    single,
                    target_resolver,
                ))),
            }))
        }

        FieldDef::Array { of } => {
            let element = of
                .as_deref()
                .ok_or_else(|| GraphQLError::MissingArrayElement(path.join(".")))?;

            let Some(config) = derive_field(element, ctx, field_name, path, false)? else {
                warn!(path = %path.join("."), "Array element could not be derived, dropping field");
                return Ok(None);
            };

            if !matches!(element, FieldDef::Array { .. }) {
                return Ok(Some(config));
            }

            match config.resolver {
                FieldResolver::Stored | FieldResolver::Computed(_) | FieldResolver::Embedded => {
                    Ok(Some(FieldConfig {
                        type_ref: TypeRef::List(Box::new(config.type_ref)),
                        ..config
                    }))
                }
                FieldResolver::Link(_) => {
                    warn!(path = %path.join("."), "Links inside nested arrays are not supported, dropping field");
                    Ok(None)
                }
            }
        }

        FieldDef::Object { fields } => {
            let Some(fields) = fields.as_ref().filter(|fields| !fields.is_empty()) else {
                warn!(path = %path.join("."), "Object field has no nested fields, dropping field");
                return Ok(None);
            };

            let type_name = path.join("_");
            ctx.cache.reserve_type_name(&type_name)?;

            let thunk = FieldThunk::new(&type_name, fields.clone(), path.to_vec());
            let Some(object) = thunk.force(ctx)? else {
                warn!(path = %path.join("."), "Nested object has no derivable fields, dropping field");
                return Ok(None);
            };
            ctx.cache.push_object(object);

            Ok(Some(FieldConfig::value(
                wrap(&type_name, single),
                FieldResolver::Embedded,
            )))
        }
    }
}
