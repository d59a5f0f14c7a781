//! Schema derivation.
//!
//! ## Components
//!
//! - [`TypeCache`] - collection name to output type, plus pending object types
//! - [`scalar_type_name`] - field kind to GraphQL scalar
//! - [`derive_field`] - one field definition to type, arguments and resolver
//! - [`synthesize_arguments`] - filter arguments offered by a collection
//! - [`DocGraphSchemaBuilder`] - assembles the `Query` root and the schema

pub mod arguments;
mod builder;
mod fields;
mod scalars;
pub mod type_cache;

pub use arguments::{ArgKind, ArgValues, ArgumentSpec, build_filter, synthesize_arguments};
pub use builder::{DocGraphSchemaBuilder, QUERY_TYPE, SchemaBuilderConfig, plural_name};
pub use fields::{FieldConfig, FieldResolver, FieldThunk, derive_field};
pub use scalars::{is_valid_graphql_name, scalar_type_name};
pub use type_cache::{DeriveContext, TypeCache};
