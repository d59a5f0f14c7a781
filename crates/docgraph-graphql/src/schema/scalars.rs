//! Field kind to GraphQL scalar mapping and name validation.

use async_graphql::dynamic::TypeRef;
use docgraph_core::FieldKind;

/// Maps a field kind to its built-in GraphQL scalar.
#[must_use]
pub fn scalar_type_name(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::String
        | FieldKind::Url
        | FieldKind::Email
        | FieldKind::Image
        | FieldKind::Password
        | FieldKind::Date
        | FieldKind::Uid => TypeRef::STRING,
        FieldKind::Boolean => TypeRef::BOOLEAN,
        FieldKind::Double => TypeRef::FLOAT,
        FieldKind::Integer => TypeRef::INT,
        FieldKind::Id => TypeRef::ID,
    }
}

/// Checks if a name is valid for GraphQL.
///
/// GraphQL names must match: /[_A-Za-z][_0-9A-Za-z]*/
/// Names starting with `__` are reserved for introspection.
#[must_use]
pub fn is_valid_graphql_name(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }

    if name.starts_with("__") {
        return false;
    }

    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
