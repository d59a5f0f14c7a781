//! Error types for GraphQL operations.
//!
//! Build errors are fatal and surface from [`crate::DocGraph::build`].
//! Query errors are converted into per-field GraphQL errors carrying a
//! `code` extension.

use std::fmt;

use async_graphql::ErrorExtensions;

/// Errors that can occur while deriving the schema or resolving a query.
#[derive(Debug)]
pub enum GraphQLError {
    /// A collection (or nested object) has no fields to derive.
    MissingFields(String),

    /// A link field names a collection that is not registered.
    UnresolvedLink {
        /// Dotted path of the link field.
        path: String,
        /// Collection the link points to.
        target: String,
    },

    /// An array field declares no element definition.
    MissingArrayElement(String),

    /// A collection type was requested before it was placed in the type cache.
    UnregisteredType(String),

    /// A collection or field name is not a valid GraphQL name.
    InvalidName(String),

    /// Two derived types share one name.
    DuplicateType(String),

    /// The engine rejected the assembled schema.
    SchemaBuildFailed(String),

    /// Invalid configuration.
    Config(String),

    /// An identifier argument could not be parsed.
    InvalidId(String),

    /// An argument value has an unusable shape.
    InvalidArgument(String),

    /// Store error.
    Storage(String),

    /// Internal error.
    Internal(String),
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFields(name) => {
                write!(f, "Type '{name}' has no fields to derive")
            }
            Self::UnresolvedLink { path, target } => {
                write!(f, "Field {path} links to unknown collection '{target}'")
            }
            Self::MissingArrayElement(path) => {
                write!(f, "Array field {path} has no element definition")
            }
            Self::UnregisteredType(name) => {
                write!(f, "No type registered for collection '{name}'")
            }
            Self::InvalidName(name) => {
                write!(f, "'{name}' is not a valid GraphQL name")
            }
            Self::DuplicateType(name) => {
                write!(f, "Type '{name}' is derived more than once")
            }
            Self::SchemaBuildFailed(msg) => {
                write!(f, "Failed to build GraphQL schema: {msg}")
            }
            Self::Config(msg) => {
                write!(f, "Invalid GraphQL configuration: {msg}")
            }
            Self::InvalidId(id) => {
                write!(f, "Invalid document id: {id}")
            }
            Self::InvalidArgument(msg) => {
                write!(f, "Invalid argument: {msg}")
            }
            Self::Storage(msg) => {
                write!(f, "Storage error: {msg}")
            }
            Self::Internal(msg) => {
                write!(f, "Internal error: {msg}")
            }
        }
    }
}

impl std::error::Error for GraphQLError {}

impl GraphQLError {
    /// Returns the error code for GraphQL error extensions.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingFields(_) => "MISSING_FIELDS",
            Self::UnresolvedLink { .. } => "UNRESOLVED_LINK",
            Self::MissingArrayElement(_) => "MISSING_ARRAY_ELEMENT",
            Self::UnregisteredType(_) => "UNREGISTERED_TYPE",
            Self::InvalidName(_) => "INVALID_NAME",
            Self::DuplicateType(_) => "DUPLICATE_TYPE",
            Self::SchemaBuildFailed(_) => "SCHEMA_BUILD_FAILED",
            Self::Config(_) => "CONFIG_ERROR",
            Self::InvalidId(_) => "INVALID_ID",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl ErrorExtensions for GraphQLError {
    fn extend(&self) -> async_graphql::Error {
        let code = self.error_code();
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| e.set("code", code))
    }
}

impl From<docgraph_storage::StoreError> for GraphQLError {
    fn from(err: docgraph_storage::StoreError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<docgraph_core::CoreError> for GraphQLError {
    fn from(err: docgraph_core::CoreError) -> Self {
        match err {
            docgraph_core::CoreError::InvalidId(id) => Self::InvalidId(id),
            other => Self::Config(other.to_string()),
        }
    }
}
