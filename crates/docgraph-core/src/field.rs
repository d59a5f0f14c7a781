//! Field definitions.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::CoreError;

/// Ordered mapping of field name to definition.
pub type FieldMap = IndexMap<String, FieldDef>;

/// Primitive kinds a scalar field can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    Url,
    Email,
    Image,
    Password,
    Date,
    Uid,
    Boolean,
    Double,
    Integer,
    Id,
}

impl FieldKind {
    pub const ALL: [FieldKind; 11] = [
        FieldKind::String,
        FieldKind::Url,
        FieldKind::Email,
        FieldKind::Image,
        FieldKind::Password,
        FieldKind::Date,
        FieldKind::Uid,
        FieldKind::Boolean,
        FieldKind::Double,
        FieldKind::Integer,
        FieldKind::Id,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Url => "url",
            Self::Email => "email",
            Self::Image => "image",
            Self::Password => "password",
            Self::Date => "date",
            Self::Uid => "uid",
            Self::Boolean => "boolean",
            Self::Double => "double",
            Self::Integer => "integer",
            Self::Id => "id",
        }
    }
}

impl FromStr for FieldKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CoreError::unknown_field_kind("<kind>", s))
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Computes a field value from the whole parent document.
#[derive(Clone)]
pub struct Getter(Arc<dyn Fn(&Value) -> Value + Send + Sync>);

impl Getter {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, document: &Value) -> Value {
        (self.0)(document)
    }
}

impl fmt::Debug for Getter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Getter(..)")
    }
}

/// Shape of a single field in a collection.
#[derive(Debug, Clone)]
pub enum FieldDef {
    /// Primitive value. A getter marks the field as computed.
    Scalar {
        kind: FieldKind,
        getter: Option<Getter>,
    },
    /// Reference to a document in another collection.
    Link { collection: String },
    /// List of elements. A missing element definition is rejected at schema build.
    Array { of: Option<Box<FieldDef>> },
    /// Nested anonymous structure.
    Object { fields: Option<FieldMap> },
}

impl FieldDef {
    pub fn scalar(kind: FieldKind) -> Self {
        Self::Scalar { kind, getter: None }
    }

    pub fn string() -> Self {
        Self::scalar(FieldKind::String)
    }

    pub fn id() -> Self {
        Self::scalar(FieldKind::Id)
    }

    pub fn computed<F>(kind: FieldKind, getter: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Self::Scalar {
            kind,
            getter: Some(Getter::new(getter)),
        }
    }

    pub fn link(collection: impl Into<String>) -> Self {
        Self::Link {
            collection: collection.into(),
        }
    }

    pub fn array(of: FieldDef) -> Self {
        Self::Array {
            of: Some(Box::new(of)),
        }
    }

    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, FieldDef)>,
        K: Into<String>,
    {
        Self::Object {
            fields: Some(fields.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Self::Scalar { getter: Some(_), .. })
    }

    /// Target collection of a link or array-of-link field.
    pub fn link_target(&self) -> Option<&str> {
        match self {
            Self::Link { collection } => Some(collection),
            Self::Array { of: Some(of) } => match of.as_ref() {
                Self::Link { collection } => Some(collection),
                _ => None,
            },
            _ => None,
        }
    }
}
