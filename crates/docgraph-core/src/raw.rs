//! Serde-facing collection definitions loaded from JSON or TOML files.
//!
//! ```toml
//! [[collections]]
//! name = "user"
//!
//! [collections.fields]
//! _id = "id"
//! name = "string"
//! organizationId = { link = "organization" }
//! teamIds = { is = "array", of = { link = "team" } }
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::collection::CollectionDef;
use crate::error::{CoreError, Result};
use crate::field::{FieldDef, FieldKind};
use crate::registry::CollectionRegistry;

/// Top-level definition document.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSchema {
    #[serde(default)]
    pub collections: Vec<RawCollectionDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCollectionDef {
    pub name: String,
    #[serde(default)]
    pub fields: IndexMap<String, RawFieldDef>,
    #[serde(default, rename = "enum")]
    pub is_enum: bool,
    #[serde(default)]
    pub values: Option<Vec<Value>>,
}

/// Either a bare kind name (`"string"`) or a full field description.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawFieldDef {
    Kind(String),
    Spec(RawFieldSpec),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFieldSpec {
    #[serde(default)]
    pub is: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub of: Option<Box<RawFieldDef>>,
    #[serde(default)]
    pub fields: Option<IndexMap<String, RawFieldDef>>,
}

impl RawFieldDef {
    fn into_field_def(self, path: &str) -> Result<FieldDef> {
        match self {
            RawFieldDef::Kind(kind) => parse_kind(path, &kind).map(FieldDef::scalar),
            RawFieldDef::Spec(spec) => spec.into_field_def(path),
        }
    }
}

impl RawFieldSpec {
    fn into_field_def(self, path: &str) -> Result<FieldDef> {
        if let Some(collection) = self.link {
            return Ok(FieldDef::Link { collection });
        }

        match self.is.as_deref() {
            Some("array") => {
                let of = self
                    .of
                    .map(|of| of.into_field_def(&format!("{path}[]")))
                    .transpose()?
                    .map(Box::new);
                Ok(FieldDef::Array { of })
            }
            Some("object") => {
                let fields = self
                    .fields
                    .map(|fields| convert_fields(fields, path))
                    .transpose()?;
                Ok(FieldDef::Object { fields })
            }
            Some("link") => Err(CoreError::missing_shape(path)),
            Some(kind) => parse_kind(path, kind).map(FieldDef::scalar),
            None if self.fields.is_some() => {
                let fields = self
                    .fields
                    .map(|fields| convert_fields(fields, path))
                    .transpose()?;
                Ok(FieldDef::Object { fields })
            }
            None => Err(CoreError::missing_shape(path)),
        }
    }
}

fn parse_kind(path: &str, kind: &str) -> Result<FieldKind> {
    kind.parse::<FieldKind>()
        .map_err(|_| CoreError::unknown_field_kind(path, kind))
}

fn convert_fields(
    fields: IndexMap<String, RawFieldDef>,
    path: &str,
) -> Result<IndexMap<String, FieldDef>> {
    fields
        .into_iter()
        .map(|(name, raw)| {
            let field_path = format!("{path}.{name}");
            raw.into_field_def(&field_path).map(|def| (name, def))
        })
        .collect()
}

impl TryFrom<RawCollectionDef> for CollectionDef {
    type Error = CoreError;

    fn try_from(raw: RawCollectionDef) -> Result<Self> {
        let fields = convert_fields(raw.fields, &raw.name)?;
        let def = CollectionDef {
            name: raw.name,
            fields,
            values: None,
        };
        if raw.is_enum || raw.values.is_some() {
            def.with_values(raw.values.unwrap_or_default())
        } else {
            Ok(def)
        }
    }
}

impl RawSchema {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads a definition file, choosing the format from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&text),
            Some("toml") => Self::from_toml(&text),
            other => Err(CoreError::configuration(format!(
                "Unsupported definition file extension {:?} for {}",
                other,
                path.display()
            ))),
        }
    }

    pub fn into_registry(self) -> Result<CollectionRegistry> {
        let defs = self
            .collections
            .into_iter()
            .map(CollectionDef::try_from)
            .collect::<Result<Vec<_>>>()?;
        CollectionRegistry::from_definitions(defs)
    }
}
