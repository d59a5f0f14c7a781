//! Collection definitions.

use serde_json::Value;

use crate::error::{CoreError, Result};
use crate::field::{FieldDef, FieldMap};
use crate::id::{ID_FIELD, id_key};

/// A named collection with ordered fields.
///
/// Collections that carry `values` are enumerated: their documents live in
/// the definition itself and are never read from the store.
#[derive(Debug, Clone)]
pub struct CollectionDef {
    pub name: String,
    pub fields: FieldMap,
    pub values: Option<Vec<Value>>,
}

impl CollectionDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: FieldMap::new(),
            values: None,
        }
    }

    pub fn field(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        self.fields.insert(name.into(), def);
        self
    }

    /// Turns the collection into an enumerated one. Every value must carry `_id`.
    pub fn with_values(mut self, values: Vec<Value>) -> Result<Self> {
        if values.iter().any(|v| v.get(ID_FIELD).is_none()) {
            return Err(CoreError::EnumValueWithoutId {
                collection: self.name,
            });
        }
        self.values = Some(values);
        Ok(self)
    }

    pub fn is_enum(&self) -> bool {
        self.values.is_some()
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    /// Identifiers of every enumerated value, in declared order.
    pub fn enum_ids(&self) -> Vec<Value> {
        self.values
            .iter()
            .flatten()
            .filter_map(|v| v.get(ID_FIELD).cloned())
            .collect()
    }

    /// Looks up one enumerated value by id.
    pub fn by_id(&self, id: &Value) -> Option<&Value> {
        let key = id_key(id);
        self.values
            .iter()
            .flatten()
            .find(|v| v.get(ID_FIELD).map(id_key).as_deref() == Some(key.as_str()))
    }

    /// Looks up enumerated values in the order the ids were requested.
    /// Unknown ids are skipped.
    pub fn by_ids(&self, ids: &[Value]) -> Vec<Value> {
        ids.iter().filter_map(|id| self.by_id(id).cloned()).collect()
    }
}
