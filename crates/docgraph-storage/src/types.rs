//! Query-side value types passed to [`crate::DocumentStore`].

use docgraph_core::{DocumentId, ID_FIELD};
use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};

use crate::Document;

/// Permission label used when a caller does not supply one.
pub const DEFAULT_PERMISSION: &str = "view";

/// One acceptable value inside a membership filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// A native document identifier.
    Id(DocumentId),
    /// Any other JSON value, compared by equality.
    Value(Value),
}

impl FilterValue {
    /// Whether a single stored value equals this filter value.
    pub fn matches(&self, stored: &Value) -> bool {
        match self {
            Self::Id(id) => match stored {
                Value::String(s) => s.parse::<DocumentId>().is_ok_and(|parsed| parsed == *id),
                _ => false,
            },
            Self::Value(expected) => values_equal(expected, stored),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Id(id) => id.to_value(),
            Self::Value(value) => value.clone(),
        }
    }
}

impl From<DocumentId> for FilterValue {
    fn from(id: DocumentId) -> Self {
        Self::Id(id)
    }
}

impl From<Value> for FilterValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Value(Value::String(value.to_string()))
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Conjunction of per-field membership tests (`field ∈ {values}`).
///
/// A field whose stored value is an array matches when any element is in the
/// set. An empty set matches nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: IndexMap<String, Vec<FilterValue>>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, field: impl Into<String>, values: Vec<FilterValue>) -> Self {
        self.insert(field, values);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, values: Vec<FilterValue>) {
        self.fields.insert(field.into(), values);
    }

    pub fn get(&self, field: &str) -> Option<&[FilterValue]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FilterValue])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.fields.iter().all(|(field, accepted)| {
            let Some(stored) = document.get(field) else {
                return false;
            };
            let candidates: &[Value] = match stored {
                Value::Array(items) => items,
                single => std::slice::from_ref(single),
            };
            candidates
                .iter()
                .any(|value| accepted.iter().any(|a| a.matches(value)))
        })
    }

    /// Mongo-style rendering (`{"field": {"$in": [...]}}`) for logs.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(field, values)| {
                let values: Vec<Value> = values.iter().map(FilterValue::to_json).collect();
                (field.clone(), serde_json::json!({ "$in": values }))
            })
            .collect();
        Value::Object(map)
    }
}

/// Set of top-level fields a store query should return. Always contains `_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    fields: IndexSet<String>,
}

impl Default for Projection {
    fn default() -> Self {
        Self::new()
    }
}

impl Projection {
    pub fn new() -> Self {
        let mut fields = IndexSet::new();
        fields.insert(ID_FIELD.to_string());
        Self { fields }
    }

    pub fn include(&mut self, field: impl Into<String>) {
        self.fields.insert(field.into());
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Copies only the projected fields of a document.
    pub fn apply(&self, document: &Document) -> Document {
        match document {
            Value::Object(map) => Value::Object(
                map.iter()
                    .filter(|(k, _)| self.fields.contains(k.as_str()))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Mongo-style rendering (`{"_id": 1, "name": 1}`).
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|f| (f.clone(), Value::from(1)))
                .collect(),
        )
    }
}

impl<S: Into<String>> FromIterator<S> for Projection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut projection = Self::new();
        for field in iter {
            projection.include(field);
        }
        projection
    }
}

/// Everything a store needs to answer one find call.
#[derive(Debug, Clone, PartialEq)]
pub struct FindOptions {
    pub filter: Filter,
    /// `None` means every field.
    pub projection: Option<Projection>,
    /// Opaque authorization token.
    pub auth: Option<Value>,
    /// Permission label.
    pub perm: String,
}

impl Default for FindOptions {
    fn default() -> Self {
        Self::new(Filter::default())
    }
}

impl FindOptions {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            projection: None,
            auth: None,
            perm: DEFAULT_PERMISSION.to_string(),
        }
    }

    pub fn with_projection(mut self, projection: Option<Projection>) -> Self {
        self.projection = projection;
        self
    }

    pub fn with_auth(mut self, auth: Option<Value>, perm: impl Into<String>) -> Self {
        self.auth = auth;
        self.perm = perm.into();
        self
    }
}
