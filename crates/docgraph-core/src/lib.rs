//! Collection and field definitions shared by every docgraph crate.

pub mod collection;
pub mod error;
pub mod field;
pub mod id;
pub mod raw;
pub mod registry;

pub use collection::CollectionDef;
pub use error::{CoreError, ErrorCategory, Result};
pub use field::{FieldDef, FieldKind, FieldMap, Getter};
pub use id::{DocumentId, ID_FIELD, id_key};
pub use raw::{RawCollectionDef, RawFieldDef, RawSchema};
pub use registry::CollectionRegistry;

/// A stored document: a JSON object carrying `_id`.
pub type Document = serde_json::Value;
