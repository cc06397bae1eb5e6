//! Raw documents as exchanged with a store backend.

use serde::de::DeserializeOwned;

use crate::error::BackendResult;
use crate::schema::{FieldMap, Stored};

/// A document's identifier and fields, before typing.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// The document identifier.
    pub id: String,
    /// The stored fields, including the timestamps.
    pub fields: FieldMap,
}

impl StoredDocument {
    /// Creates a document.
    pub fn new(id: impl Into<String>, fields: FieldMap) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Decodes the document into a typed entity.
    pub fn decode<E: DeserializeOwned>(self) -> BackendResult<Stored<E>> {
        Stored::from_fields(&self.id, self.fields)
    }
}
