//! The [`Entity`] trait and the stored-document wrapper.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Collection;
use crate::error::{BackendError, BackendResult};

/// A document's fields, keyed by wire name.
pub type FieldMap = Map<String, Value>;

/// Wire name of the creation timestamp.
pub const CREATED_AT: &str = "createdAt";

/// Wire name of the modification timestamp.
pub const UPDATED_AT: &str = "updatedAt";

/// Wire name of the identifier merged into reconstructed documents.
pub const ID: &str = "id";

/// A domain entity stored in exactly one collection.
///
/// The payload type never contains the identifier or timestamps; those live
/// on [`Stored`]. Each entity has a matching patch type whose fields are all
/// optional; a patch serializes only the fields that are set, and that field
/// map is what the store merges on update.
///
/// Entities with derived fields (payment totals, low-stock flags) declare
/// which fields feed the derivation and which fields it produces. The access
/// layer recomputes the outputs whenever a patch touches either list.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The collection this entity lives in.
    const COLLECTION: Collection;

    /// Wire names of fields that feed [`Entity::derive`].
    const DERIVED_INPUTS: &'static [&'static str] = &[];

    /// Wire names of fields written by [`Entity::derive`].
    const DERIVED_OUTPUTS: &'static [&'static str] = &[];

    /// The all-optional partial form of this entity.
    type Patch: Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static;

    /// Recomputes derived fields from their authoritative inputs.
    fn derive(&mut self) {}
}

/// An entity as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stored<E> {
    /// Store-assigned identifier, immutable after creation.
    pub id: String,

    /// Set once when the document is created.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "super::timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,

    /// Refreshed on every write.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "super::timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,

    /// The entity fields.
    #[serde(flatten)]
    pub data: E,
}

impl<E> Stored<E> {
    /// Consumes the wrapper, returning the entity fields.
    pub fn into_inner(self) -> E {
        self.data
    }
}

impl<E> std::ops::Deref for Stored<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.data
    }
}

impl<E: DeserializeOwned> Stored<E> {
    /// Reconstructs a stored entity from its id and raw fields.
    pub fn from_fields(id: &str, mut fields: FieldMap) -> BackendResult<Self> {
        fields.insert(ID.to_string(), Value::String(id.to_string()));
        Ok(serde_json::from_value(Value::Object(fields))?)
    }
}

/// Serializes a payload or patch into its field map.
pub fn to_field_map<T: Serialize>(value: &T) -> BackendResult<FieldMap> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(BackendError::SerializationError {
            message: format!("expected a JSON object, found {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::{Treatment, TreatmentPatch};

    #[test]
    fn test_from_fields_merges_id() {
        let fields = json!({
            "name": "Abhyanga",
            "description": "Full-body oil massage",
            "duration": "60 min",
            "category": "Panchakarma",
            "createdAt": "2025-01-15T09:30:00.000000Z",
            "updatedAt": "2025-01-15T09:30:00.000000Z"
        });
        let Value::Object(fields) = fields else {
            unreachable!()
        };

        let stored = Stored::<Treatment>::from_fields("t-1", fields).unwrap();
        assert_eq!(stored.id, "t-1");
        assert_eq!(stored.name, "Abhyanga");
        assert_eq!(stored.created_at, stored.updated_at);
        assert!(stored.created_at.is_some());
    }

    #[test]
    fn test_from_fields_without_timestamps() {
        let Value::Object(fields) = json!({
            "name": "Shirodhara",
            "description": "Oil poured on the forehead",
            "duration": "45 min",
            "category": "Panchakarma"
        }) else {
            unreachable!()
        };

        let stored = Stored::<Treatment>::from_fields("t-2", fields).unwrap();
        assert!(stored.created_at.is_none());
        assert!(stored.updated_at.is_none());
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let patch = TreatmentPatch {
            duration: Some("90 min".to_string()),
            ..Default::default()
        };
        let map = to_field_map(&patch).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["duration"], json!("90 min"));
    }

    #[test]
    fn test_to_field_map_rejects_scalars() {
        let err = to_field_map(&42).unwrap_err();
        assert!(err.to_string().contains("number"));
    }
}
