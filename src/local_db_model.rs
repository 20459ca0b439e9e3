//! Document bodies as written to and read from a store.
//!
//! Writers hand a store a [`Fields`] map. Values are either plain JSON or the
//! [`FieldValue::ServerTimestamp`] sentinel, which the store replaces with its
//! own clock reading at write time. What comes back out is a
//! [`StoredDocument`] whose `data` holds only resolved JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// A single field value in a pending write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Value(JsonValue),
    /// Resolved by the store to an RFC 3339 UTC timestamp when the write lands.
    ServerTimestamp,
}

impl From<JsonValue> for FieldValue {
    fn from(value: JsonValue) -> Self {
        FieldValue::Value(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Value(JsonValue::from(value))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Value(JsonValue::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Value(JsonValue::from(value))
    }
}

/// Field map of a pending write, ordered by field name.
pub type Fields = BTreeMap<String, FieldValue>;

/// Replaces every [`FieldValue::ServerTimestamp`] with `now` and returns the JSON body.
pub fn resolve_fields(fields: Fields, now: &str) -> JsonValue {
    let mut body = Map::with_capacity(fields.len());
    for (name, value) in fields {
        let resolved = match value {
            FieldValue::Value(json) => json,
            FieldValue::ServerTimestamp => JsonValue::String(now.to_string()),
        };
        body.insert(name, resolved);
    }
    JsonValue::Object(body)
}

/// A document as persisted by a store.
///
/// - **id**: last segment of the path
/// - **path**: full `/`-joined collection/document path, used as the storage key
/// - **data**: the JSON object written, with timestamps resolved
///
/// ```rust
/// use course_seed_core::local_db_model::StoredDocument;
/// use serde_json::json;
///
/// let doc = StoredDocument {
///     id: "nivel-basico".to_string(),
///     path: "courses/portugues/levels/nivel-basico".to_string(),
///     data: json!({"name": "Nivel Básico", "order": 1}),
/// };
///
/// let json_string = serde_json::to_string(&doc)?;
/// let back: StoredDocument = serde_json::from_str(&json_string)?;
/// assert_eq!(back.field("order"), Some(&json!(1)));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub path: String,
    pub data: JsonValue,
}

impl StoredDocument {
    pub fn field(&self, name: &str) -> Option<&JsonValue> {
        self.data.get(name)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(JsonValue::as_str)
    }

    /// The body without the fields named in `excluded`, e.g. timestamps when
    /// comparing two loads.
    pub fn data_without(&self, excluded: &[&str]) -> JsonValue {
        match &self.data {
            JsonValue::Object(map) => JsonValue::Object(
                map.iter()
                    .filter(|(name, _)| !excluded.contains(&name.as_str()))
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}
