//! Firestore typed values and documents

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Number, Value};

use crate::error::{Error, Result};

/// A document read from the store: its id and its decoded fields
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: &str, fields: Map<String, Value>) -> Self {
        Self {
            id: id.to_string(),
            fields,
        }
    }

    /// Build a document from a JSON object literal; other values give no fields.
    pub fn from_json(id: &str, value: Value) -> Self {
        match value {
            Value::Object(fields) => Self::new(id, fields),
            _ => Self::new(id, Map::new()),
        }
    }

    /// Read a string field.
    ///
    /// Absent and null fields are `Ok(None)`; a field of another type is an error.
    pub fn get_string(&self, field: &str) -> Result<Option<&str>> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(Error::fetch(format!(
                "field `{}` of document `{}` is not a string: {}",
                field, self.id, other
            ))),
        }
    }

    /// Read a string field, falling back to `default` when absent
    pub fn string_or(&self, field: &str, default: &str) -> Result<String> {
        Ok(self.get_string(field)?.unwrap_or(default).to_string())
    }
}

/// A document as the REST API returns it
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawDocument {
    /// Full resource name, `projects/{p}/databases/{d}/documents/{path}`
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

impl RawDocument {
    /// The last path segment of the resource name
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }

    pub fn decode(&self) -> Document {
        Document::new(self.id(), decode_fields(&self.fields))
    }
}

/// Decode a map of typed values into plain JSON values
pub fn decode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), decode_value(value)))
        .collect()
}

/// Decode one typed value, e.g. `{"stringValue": "x"}` becomes `"x"`
pub fn decode_value(value: &Value) -> Value {
    let Some(object) = value.as_object() else {
        return Value::Null;
    };
    let Some((kind, inner)) = object.iter().next() else {
        return Value::Null;
    };

    match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" => inner.as_bool().map(Value::Bool).unwrap_or(Value::Null),
        // integers travel as strings
        "integerValue" => match inner {
            Value::String(s) => s
                .parse::<i64>()
                .map(|n| Value::Number(n.into()))
                .unwrap_or(Value::Null),
            Value::Number(n) => Value::Number(n.clone()),
            _ => Value::Null,
        },
        "doubleValue" => match inner {
            Value::Number(n) => Value::Number(n.clone()),
            Value::String(s) => s
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            _ => Value::Null,
        },
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "geoPointValue" => inner.clone(),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner
                .get("fields")
                .and_then(Value::as_object)
                .map(decode_fields)
                .unwrap_or_default(),
        ),
        _ => Value::Null,
    }
}

/// Encode plain JSON fields into typed values
pub fn encode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect()
}

/// Encode one plain JSON value as a typed value
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(values) => json!({
            "arrayValue": { "values": values.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}
