//! Conversion between plain JSON and Firestore typed values
//!
//! Firestore's REST API wraps every value in a single-key object naming its
//! type, e.g. `{"stringValue": "x"}` or
//! `{"arrayValue": {"values": [...]}}`. Collections work with plain JSON;
//! this module translates at the edge.

use serde_json::{Map, Value, json};

use crate::{Error, Result};

/// Encode a JSON object as a Firestore `fields` map
pub fn encode_fields(data: &Value) -> Result<Value> {
    match data {
        Value::Object(map) => Ok(Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), encode(value)))
                .collect(),
        )),
        other => Err(Error::validation(
            other.to_string(),
            "documents must be JSON objects",
        )),
    }
}

/// Decode a Firestore `fields` map into a JSON object
///
/// A missing `fields` map (an empty document) decodes to `{}`.
pub fn decode_fields(fields: Option<&Value>) -> Result<Value> {
    let Some(fields) = fields else {
        return Ok(Value::Object(Map::new()));
    };
    let map = fields
        .as_object()
        .ok_or_else(|| Error::validation(fields.to_string(), "fields must be an object"))?;

    let mut out = Map::with_capacity(map.len());
    for (key, value) in map {
        out.insert(key.clone(), decode(value)?);
    }
    Ok(Value::Object(out))
}

/// Encode a single JSON value
pub fn encode(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            // Firestore transports 64-bit integers as strings
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => {
            let fields: Map<String, Value> = map
                .iter()
                .map(|(key, value)| (key.clone(), encode(value)))
                .collect();
            json!({ "mapValue": { "fields": fields } })
        }
    }
}

/// Decode a single Firestore typed value
pub fn decode(value: &Value) -> Result<Value> {
    let unsupported = || Error::validation(value.to_string(), "unsupported Firestore value");

    let map = value.as_object().ok_or_else(unsupported)?;
    let (kind, inner) = map.iter().next().ok_or_else(unsupported)?;

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" | "doubleValue" => Ok(inner.clone()),
        "integerValue" => {
            let text = inner.as_str().ok_or_else(unsupported)?;
            let parsed: i64 = text.parse().map_err(|_| unsupported())?;
            Ok(Value::from(parsed))
        }
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => Ok(inner.clone()),
        "arrayValue" => {
            let values = inner
                .get("values")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(decode).collect::<Result<Vec<_>>>())
                .transpose()?
                .unwrap_or_default();
            Ok(Value::Array(values))
        }
        "mapValue" => decode_fields(inner.get("fields")),
        _ => Err(unsupported()),
    }
}
