//! JSON to Firestore typed-value encoding.
//!
//! Firestore's REST API does not accept plain JSON documents; every value
//! must be wrapped in a typed envelope such as `{"stringValue": "..."}`.
//! Integers travel as decimal strings. Integers outside the `i64` range are
//! sent as doubles because Firestore has no unsigned type.

use serde_json::{json, Map, Value};

/// Encodes one JSON value as a Firestore `Value`.
#[must_use]
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            if items.is_empty() {
                json!({ "arrayValue": {} })
            } else {
                let values: Vec<Value> = items.iter().map(encode_value).collect();
                json!({ "arrayValue": { "values": values } })
            }
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Encodes a JSON object as the `fields` map of a Firestore document.
#[must_use]
pub fn encode_fields(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect()
}
