//! Converters between plain json and the typed value encoding the Firestore
//! REST api uses for document fields.
//! https://firebase.google.com/docs/firestore/reference/rest/v1/Value

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Map, Number, Value};

#[derive(Debug, Serialize, Deserialize)]
pub struct FirestoreDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryResponseItem {
    #[serde(default)]
    pub document: Option<FirestoreDocument>,
}

pub fn to_document<T: Serialize>(val: &T) -> Result<FirestoreDocument, String> {
    match serde_json::to_value(val).map_err(|e| e.to_string())? {
        Value::Object(fields) => Ok(FirestoreDocument {
            name: None,
            fields: fields
                .iter()
                .map(|(key, value)| (key.clone(), encode_value(value)))
                .collect(),
        }),
        other => Err(format!("Only objects can be stored as documents, got: {}", other)),
    }
}

pub fn from_document<T: DeserializeOwned>(doc: &FirestoreDocument) -> Result<T, String> {
    let value = decode_fields(&doc.fields)?;
    serde_json::from_value(value).map_err(|e| {
        format!(
            "Document {} has an unexpected shape: {}",
            doc.name.as_deref().unwrap_or("<unnamed>"),
            e
        )
    })
}

fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            // Firestore transmits 64 bit integers as strings
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(values) => json!({
            "arrayValue": { "values": values.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(fields) => json!({
            "mapValue": {
                "fields": fields
                    .iter()
                    .map(|(key, value)| (key.clone(), encode_value(value)))
                    .collect::<Map<_, _>>()
            }
        }),
    }
}

fn decode_fields(fields: &Map<String, Value>) -> Result<Value, String> {
    fields
        .iter()
        .map(|(key, value)| decode_value(value).map(|value| (key.clone(), value)))
        .collect::<Result<Map<_, _>, _>>()
        .map(Value::Object)
}

fn decode_value(value: &Value) -> Result<Value, String> {
    let typed = match value.as_object() {
        Some(typed) if typed.len() == 1 => typed,
        _ => return Err(format!("Malformed firestore value: {}", value)),
    };
    let (kind, inner) = match typed.iter().next() {
        Some(entry) => entry,
        None => return Err(format!("Malformed firestore value: {}", value)),
    };

    match (kind.as_str(), inner) {
        ("nullValue", _) => Ok(Value::Null),
        ("booleanValue", Value::Bool(b)) => Ok(Value::Bool(*b)),
        ("integerValue", Value::String(s)) => s
            .parse::<i64>()
            .map(|i| Value::Number(i.into()))
            .map_err(|_| format!("Malformed integer value: {}", s)),
        ("integerValue", Value::Number(n)) => Ok(Value::Number(n.clone())),
        ("doubleValue", Value::Number(n)) => Ok(Value::Number(n.clone())),
        ("doubleValue", Value::String(s)) => s
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| format!("Malformed double value: {}", s)),
        ("stringValue", Value::String(s))
        | ("timestampValue", Value::String(s))
        | ("referenceValue", Value::String(s)) => Ok(Value::String(s.clone())),
        ("arrayValue", Value::Object(array)) => match array.get("values") {
            Some(Value::Array(values)) => values
                .iter()
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            None => Ok(Value::Array(Vec::new())),
            Some(other) => Err(format!("Malformed array value: {}", other)),
        },
        ("mapValue", Value::Object(map)) => match map.get("fields") {
            Some(Value::Object(fields)) => decode_fields(fields),
            None => Ok(Value::Object(Map::new())),
            Some(other) => Err(format!("Malformed map value: {}", other)),
        },
        (kind, _) => Err(format!("Unsupported firestore value: {}", kind)),
    }
}
