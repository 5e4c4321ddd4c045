//! # Document Conversion
//!
//! Request bodies arrive as JSON and are stored as BSON documents.
//! Store ids leave the API as plain hex strings, the same shape browser
//! clients already receive from the document store's own JSON encoding.

use crate::error::{ArtsError, ArtsResult};
use bson::{oid::ObjectId, Bson, Document};
use serde_json::{Map, Number, Value};

/// Convert a JSON request body into a BSON document.
///
/// Only JSON objects are accepted; arrays and scalars are rejected.
pub fn json_to_document(value: Value) -> ArtsResult<Document> {
    if !value.is_object() {
        return Err(ArtsError::InvalidRequest(
            "Request body must be a JSON object".to_string(),
        ));
    }
    Ok(bson::to_document(&value)?)
}

/// Convert an arbitrary JSON value into BSON (used for `$set` and `$push` operands).
pub fn json_to_bson(value: &Value) -> ArtsResult<Bson> {
    Ok(bson::to_bson(value)?)
}

/// Render a stored document as JSON
pub fn document_to_json(doc: Document) -> Value {
    let map: Map<String, Value> = doc
        .into_iter()
        .map(|(key, value)| (key, bson_to_json(value)))
        .collect();
    Value::Object(map)
}

/// Render a BSON value as JSON
pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::Document(doc) => document_to_json(doc),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::String(s) => Value::String(s),
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Int32(i) => Value::Number(i.into()),
        Bson::Int64(i) => Value::Number(i.into()),
        Bson::Double(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(s) => Value::String(s),
            Err(_) => Bson::DateTime(dt).into_relaxed_extjson(),
        },
        other => other.into_relaxed_extjson(),
    }
}

/// Parse a path segment into a store id
pub fn parse_object_id(id: &str) -> ArtsResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| ArtsError::InvalidId { id: id.to_string() })
}

/// Numeric view of a BSON value, if it has one
pub fn bson_as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(f) => Some(*f),
        Bson::Int32(i) => Some(f64::from(*i)),
        Bson::Int64(i) => Some(*i as f64),
        _ => None,
    }
}

/// JavaScript-style truthiness for an optional JSON field.
///
/// Patch bodies treat `null`, `false`, `0` and `""` the same as a missing key.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
