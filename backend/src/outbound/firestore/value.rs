//! JSON to Firestore typed-value codec.
//!
//! Firestore's REST API wraps every value in a single-key object naming its
//! type (`{"stringValue": "x"}`). Integers travel as decimal strings.
//! Timestamps, references and bytes decode to plain strings and geo points
//! to `{latitude, longitude}` objects; the domain never writes those types.

use serde_json::{Map, Number, Value, json};

use crate::domain::ports::{DocumentData, DocumentStoreError};

/// Encode a JSON value as a Firestore value.
///
/// # Examples
/// ```
/// use carehub::outbound::firestore::value::encode;
/// use serde_json::json;
///
/// assert_eq!(encode(&json!(3)), json!({ "integerValue": "3" }));
/// assert_eq!(encode(&json!("x")), json!({ "stringValue": "x" }));
/// ```
pub fn encode(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(flag) => json!({ "booleanValue": flag }),
        Value::Number(number) => encode_number(number),
        Value::String(text) => json!({ "stringValue": text }),
        Value::Array(items) => {
            if items.is_empty() {
                json!({ "arrayValue": {} })
            } else {
                let values: Vec<Value> = items.iter().map(encode).collect();
                json!({ "arrayValue": { "values": values } })
            }
        }
        Value::Object(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

fn encode_number(number: &Number) -> Value {
    match number.as_i64() {
        Some(integer) => json!({ "integerValue": integer.to_string() }),
        None => json!({ "doubleValue": number.as_f64() }),
    }
}

/// Encode a document body as a Firestore `fields` map.
pub fn encode_fields(data: &DocumentData) -> Map<String, Value> {
    data.iter()
        .map(|(key, value)| (key.clone(), encode(value)))
        .collect()
}

fn unsupported(value: &Value) -> DocumentStoreError {
    DocumentStoreError::query(format!("unsupported Firestore value: {value}"))
}

/// Decode a Firestore value into plain JSON.
///
/// # Errors
///
/// Returns [`DocumentStoreError::Query`] for values that are not a
/// single-key typed object or whose payload does not match the type.
pub fn decode(value: &Value) -> Result<Value, DocumentStoreError> {
    let Some(object) = value.as_object() else {
        return Err(unsupported(value));
    };
    let mut entries = object.iter();
    let (Some((kind, inner)), None) = (entries.next(), entries.next()) else {
        return Err(unsupported(value));
    };
    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| unsupported(value)),
        "integerValue" => decode_integer(inner).ok_or_else(|| unsupported(value)),
        "doubleValue" => inner
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| unsupported(value)),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner
            .as_str()
            .map(|text| Value::String(text.to_owned()))
            .ok_or_else(|| unsupported(value)),
        "geoPointValue" => Ok(json!({
            "latitude": inner.get("latitude").cloned().unwrap_or(json!(0.0)),
            "longitude": inner.get("longitude").cloned().unwrap_or(json!(0.0)),
        })),
        "arrayValue" => {
            let values = match inner.get("values") {
                Some(Value::Array(values)) => values.iter().map(decode).collect::<Result<_, _>>()?,
                Some(_) => return Err(unsupported(value)),
                None => Vec::new(),
            };
            Ok(Value::Array(values))
        }
        "mapValue" => match inner.get("fields") {
            Some(fields) => decode_fields(fields).map(Value::Object),
            None => Ok(Value::Object(Map::new())),
        },
        _ => Err(unsupported(value)),
    }
}

fn decode_integer(inner: &Value) -> Option<Value> {
    match inner {
        Value::String(text) => text.parse::<i64>().ok().map(Value::from),
        Value::Number(number) => number.as_i64().map(Value::from),
        _ => None,
    }
}

/// Decode a Firestore `fields` map into a document body.
///
/// # Errors
///
/// Returns [`DocumentStoreError::Query`] when `fields` is not an object or
/// any field fails to decode.
pub fn decode_fields(fields: &Value) -> Result<DocumentData, DocumentStoreError> {
    let Some(fields) = fields.as_object() else {
        return Err(unsupported(fields));
    };
    fields
        .iter()
        .map(|(key, value)| decode(value).map(|decoded| (key.clone(), decoded)))
        .collect()
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(json!(null), json!({ "nullValue": null }))]
    #[case(json!(true), json!({ "booleanValue": true }))]
    #[case(json!(-4), json!({ "integerValue": "-4" }))]
    #[case(json!(1.5), json!({ "doubleValue": 1.5 }))]
    #[case(json!([]), json!({ "arrayValue": {} }))]
    #[case(json!({ "a": [1] }), json!({ "mapValue": { "fields": { "a": { "arrayValue": { "values": [{ "integerValue": "1" }] } } } } }))]
    fn encodes_scalars_and_containers(#[case] plain: Value, #[case] typed: Value) {
        assert_eq!(encode(&plain), typed);
    }

    #[test]
    fn decodes_nested_documents() {
        let fields = json!({
            "name": { "stringValue": "Jane Doe" },
            "age": { "integerValue": "81" },
            "admitted": { "timestampValue": "2026-01-05T10:00:00Z" },
            "tags": { "arrayValue": { "values": [{ "stringValue": "falls-risk" }] } },
            "contact": { "mapValue": { "fields": { "phone": { "nullValue": null } } } },
            "empty": { "mapValue": {} },
        });

        let decoded = decode_fields(&fields).expect("decodes");

        assert_eq!(
            Value::Object(decoded),
            json!({
                "name": "Jane Doe",
                "age": 81,
                "admitted": "2026-01-05T10:00:00Z",
                "tags": ["falls-risk"],
                "contact": { "phone": null },
                "empty": {},
            })
        );
    }

    #[test]
    fn decodes_geo_points() {
        let decoded = decode(&json!({ "geoPointValue": { "latitude": 51.5, "longitude": -0.1 } }))
            .expect("decodes");
        assert_eq!(decoded, json!({ "latitude": 51.5, "longitude": -0.1 }));
    }

    #[rstest]
    #[case(json!("bare"))]
    #[case(json!({}))]
    #[case(json!({ "stringValue": "a", "integerValue": "1" }))]
    #[case(json!({ "integerValue": "twelve" }))]
    #[case(json!({ "mysteryValue": 1 }))]
    fn rejects_malformed_values(#[case] value: Value) {
        assert!(matches!(decode(&value), Err(DocumentStoreError::Query { .. })));
    }
}
