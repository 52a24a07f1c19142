// Licensed under the Apache-2.0 license

//! Conversions between the codec's intermediate [`Value`] tree and the two
//! wire encodings: JSON text and CBOR bytes.

use coset::cbor::value::Value;
use serde_json::Value as Json;

use crate::error::{EarError, EarResult};

/// Short name of a value's wire type, for error messages.
pub fn describe(value: &Value) -> &'static str {
    match value {
        Value::Integer(_) => "integer",
        Value::Bytes(_) => "byte string",
        Value::Float(_) => "float",
        Value::Text(_) => "text",
        Value::Bool(_) => "bool",
        Value::Null => "null",
        Value::Tag(..) => "tagged value",
        Value::Array(_) => "array",
        Value::Map(_) => "map",
        _ => "unknown value",
    }
}

/// Converts a string-keyed value tree into JSON.
///
/// Integer map keys are written as their decimal string; byte strings have no
/// JSON form and are rejected.
pub fn to_json(value: &Value) -> EarResult<Json> {
    let json = match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Integer(i) => {
            let wide = i128::from(*i);
            if let Ok(v) = i64::try_from(wide) {
                Json::from(v)
            } else if let Ok(v) = u64::try_from(wide) {
                Json::from(v)
            } else {
                return Err(EarError::conversion("JSON number", wide.to_string()));
            }
        }
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Json::Number)
            .ok_or_else(|| EarError::conversion("JSON number", f.to_string()))?,
        Value::Text(s) => Json::String(s.clone()),
        Value::Tag(_, inner) => to_json(inner)?,
        Value::Array(items) => Json::Array(items.iter().map(to_json).collect::<EarResult<_>>()?),
        Value::Map(entries) => {
            let mut object = serde_json::Map::new();
            for (key, val) in entries {
                object.insert(json_key(key)?, to_json(val)?);
            }
            Json::Object(object)
        }
        other => return Err(EarError::conversion("JSON", describe(other))),
    };
    Ok(json)
}

fn json_key(key: &Value) -> EarResult<String> {
    match key {
        Value::Text(s) => Ok(s.clone()),
        Value::Integer(i) => Ok(i128::from(*i).to_string()),
        other => Err(EarError::conversion("JSON object key", describe(other))),
    }
}

/// Converts parsed JSON into a value tree with text map keys.
pub fn from_json(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Integer(u.into())
            } else {
                n.as_f64().map_or(Value::Null, Value::Float)
            }
        }
        Json::String(s) => Value::Text(s.clone()),
        Json::Array(items) => Value::Array(items.iter().map(from_json).collect()),
        Json::Object(object) => Value::Map(
            object
                .iter()
                .map(|(key, val)| (Value::Text(key.clone()), from_json(val)))
                .collect(),
        ),
    }
}

/// Serializes a value tree to CBOR bytes, keeping map entry order.
pub fn to_cbor(value: &Value) -> EarResult<Vec<u8>> {
    let mut buffer = Vec::new();
    coset::cbor::ser::into_writer(value, &mut buffer)
        .map_err(|e| EarError::Cbor(format!("{e:?}")))?;
    Ok(buffer)
}

pub fn from_cbor(bytes: &[u8]) -> EarResult<Value> {
    coset::cbor::de::from_reader(bytes).map_err(|e| EarError::Cbor(format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_conversion() {
        let value = Value::Map(vec![
            (Value::Text("name".into()), Value::Text("acme".into())),
            (Value::Text("count".into()), Value::Integer(3.into())),
            (
                Value::Text("nested".into()),
                Value::Map(vec![(Value::Integer(7.into()), Value::Bool(true))]),
            ),
        ]);
        let json = to_json(&value).unwrap();
        assert_eq!(
            json,
            json!({"name": "acme", "count": 3, "nested": {"7": true}})
        );
    }

    #[test]
    fn test_json_rejects_bytes() {
        let value = Value::Bytes(vec![1, 2, 3]);
        assert!(matches!(
            to_json(&value),
            Err(EarError::Conversion { target: "JSON", .. })
        ));
    }

    #[test]
    fn test_from_json_keeps_numbers_integral() {
        let value = from_json(&json!({"iat": 1234567890, "ratio": 0.5, "big": u64::MAX}));
        let Value::Map(entries) = value else {
            panic!("expected map");
        };
        let find = |name: &str| {
            entries
                .iter()
                .find(|(k, _)| *k == Value::Text(name.into()))
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(find("iat"), Value::Integer(1234567890.into()));
        assert_eq!(find("ratio"), Value::Float(0.5));
        assert_eq!(find("big"), Value::Integer(u64::MAX.into()));
    }

    #[test]
    fn test_cbor_bytes() {
        let value = Value::Map(vec![
            (Value::Integer(265.into()), Value::Text("p".into())),
            (Value::Integer(6.into()), Value::Integer(1.into())),
        ]);
        let bytes = to_cbor(&value).unwrap();
        // map(2), 265 => "p", 6 => 1
        assert_eq!(bytes, vec![0xa2, 0x19, 0x01, 0x09, 0x61, 0x70, 0x06, 0x01]);
        assert_eq!(from_cbor(&bytes).unwrap(), value);
    }

    #[test]
    fn test_cbor_malformed() {
        assert!(matches!(from_cbor(&[0xa2, 0x19]), Err(EarError::Cbor(_))));
    }
}
