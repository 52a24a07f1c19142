// Licensed under the Apache-2.0 license

// https://www.ietf.org/archive/id/draft-ietf-rats-ar4si-08.html#section-3.3

use coset::cbor::value::Value;

use crate::codec::{self, Decoder, Record};
use crate::error::EarResult;
use crate::keys::{FieldKind, KeyMapping, KeyMode, KeyTable};
use crate::validate::{non_empty, Validate};

const VERIFIER_ID_KEYS: &[KeyMapping] = &[
    KeyMapping::new("developer", 0, "developer", FieldKind::Scalar),
    KeyMapping::new("build", 1, "build", FieldKind::Scalar),
];

const _: () = assert!(!VerifierID::KEYS.has_duplicate_keys());

/// Identifies the verifier that produced an attestation result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VerifierID {
    pub developer: String,
    pub build: String,
}

impl VerifierID {
    pub fn new(developer: impl Into<String>, build: impl Into<String>) -> Self {
        Self {
            developer: developer.into(),
            build: build.into(),
        }
    }
}

impl Record for VerifierID {
    const NAME: &'static str = "VerifierID";
    const KEYS: KeyTable = KeyTable::new(VERIFIER_ID_KEYS);

    fn encode_field(&self, field: &str, _mode: KeyMode) -> Option<Value> {
        match field {
            "developer" => Some(Value::Text(self.developer.clone())),
            "build" => Some(Value::Text(self.build.clone())),
            _ => None,
        }
    }

    fn decode_field(&mut self, field: &str, value: &Value, _decoder: &Decoder) -> EarResult<()> {
        match field {
            "developer" => self.developer = codec::text(value, "developer")?,
            "build" => self.build = codec::text(value, "build")?,
            _ => {}
        }
        Ok(())
    }
}

impl Validate for VerifierID {
    fn validate(&self) -> EarResult<()> {
        non_empty(&self.developer, "VerifierID developer")?;
        non_empty(&self.build, "VerifierID build")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EarError;

    #[test]
    fn test_verifier_id_to_json() {
        let vid = VerifierID::new("Acme Inc.", "v1");
        let json: serde_json::Value = serde_json::from_str(&vid.to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"developer": "Acme Inc.", "build": "v1"})
        );
    }

    #[test]
    fn test_verifier_id_int_keys() {
        let vid = VerifierID::new("Acme Inc.", "v1");
        assert_eq!(
            vid.to_map(KeyMode::Int),
            Value::Map(vec![
                (Value::Integer(0.into()), Value::Text("Acme Inc.".into())),
                (Value::Integer(1.into()), Value::Text("v1".into())),
            ])
        );
        assert_eq!(VerifierID::from_map(&vid.to_map(KeyMode::Int), KeyMode::Int).unwrap(), vid);
    }

    #[test]
    fn test_verifier_id_cbor_round_trip() {
        let vid = VerifierID::new("Acme Inc.", "v1");
        assert_eq!(VerifierID::from_cbor(&vid.to_cbor().unwrap()).unwrap(), vid);
    }

    #[test]
    fn test_verifier_id_partial_input() {
        let vid = VerifierID::from_json(r#"{"build": "v1"}"#).unwrap();
        assert_eq!(vid.developer, "");
        assert_eq!(vid.build, "v1");
        assert!(vid.validate().is_err());
    }

    #[test]
    fn test_verifier_id_wrong_type() {
        assert!(matches!(
            VerifierID::from_json(r#"{"developer": 7, "build": "v1"}"#),
            Err(EarError::Conversion { target: "developer", .. })
        ));
    }

    #[test]
    fn test_validate_verifier_id() {
        VerifierID::new("Acme Inc.", "v1").validate().unwrap();
        assert!(matches!(
            VerifierID::new("", "v1").validate(),
            Err(EarError::Validation(_))
        ));
        assert!(VerifierID::new("Acme Inc.", "").validate().is_err());
    }
}
