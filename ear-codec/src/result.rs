// Licensed under the Apache-2.0 license

// https://datatracker.ietf.org/doc/draft-fv-rats-ear/

use std::collections::BTreeMap;

use coset::cbor::value::Value;

use crate::codec::{self, Decoder, Record};
use crate::error::{EarError, EarResult};
use crate::keys::{FieldKind, KeyMapping, KeyMode, KeyTable};
use crate::submod::Submod;
use crate::validate::{non_empty, Validate};
use crate::verifier_id::VerifierID;

// Keys 265 and 6 are the EAT profile and CWT iat claims.
// https://www.ietf.org/archive/id/draft-ietf-rats-eat-31.html#section-7.2.4
pub(crate) const ATTESTATION_RESULT_KEYS: &[KeyMapping] = &[
    KeyMapping::new("profile", 265, "eat_profile", FieldKind::Scalar),
    KeyMapping::new("issued_at", 6, "iat", FieldKind::Scalar),
    KeyMapping::new("verifier_id", 1004, "ear.verifier-id", FieldKind::Record),
    KeyMapping::new("submods", 266, "submods", FieldKind::RecordMap),
    KeyMapping::new(
        "submods.trust_vector",
        1001,
        "ear.trustworthiness-vector",
        FieldKind::Record,
    ),
    KeyMapping::new("submods.status", 1000, "ear.status", FieldKind::EnumLike),
];

const _: () = assert!(!AttestationResult::KEYS.has_duplicate_keys());

/// EAT Attestation Result: the verifier's signed summary of an attester.
///
/// `Default` yields an empty profile, a zero `issued_at` and no submodules,
/// all of which [`Validate`] rejects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttestationResult {
    pub profile: String,
    pub issued_at: i64,
    pub verifier_id: VerifierID,
    pub submods: BTreeMap<String, Submod>,
}

impl AttestationResult {
    pub fn new(profile: impl Into<String>, issued_at: i64, verifier_id: VerifierID) -> Self {
        Self {
            profile: profile.into(),
            issued_at,
            verifier_id,
            submods: BTreeMap::new(),
        }
    }

    /// Builder form for adding a named submodule.
    pub fn with_submod(mut self, name: impl Into<String>, submod: Submod) -> Self {
        self.submods.insert(name.into(), submod);
        self
    }
}

impl Record for AttestationResult {
    const NAME: &'static str = "AttestationResult";
    const KEYS: KeyTable = KeyTable::new(ATTESTATION_RESULT_KEYS);

    fn encode_field(&self, field: &str, mode: KeyMode) -> Option<Value> {
        match field {
            "profile" => Some(Value::Text(self.profile.clone())),
            "issued_at" => Some(Value::Integer(self.issued_at.into())),
            "verifier_id" => Some(codec::encode(&self.verifier_id, mode)),
            "submods" => Some(codec::encode_records(&self.submods, mode)),
            _ => None,
        }
    }

    fn decode_field(&mut self, field: &str, value: &Value, decoder: &Decoder) -> EarResult<()> {
        match field {
            "profile" => self.profile = codec::text(value, "profile")?,
            "issued_at" => self.issued_at = codec::integer(value, "issued_at")?,
            "verifier_id" => self.verifier_id = decoder.decode(value)?,
            "submods" => self.submods = decoder.decode_records(value)?,
            _ => {}
        }
        Ok(())
    }
}

impl Validate for AttestationResult {
    fn validate(&self) -> EarResult<()> {
        non_empty(&self.profile, "AttestationResult profile")?;
        if self.issued_at <= 0 {
            return Err(EarError::Validation(
                "AttestationResult issued_at must be a positive integer".to_string(),
            ));
        }

        self.verifier_id.validate()?;

        for (name, submod) in &self.submods {
            submod.validate_named(name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::*;
    use crate::trust::tier::TrustTier;
    use crate::trust::vector::TrustVector;
    use serde_json::json;

    fn sample() -> AttestationResult {
        AttestationResult::new(
            "test_profile",
            1234567890,
            VerifierID::new("Acme Inc.", "v1"),
        )
        .with_submod(
            "submod1",
            Submod::new(
                TrustVector::default().with(Dimension::InstanceIdentity, TRUSTWORTHY_INSTANCE),
                TrustTier::Affirming,
            ),
        )
    }

    #[test]
    fn test_top_level_keys() {
        let Value::Map(entries) = sample().to_map(KeyMode::Int) else {
            panic!("expected map");
        };
        let keys: Vec<_> = entries.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(
            keys,
            [265, 6, 1004, 266]
                .iter()
                .map(|k| Value::Integer((*k as i64).into()))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_json_form() {
        let json: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            json!({
                "eat_profile": "test_profile",
                "iat": 1234567890,
                "ear.verifier-id": {"developer": "Acme Inc.", "build": "v1"},
                "submods": {
                    "submod1": {
                        "ear.trustworthiness-vector": {"instance-identity": 2},
                        "ear.status": 2
                    }
                }
            })
        );
    }

    #[test]
    fn test_validate() {
        sample().validate().unwrap();

        let mut result = sample();
        result.profile.clear();
        assert!(matches!(result.validate(), Err(EarError::Validation(_))));

        let mut result = sample();
        result.issued_at = 0;
        assert!(result.validate().is_err());

        let mut result = sample();
        result.verifier_id.build.clear();
        assert!(result.validate().is_err());

        let result = sample().with_submod("broken", Submod::default());
        let err = result.validate().unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_default_is_not_valid() {
        assert!(AttestationResult::default().validate().is_err());
    }
}
