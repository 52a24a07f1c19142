// Licensed under the Apache-2.0 license

use coset::cbor::value::Value;

use crate::codec::{self, Decoder, Record};
use crate::error::{EarError, EarResult};
use crate::keys::{KeyMode, KeyTable};
use crate::result::ATTESTATION_RESULT_KEYS;
use crate::trust::tier::TrustTier;
use crate::trust::vector::TrustVector;
use crate::validate::Validate;

/// Appraisal of one attested component.
///
/// Both parts are optional so that a decoded submodule missing one of them is
/// reported by [`Validate`] instead of being filled with a placeholder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Submod {
    pub trust_vector: Option<TrustVector>,
    pub status: Option<TrustTier>,
}

impl Submod {
    pub fn new(trust_vector: TrustVector, status: TrustTier) -> Self {
        Self {
            trust_vector: Some(trust_vector),
            status: Some(status),
        }
    }

    /// Like [`Validate::validate`], naming the submodule in the error.
    pub fn validate_named(&self, name: &str) -> EarResult<()> {
        self.complete_vector()
            .ok_or_else(|| {
                EarError::Validation(format!(
                    "Submodule {name} must contain a valid trust_vector and status"
                ))
            })?
            .validate()
    }

    fn complete_vector(&self) -> Option<&TrustVector> {
        self.status.and(self.trust_vector.as_ref())
    }
}

impl Record for Submod {
    const NAME: &'static str = "Submod";
    // Submodule keys live under `submods.` in the attestation result table.
    const KEYS: KeyTable = KeyTable::scoped(ATTESTATION_RESULT_KEYS, "submods");

    fn encode_field(&self, field: &str, mode: KeyMode) -> Option<Value> {
        match field {
            "trust_vector" => self
                .trust_vector
                .as_ref()
                .map(|vector| codec::encode(vector, mode)),
            "status" => self.status.map(Value::from),
            _ => None,
        }
    }

    fn decode_field(&mut self, field: &str, value: &Value, decoder: &Decoder) -> EarResult<()> {
        match field {
            "trust_vector" => self.trust_vector = Some(decoder.decode(value)?),
            "status" => self.status = Some(TrustTier::try_from(value)?),
            _ => {}
        }
        Ok(())
    }
}

impl Validate for Submod {
    fn validate(&self) -> EarResult<()> {
        self.complete_vector()
            .ok_or_else(|| {
                EarError::Validation(
                    "Submodule must contain a valid trust_vector and status".to_string(),
                )
            })?
            .validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::*;

    fn int(v: i64) -> Value {
        Value::Integer(v.into())
    }

    #[test]
    fn test_submod_scoped_keys() {
        let keys: Vec<_> = Submod::KEYS
            .fields()
            .map(|(field, mapping)| (field, mapping.int_key, mapping.str_key))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("trust_vector", 1001, "ear.trustworthiness-vector"),
                ("status", 1000, "ear.status"),
            ]
        );
    }

    #[test]
    fn test_submod_int_keys() {
        let submod = Submod::new(
            TrustVector::default().with(Dimension::InstanceIdentity, UNRECOGNIZED_INSTANCE),
            TrustTier::Affirming,
        );
        assert_eq!(
            submod.to_map(KeyMode::Int),
            Value::Map(vec![
                (int(1001), Value::Map(vec![(int(0), int(97))])),
                (int(1000), int(2)),
            ])
        );
    }

    #[test]
    fn test_submod_status_normalized_on_decode() {
        let submod =
            Submod::from_json(r#"{"ear.trustworthiness-vector": {}, "ear.status": "warning"}"#)
                .unwrap();
        assert_eq!(submod.status, Some(TrustTier::Warning));

        let submod =
            Submod::from_json(r#"{"ear.trustworthiness-vector": {}, "ear.status": 7}"#).unwrap();
        assert_eq!(submod.status, Some(TrustTier::None));

        assert!(matches!(
            Submod::from_json(r#"{"ear.status": [2]}"#),
            Err(EarError::Conversion { .. })
        ));
    }

    #[test]
    fn test_submod_missing_component_fails_validation() {
        let submod = Submod::from_json(r#"{"ear.status": 2}"#).unwrap();
        assert_eq!(submod.trust_vector, None);
        let err = submod.validate_named("submod1").unwrap_err();
        assert!(err.to_string().contains("submod1"));

        let submod = Submod {
            trust_vector: Some(TrustVector::default()),
            status: None,
        };
        assert!(submod.validate().is_err());
    }

    #[test]
    fn test_submod_validates_claims() {
        let submod = Submod::new(
            TrustVector::default().with(Dimension::Hardware, TrustClaim::new(-500)),
            TrustTier::Contraindicated,
        );
        assert!(matches!(submod.validate(), Err(EarError::Validation(_))));
    }
}
