// Licensed under the Apache-2.0 license

// Trustworthiness claims catalog
// https://www.ietf.org/archive/id/draft-ietf-rats-ar4si-08.html#section-2.3

use std::hash::{Hash, Hasher};

use coset::cbor::value::Value;
use strum_macros::{AsRefStr, EnumIter};

use crate::error::{EarError, EarResult};
use crate::validate::Validate;
use crate::wire;

/// A single coded judgment for one trust dimension.
///
/// Only `value` goes on the wire, so equality and hashing use `value` alone.
/// The descriptions are resolved again from the dimension catalog on decode.
#[derive(Debug, Clone, Copy)]
pub struct TrustClaim {
    /// Must be in range [-128, 127]
    pub value: i64,
    pub tag: &'static str,
    pub short: &'static str,
    pub long: &'static str,
}

impl PartialEq for TrustClaim {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for TrustClaim {}

impl Hash for TrustClaim {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl TrustClaim {
    /// Claim with no catalog entry, carrying only its value.
    pub const fn new(value: i64) -> Self {
        Self {
            value,
            tag: "",
            short: "",
            long: "",
        }
    }

    /// Catalog claim for `value` in `dimension`, dimension-specific claims
    /// first, then the general ones.
    pub fn lookup(dimension: Dimension, value: i64) -> Option<TrustClaim> {
        dimension
            .claims()
            .iter()
            .chain(GENERAL_CLAIMS)
            .find(|claim| claim.value == value)
            .copied()
    }

    pub fn lookup_tag(dimension: Dimension, tag: &str) -> Option<TrustClaim> {
        // earlier producers misspelled this tag
        if tag == LEGACY_UNEXPECTED_EVIDENCE_TAG {
            return Some(UNEXPECTED_EVIDENCE);
        }
        dimension
            .claims()
            .iter()
            .chain(GENERAL_CLAIMS)
            .find(|claim| claim.tag == tag)
            .copied()
    }

    /// Normalizes a raw trust vector entry for `dimension`.
    ///
    /// Integers resolve through the catalog and fall back to a bare claim.
    /// Text must name a catalog tag for the dimension.
    pub fn from_wire(dimension: Dimension, value: &Value) -> EarResult<TrustClaim> {
        match value {
            Value::Integer(i) => {
                let value = i64::try_from(*i)
                    .map_err(|_| EarError::conversion("TrustClaim", wire::describe(value)))?;
                Ok(TrustClaim::lookup(dimension, value).unwrap_or(TrustClaim::new(value)))
            }
            Value::Text(tag) => TrustClaim::lookup_tag(dimension, tag).ok_or_else(|| {
                EarError::conversion("TrustClaim", format!("unknown {} tag {tag:?}", dimension.as_ref()))
            }),
            other => Err(EarError::conversion("TrustClaim", wire::describe(other))),
        }
    }
}

impl Validate for TrustClaim {
    fn validate(&self) -> EarResult<()> {
        if !(i8::MIN as i64..=i8::MAX as i64).contains(&self.value) {
            return Err(EarError::Validation(format!(
                "Invalid value in TrustClaim: {}. Must be in range [-128, 127]",
                self.value
            )));
        }
        Ok(())
    }
}

/// The eight trust vector dimensions, in key order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Dimension {
    InstanceIdentity,
    Configuration,
    Executables,
    FileSystem,
    Hardware,
    RuntimeOpaque,
    StorageOpaque,
    SourcedData,
}

impl Dimension {
    /// Dimension-specific catalog claims
    pub fn claims(self) -> &'static [TrustClaim] {
        match self {
            Dimension::InstanceIdentity => INSTANCE_IDENTITY_CLAIMS,
            Dimension::Configuration => CONFIGURATION_CLAIMS,
            Dimension::Executables => EXECUTABLES_CLAIMS,
            Dimension::FileSystem => FILE_SYSTEM_CLAIMS,
            Dimension::Hardware => HARDWARE_CLAIMS,
            Dimension::RuntimeOpaque => RUNTIME_OPAQUE_CLAIMS,
            Dimension::StorageOpaque => STORAGE_OPAQUE_CLAIMS,
            Dimension::SourcedData => SOURCED_DATA_CLAIMS,
        }
    }
}

const LEGACY_UNEXPECTED_EVIDENCE_TAG: &str = "unexected_evidence";

// General
pub const VERIFIER_MALFUNCTION: TrustClaim = TrustClaim {
    value: -1,
    tag: "verifier_malfunction",
    short: "verifier malfunction",
    long: "A verifier malfunction occurred during the Verifier's appraisal processing.",
};
pub const NO_CLAIM: TrustClaim = TrustClaim {
    value: 0,
    tag: "no_claim",
    short: "no claim being made",
    long: "The Evidence received is insufficient to make a conclusion.",
};
pub const UNEXPECTED_EVIDENCE: TrustClaim = TrustClaim {
    value: 1,
    tag: "unexpected_evidence",
    short: "unexpected evidence",
    long: "The Evidence received contains unexpected elements which the Verifier is unable to parse.",
};
pub const CRYPTO_VALIDATION_FAILED: TrustClaim = TrustClaim {
    value: 99,
    tag: "crypto_failed",
    short: "cryptographic validation failed",
    long: "Cryptographic validation of the Evidence has failed.",
};

// Instance identity
pub const TRUSTWORTHY_INSTANCE: TrustClaim = TrustClaim {
    value: 2,
    tag: "recognized_instance",
    short: "recognized and not compromised",
    long: "The Attesting Environment is recognized, and the associated instance of the Attester is not known to be compromised.",
};
pub const UNTRUSTWORTHY_INSTANCE: TrustClaim = TrustClaim {
    value: 96,
    tag: "untrustworthy_instance",
    short: "recognized but not trustworthy",
    long: "The Attesting Environment is recognized, but its unique private key indicates a device which is not trustworthy.",
};
pub const UNRECOGNIZED_INSTANCE: TrustClaim = TrustClaim {
    value: 97,
    tag: "unrecognized_instance",
    short: "not recognized",
    long: "The Attesting Environment is not recognized; however the Verifier believes it should be.",
};

// Configuration
pub const APPROVED_CONFIG: TrustClaim = TrustClaim {
    value: 2,
    tag: "approved_config",
    short: "all recognized and approved",
    long: "The configuration is a known and approved config.",
};
pub const NO_CONFIG_VULNS: TrustClaim = TrustClaim {
    value: 3,
    tag: "safe_config",
    short: "no known vulnerabilities",
    long: "The configuration includes or exposes no known vulnerabilities",
};
pub const UNSAFE_CONFIG: TrustClaim = TrustClaim {
    value: 32,
    tag: "unsafe_config",
    short: "known vulnerabilities",
    long: "The configuration includes or exposes known vulnerabilities.",
};
pub const UNSUPPORTABLE_CONFIG: TrustClaim = TrustClaim {
    value: 96,
    tag: "unsupportable_config",
    short: "unacceptable security vulnerabilities",
    long: "The configuration is unsupportable as it exposes unacceptable security vulnerabilities",
};

// Executables
pub const APPROVED_RUNTIME: TrustClaim = TrustClaim {
    value: 2,
    tag: "approved_rt",
    short: "recognized and approved boot- and run-time",
    long: "Only a recognized genuine set of approved executables, scripts, files, and/or objects have been loaded during and after the boot process.",
};
pub const APPROVED_BOOT: TrustClaim = TrustClaim {
    value: 3,
    tag: "approved_boot",
    short: "recognized and approved boot-time",
    long: "Only a recognized genuine set of approved executables have been loaded during the boot process.",
};
pub const UNSAFE_RUNTIME: TrustClaim = TrustClaim {
    value: 32,
    tag: "unsafe_rt",
    short: "recognized but known bugs or vulnerabilities",
    long: "Only a recognized genuine set of executables, scripts, files, and/or objects have been loaded. However the Verifier cannot vouch for a subset of these due to known bugs or other known vulnerabilities.",
};
pub const UNRECOGNIZED_RUNTIME: TrustClaim = TrustClaim {
    value: 33,
    tag: "unrecognized_rt",
    short: "unrecognized run-time",
    long: "Runtime memory includes executables, scripts, files, and/or objects which are not recognized.",
};
pub const CONTRAINDICATED_RUNTIME: TrustClaim = TrustClaim {
    value: 96,
    tag: "contraindicated_rt",
    short: "contraindicated run-time",
    long: "Runtime memory includes executables, scripts, files, and/or object which are contraindicated.",
};

// File system
pub const APPROVED_FILES: TrustClaim = TrustClaim {
    value: 2,
    tag: "approved_fs",
    short: "all recognized and approved",
    long: "Only a recognized set of approved files are found.",
};
pub const UNRECOGNIZED_FILES: TrustClaim = TrustClaim {
    value: 32,
    tag: "unrecognized_fs",
    short: "unrecognized item(s) found",
    long: "The file system includes unrecognized executables, scripts, or files.",
};
pub const CONTRAINDICATED_FILES: TrustClaim = TrustClaim {
    value: 96,
    tag: "contraindicated_fs",
    short: "contraindicated item(s) found",
    long: "The file system includes contraindicated executables, scripts, or files.",
};

// Hardware
pub const GENUINE_HARDWARE: TrustClaim = TrustClaim {
    value: 2,
    tag: "genuine_hw",
    short: "genuine",
    long: "An Attester has passed its hardware and/or firmware verifications needed to demonstrate that these are genuine/supported.",
};
pub const UNSAFE_HARDWARE: TrustClaim = TrustClaim {
    value: 32,
    tag: "unsafe_hw",
    short: "genuine but known bugs or vulnerabilities",
    long: "An Attester contains only genuine/supported hardware and/or firmware, but there are known security vulnerabilities.",
};
pub const CONTRAINDICATED_HARDWARE: TrustClaim = TrustClaim {
    value: 96,
    tag: "contraindicated_hw",
    short: "genuine but contraindicated",
    long: "Attester hardware and/or firmware is recognized, but its trustworthiness is contraindicated.",
};
pub const UNRECOGNIZED_HARDWARE: TrustClaim = TrustClaim {
    value: 97,
    tag: "unrecognized_hw",
    short: "unrecognized",
    long: "A Verifier does not recognize an Attester's hardware or firmware, but it should be recognized.",
};

// Runtime opaque
pub const ENCRYPTED_MEMORY_RUNTIME: TrustClaim = TrustClaim {
    value: 2,
    tag: "encrypted_rt",
    short: "memory encryption",
    long: "the Attester's executing Target Environment and Attesting Environments are encrypted and within Trusted Execution Environment(s) opaque to the operating system, virtual machine manager, and peer applications.",
};
pub const ISOLATED_MEMORY_RUNTIME: TrustClaim = TrustClaim {
    value: 32,
    tag: "isolated_rt",
    short: "memory isolation",
    long: "the Attester's executing Target Environment and Attesting Environments are inaccessible from any other parallel application or Guest VM running on the Attester's physical device.",
};
pub const VISIBLE_MEMORY_RUNTIME: TrustClaim = TrustClaim {
    value: 96,
    tag: "visible_rt",
    short: "visible",
    long: "The Verifier has concluded that in memory objects are unacceptably visible within the physical host that supports the Attester.",
};

// Storage opaque
pub const HW_KEYS_ENCRYPTED_SECRETS: TrustClaim = TrustClaim {
    value: 2,
    tag: "hw_encrypted_secrets",
    short: "encrypted secrets with HW-backed keys",
    long: "the Attester encrypts all secrets in persistent storage via using keys which are never visible outside an HSM or the Trusted Execution Environment hardware.",
};
pub const SW_KEYS_ENCRYPTED_SECRETS: TrustClaim = TrustClaim {
    value: 32,
    tag: "sw_encrypted_secrets",
    short: "encrypted secrets with non HW-backed keys",
    long: "the Attester encrypts all persistently stored secrets, but without using hardware backed keys.",
};
pub const UNENCRYPTED_SECRETS: TrustClaim = TrustClaim {
    value: 96,
    tag: "unencrypted_secrets",
    short: "unencrypted secrets",
    long: "There are persistent secrets which are stored unencrypted in an Attester.",
};

// Sourced data
pub const TRUSTED_SOURCES: TrustClaim = TrustClaim {
    value: 2,
    tag: "trusted_sources",
    short: "from attesters in the affirming tier",
    long: "All essential Attester source data objects have been provided by other Attester(s) whose most recent appraisal(s) had both no Trustworthiness Claims of \"0\" where the current Trustworthiness Claim is \"Affirming\", as well as no \"Warning\" or \"Contraindicated\" Trustworthiness Claims.",
};
pub const UNTRUSTED_SOURCES: TrustClaim = TrustClaim {
    value: 32,
    tag: "untrusted_sources",
    short: "from unattested sources or attesters in the warning tier",
    long: "Attester source data objects come from unattested sources, or attested sources with \"Warning\" type Trustworthiness Claims",
};
pub const CONTRAINDICATED_SOURCES: TrustClaim = TrustClaim {
    value: 96,
    tag: "contraindicated_sources",
    short: "from attesters in the contraindicated tier",
    long: "Attester source data objects come from contraindicated sources.",
};

pub const GENERAL_CLAIMS: &[TrustClaim] = &[
    VERIFIER_MALFUNCTION,
    NO_CLAIM,
    UNEXPECTED_EVIDENCE,
    CRYPTO_VALIDATION_FAILED,
];
const INSTANCE_IDENTITY_CLAIMS: &[TrustClaim] = &[
    TRUSTWORTHY_INSTANCE,
    UNTRUSTWORTHY_INSTANCE,
    UNRECOGNIZED_INSTANCE,
];
const CONFIGURATION_CLAIMS: &[TrustClaim] = &[
    APPROVED_CONFIG,
    NO_CONFIG_VULNS,
    UNSAFE_CONFIG,
    UNSUPPORTABLE_CONFIG,
];
const EXECUTABLES_CLAIMS: &[TrustClaim] = &[
    APPROVED_RUNTIME,
    APPROVED_BOOT,
    UNSAFE_RUNTIME,
    UNRECOGNIZED_RUNTIME,
    CONTRAINDICATED_RUNTIME,
];
const FILE_SYSTEM_CLAIMS: &[TrustClaim] =
    &[APPROVED_FILES, UNRECOGNIZED_FILES, CONTRAINDICATED_FILES];
const HARDWARE_CLAIMS: &[TrustClaim] = &[
    GENUINE_HARDWARE,
    UNSAFE_HARDWARE,
    CONTRAINDICATED_HARDWARE,
    UNRECOGNIZED_HARDWARE,
];
const RUNTIME_OPAQUE_CLAIMS: &[TrustClaim] = &[
    ENCRYPTED_MEMORY_RUNTIME,
    ISOLATED_MEMORY_RUNTIME,
    VISIBLE_MEMORY_RUNTIME,
];
const STORAGE_OPAQUE_CLAIMS: &[TrustClaim] = &[
    HW_KEYS_ENCRYPTED_SECRETS,
    SW_KEYS_ENCRYPTED_SECRETS,
    UNENCRYPTED_SECRETS,
];
const SOURCED_DATA_CLAIMS: &[TrustClaim] = &[
    TRUSTED_SOURCES,
    UNTRUSTED_SOURCES,
    CONTRAINDICATED_SOURCES,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    fn all_claims() -> impl Iterator<Item = &'static TrustClaim> {
        Dimension::iter()
            .flat_map(|dimension| dimension.claims().iter())
            .chain(GENERAL_CLAIMS)
    }

    #[test]
    fn test_catalog_claims_are_valid() {
        for claim in all_claims() {
            assert!((-128..=127).contains(&claim.value), "{}", claim.tag);
            assert!(!claim.tag.is_empty());
            assert!(!claim.short.is_empty());
            assert!(!claim.long.is_empty());
            claim.validate().unwrap();
        }
    }

    #[test]
    fn test_values_unique_within_dimension() {
        for dimension in Dimension::iter() {
            let mut seen = HashSet::new();
            for claim in dimension.claims().iter().chain(GENERAL_CLAIMS) {
                assert!(
                    seen.insert(claim.value),
                    "{} repeats value {}",
                    dimension.as_ref(),
                    claim.value
                );
            }
        }
    }

    #[test]
    fn test_out_of_range_claim_fails_validation() {
        let claim = TrustClaim {
            value: 200,
            tag: "invalid",
            short: "",
            long: "",
        };
        assert!(matches!(claim.validate(), Err(EarError::Validation(_))));
        assert!(TrustClaim::new(-129).validate().is_err());
        assert!(TrustClaim::new(-128).validate().is_ok());
        assert!(TrustClaim::new(127).validate().is_ok());
    }

    #[test]
    fn test_lookup_prefers_dimension_claims() {
        let tag = |dimension, value| TrustClaim::lookup(dimension, value).map(|c| c.tag);
        assert_eq!(tag(Dimension::Hardware, 2), Some(GENUINE_HARDWARE.tag));
        assert_eq!(tag(Dimension::Configuration, 2), Some(APPROVED_CONFIG.tag));
        assert_eq!(
            tag(Dimension::SourcedData, 99),
            Some(CRYPTO_VALIDATION_FAILED.tag)
        );
        assert_eq!(TrustClaim::lookup(Dimension::FileSystem, 3), None);
    }

    #[test]
    fn test_claim_from_wire() {
        let value = Value::Integer(97.into());
        assert_eq!(
            TrustClaim::from_wire(Dimension::InstanceIdentity, &value).unwrap().tag,
            UNRECOGNIZED_INSTANCE.tag
        );

        // unknown values are kept, without descriptions
        let value = Value::Integer(42.into());
        let claim = TrustClaim::from_wire(Dimension::Hardware, &value).unwrap();
        assert_eq!(claim, TrustClaim::new(42));
        assert_eq!(claim.tag, "");

        let value = Value::Text("unsafe_rt".into());
        assert_eq!(
            TrustClaim::from_wire(Dimension::Executables, &value).unwrap().tag,
            UNSAFE_RUNTIME.tag
        );

        let value = Value::Text("unsafe_rt".into());
        assert!(TrustClaim::from_wire(Dimension::Hardware, &value).is_err());
        assert!(TrustClaim::from_wire(Dimension::Hardware, &Value::Null).is_err());
    }

    #[test]
    fn test_legacy_unexpected_evidence_tag() {
        let value = Value::Text("unexected_evidence".into());
        for dimension in Dimension::iter() {
            let claim = TrustClaim::from_wire(dimension, &value).unwrap();
            assert_eq!(claim.tag, UNEXPECTED_EVIDENCE.tag);
            assert_eq!(claim.value, 1);
        }
        assert_eq!(
            TrustClaim::lookup_tag(Dimension::Hardware, "unexpected_evidence").map(|c| c.value),
            Some(1)
        );
    }

    #[test]
    fn test_equality_is_by_value() {
        // same value, different catalog entries
        assert_eq!(GENUINE_HARDWARE, APPROVED_CONFIG);
        assert_ne!(GENUINE_HARDWARE, UNSAFE_HARDWARE);

        let mut seen = HashSet::new();
        assert!(seen.insert(GENUINE_HARDWARE));
        assert!(!seen.insert(TrustClaim::new(2)));
    }

    #[test]
    fn test_dimension_names() {
        let names: Vec<_> = Dimension::iter().map(|d| d.as_ref().to_string()).collect();
        assert_eq!(
            names,
            vec![
                "instance-identity",
                "configuration",
                "executables",
                "file-system",
                "hardware",
                "runtime-opaque",
                "storage-opaque",
                "sourced-data",
            ]
        );
    }
}
