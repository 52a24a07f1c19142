// Licensed under the Apache-2.0 license

use thiserror::Error;

use crate::keys::KeyMode;

/// Errors that can occur when encoding, decoding or signing attestation results
#[derive(Error, Debug)]
pub enum EarError {
    /// A field violates its invariant (range, non-empty, missing component)
    #[error("validation failed: {0}")]
    Validation(String),

    /// A wire value has a type that cannot be normalized into `target`
    #[error("cannot convert {found} to {target}")]
    Conversion { target: &'static str, found: String },

    /// Strict decoding found a key of the other key mode
    #[error("{record} contains a key that is not in {expected:?} key mode")]
    KeyModeMismatch {
        record: &'static str,
        expected: KeyMode,
    },

    /// Signature, expiry or payload failure while verifying a token
    #[error("token decoding failed: {0}")]
    Decoding(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CBOR error: {0}")]
    Cbor(String),

    /// COSE parsing or serialization error
    #[error("COSE error: {0:?}")]
    Cose(coset::CoseError),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl EarError {
    pub(crate) fn conversion(target: &'static str, found: impl Into<String>) -> Self {
        EarError::Conversion {
            target,
            found: found.into(),
        }
    }

    pub(crate) fn decoding(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        EarError::Decoding(cause.into())
    }
}

impl From<coset::CoseError> for EarError {
    fn from(err: coset::CoseError) -> Self {
        EarError::Cose(err)
    }
}

/// Result type for EAR operations
pub type EarResult<T> = std::result::Result<T, EarError>;
