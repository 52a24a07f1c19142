// Licensed under the Apache-2.0 license

// https://www.ietf.org/archive/id/draft-ietf-rats-ar4si-08.html#section-3.2

use coset::cbor::value::Value;
use strum_macros::{AsRefStr, Display, EnumIter};

use crate::error::{EarError, EarResult};
use crate::wire;

/// Coarse overall verdict for a submodule.
///
/// Conversions from integers and strings never fail: anything that is not an
/// exact match for one of the four canonical tiers becomes [`TrustTier::None`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, AsRefStr, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum TrustTier {
    #[default]
    None = 0,
    Affirming = 2,
    Warning = 32,
    Contraindicated = 96,
}

impl TrustTier {
    pub const fn value(self) -> i64 {
        self as i64
    }

    pub fn as_str(&self) -> &str {
        self.as_ref()
    }

    pub fn from_int(value: i64) -> Self {
        match value {
            2 => TrustTier::Affirming,
            32 => TrustTier::Warning,
            96 => TrustTier::Contraindicated,
            _ => TrustTier::None,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "affirming" => TrustTier::Affirming,
            "warning" => TrustTier::Warning,
            "contraindicated" => TrustTier::Contraindicated,
            _ => TrustTier::None,
        }
    }
}

impl From<i64> for TrustTier {
    fn from(value: i64) -> Self {
        TrustTier::from_int(value)
    }
}

impl From<&str> for TrustTier {
    fn from(name: &str) -> Self {
        TrustTier::from_name(name)
    }
}

impl From<TrustTier> for Value {
    fn from(tier: TrustTier) -> Self {
        Value::Integer(tier.value().into())
    }
}

impl TryFrom<&Value> for TrustTier {
    type Error = EarError;

    /// Normalizes a raw `ear.status` wire value.
    fn try_from(value: &Value) -> EarResult<Self> {
        match value {
            // outside i64 can never be canonical
            Value::Integer(i) => Ok(i64::try_from(*i).map_or(TrustTier::None, TrustTier::from_int)),
            Value::Text(name) => Ok(TrustTier::from_name(name)),
            other => Err(EarError::conversion("TrustTier", wire::describe(other))),
        }
    }
}
