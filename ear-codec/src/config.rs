// Licensed under the Apache-2.0 license

//! Token signing settings.
//!
//! [`SigningConfig`] carries the algorithm, expiration and clock leeway used
//! by the JWT and COSE adapters. Every field has a default, so a TOML
//! document only needs the values it overrides:
//!
//! ```toml
//! algorithm = "HS384"
//! expiration_minutes = 15
//! ```

use jsonwebtoken::Algorithm;
use serde::Deserialize;

use crate::error::EarResult;

pub const DEFAULT_ALGORITHM: Algorithm = Algorithm::HS256;
pub const DEFAULT_EXPIRATION_MINUTES: i64 = 60;
pub const DEFAULT_LEEWAY_SECONDS: u64 = 0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SigningConfig {
    /// JWT signature algorithm. COSE tokens are always ES384.
    pub algorithm: Algorithm,

    /// Lifetime of a signed token. Written into the `exp` claim.
    pub expiration_minutes: i64,

    /// Clock skew tolerated when checking `exp` during verification.
    pub leeway_seconds: u64,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            algorithm: DEFAULT_ALGORITHM,
            expiration_minutes: DEFAULT_EXPIRATION_MINUTES,
            leeway_seconds: DEFAULT_LEEWAY_SECONDS,
        }
    }
}

impl SigningConfig {
    pub fn from_toml(text: &str) -> EarResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_expiration_minutes(mut self, minutes: i64) -> Self {
        self.expiration_minutes = minutes;
        self
    }

    pub fn with_leeway_seconds(mut self, seconds: u64) -> Self {
        self.leeway_seconds = seconds;
        self
    }

    /// `exp` value for a token issued at `now` (seconds since the epoch).
    pub fn expiry_from(&self, now: i64) -> i64 {
        now.saturating_add(self.expiration_minutes.saturating_mul(60))
    }
}
