// Licensed under the Apache-2.0 license

//! JWT signing adapter.
//!
//! The token payload is the string-keyed JSON form of an
//! [`AttestationResult`] plus an `exp` claim. Any failure while verifying,
//! including a malformed payload, is reported as [`EarError::Decoding`].

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use log::{debug, warn};
use rand::RngCore;
use serde_json::Value as Json;

use crate::codec::Record;
use crate::config::SigningConfig;
use crate::error::{EarError, EarResult};
use crate::keys::KeyMode;
use crate::result::AttestationResult;
use crate::wire;

const SECRET_KEY_SIZE: usize = 32;

/// Signs `result`, expiring `config.expiration_minutes` from now.
pub fn sign(
    result: &AttestationResult,
    key: &EncodingKey,
    config: &SigningConfig,
) -> EarResult<String> {
    sign_at(result, key, config, Utc::now().timestamp())
}

/// Signs `result` as if issued at `now` (seconds since the epoch).
pub fn sign_at(
    result: &AttestationResult,
    key: &EncodingKey,
    config: &SigningConfig,
    now: i64,
) -> EarResult<String> {
    let Json::Object(mut claims) = wire::to_json(&result.to_map(KeyMode::Str))? else {
        return Err(EarError::Signing("payload is not a JSON object".to_string()));
    };
    let exp = config.expiry_from(now);
    claims.insert("exp".to_string(), Json::from(exp));

    debug!(
        "signing attestation result for profile {} with {:?}, exp {}",
        result.profile, config.algorithm, exp
    );
    jsonwebtoken::encode(&Header::new(config.algorithm), &Json::Object(claims), key)
        .map_err(|e| EarError::Signing(e.to_string()))
}

/// Verifies the signature and `exp` of `token`, then decodes its payload.
pub fn verify_and_decode(
    token: &str,
    key: &DecodingKey,
    config: &SigningConfig,
) -> EarResult<AttestationResult> {
    let mut validation = Validation::new(config.algorithm);
    validation.leeway = config.leeway_seconds;

    let data = jsonwebtoken::decode::<Json>(token, key, &validation).map_err(|e| {
        warn!("JWT verification failed: {e}");
        EarError::decoding(e)
    })?;

    AttestationResult::from_map(&wire::from_json(&data.claims), KeyMode::Str)
        .map_err(EarError::decoding)
}

/// Random HMAC secret, hex encoded.
pub fn generate_secret_key() -> String {
    let mut secret = [0u8; SECRET_KEY_SIZE];
    rand::thread_rng().fill_bytes(&mut secret);
    hex::encode(secret)
}

impl AttestationResult {
    /// Signs with an HMAC `secret` using `config.algorithm`.
    pub fn sign_jwt(&self, secret: &[u8], config: &SigningConfig) -> EarResult<String> {
        sign(self, &EncodingKey::from_secret(secret), config)
    }

    pub fn from_jwt(token: &str, secret: &[u8], config: &SigningConfig) -> EarResult<Self> {
        verify_and_decode(token, &DecodingKey::from_secret(secret), config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::*;
    use crate::submod::Submod;
    use crate::trust::tier::TrustTier;
    use crate::trust::vector::TrustVector;
    use crate::verifier_id::VerifierID;
    use jsonwebtoken::Algorithm;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn sample() -> AttestationResult {
        AttestationResult::new("test_profile", 1234567890, VerifierID::new("Acme Inc.", "v1"))
            .with_submod(
                "submod1",
                Submod::new(
                    TrustVector::default().with(Dimension::InstanceIdentity, UNRECOGNIZED_INSTANCE),
                    TrustTier::Affirming,
                ),
            )
            .with_submod(
                "submod2",
                Submod::new(
                    TrustVector::default().with(Dimension::InstanceIdentity, TRUSTWORTHY_INSTANCE),
                    TrustTier::Contraindicated,
                ),
            )
    }

    #[test]
    fn test_payload_carries_exp() {
        let config = SigningConfig::default();
        let now = Utc::now().timestamp();
        let token = sign_at(&sample(), &EncodingKey::from_secret(SECRET), &config, now).unwrap();

        let data = jsonwebtoken::decode::<Json>(
            &token,
            &DecodingKey::from_secret(SECRET),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        assert_eq!(data.header.alg, Algorithm::HS256);
        assert_eq!(data.claims["exp"], Json::from(now + 3600));
        assert_eq!(data.claims["eat_profile"], Json::from("test_profile"));
        assert_eq!(data.claims["submods"]["submod2"]["ear.status"], Json::from(96));
    }

    #[test]
    fn test_sign_and_verify() {
        let config = SigningConfig::default();
        let token = sample().sign_jwt(SECRET, &config).unwrap();
        assert_eq!(AttestationResult::from_jwt(&token, SECRET, &config).unwrap(), sample());
    }

    #[test]
    fn test_configured_algorithm() {
        let config = SigningConfig::default().with_algorithm(Algorithm::HS512);
        let token = sample().sign_jwt(SECRET, &config).unwrap();
        assert_eq!(AttestationResult::from_jwt(&token, SECRET, &config).unwrap(), sample());

        // verifier expecting a different algorithm
        assert!(matches!(
            AttestationResult::from_jwt(&token, SECRET, &SigningConfig::default()),
            Err(EarError::Decoding(_))
        ));
    }

    #[test]
    fn test_wrong_secret() {
        let config = SigningConfig::default();
        let token = sample().sign_jwt(SECRET, &config).unwrap();
        assert!(matches!(
            AttestationResult::from_jwt(&token, b"another secret", &config),
            Err(EarError::Decoding(_))
        ));
    }

    #[test]
    fn test_generate_secret_key() {
        let key = generate_secret_key();
        assert_eq!(key.len(), SECRET_KEY_SIZE * 2);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(key, generate_secret_key());
    }
}
