// Licensed under the Apache-2.0 license

//! COSE_Sign1 signing adapter.
//!
//! The payload is the integer-keyed CBOR form of an [`AttestationResult`]
//! with the CWT `exp` claim (label 4) appended, signed with ES384.

use chrono::Utc;
use coset::{
    cbor::value::Value, iana, CborSerializable, CoseSign1, CoseSign1Builder, HeaderBuilder,
    RegisteredLabelWithPrivate,
};
use log::{debug, warn};
use p384::ecdsa::signature::{Signer, Verifier};
use p384::ecdsa::{Signature, SigningKey, VerifyingKey};

use crate::codec::Record;
use crate::config::SigningConfig;
use crate::error::{EarError, EarResult};
use crate::keys::KeyMode;
use crate::result::AttestationResult;
use crate::wire;

/// CWT expiration time claim
const CWT_CLAIM_EXP: i64 = 4;

/// Signs `result`, expiring `config.expiration_minutes` from now.
pub fn sign_cose(
    result: &AttestationResult,
    key: &SigningKey,
    config: &SigningConfig,
) -> EarResult<Vec<u8>> {
    sign_cose_at(result, key, config, Utc::now().timestamp())
}

/// Signs `result` as if issued at `now` (seconds since the epoch).
pub fn sign_cose_at(
    result: &AttestationResult,
    key: &SigningKey,
    config: &SigningConfig,
    now: i64,
) -> EarResult<Vec<u8>> {
    let Value::Map(mut claims) = result.to_map(KeyMode::Int) else {
        return Err(EarError::Signing("payload is not a CBOR map".to_string()));
    };
    let exp = config.expiry_from(now);
    claims.push((
        Value::Integer(CWT_CLAIM_EXP.into()),
        Value::Integer(exp.into()),
    ));
    let payload = wire::to_cbor(&Value::Map(claims))?;

    let protected = HeaderBuilder::new()
        .algorithm(iana::Algorithm::ES384)
        .content_format(iana::CoapContentFormat::Cbor)
        .build();

    debug!(
        "signing COSE attestation result for profile {}, exp {}",
        result.profile, exp
    );
    let sign1 = CoseSign1Builder::new()
        .protected(protected)
        .payload(payload)
        .create_signature(b"", |tbs| {
            let signature: Signature = key.sign(tbs);
            signature.to_bytes().to_vec()
        })
        .build();

    Ok(sign1.to_vec()?)
}

/// Verifies an ES384 COSE_Sign1 and its `exp`, then decodes the payload.
pub fn verify_cose(
    token: &[u8],
    key: &VerifyingKey,
    config: &SigningConfig,
) -> EarResult<AttestationResult> {
    verify_cose_at(token, key, config, Utc::now().timestamp()).map_err(|e| {
        warn!("COSE verification failed: {e}");
        EarError::decoding(e)
    })
}

fn verify_cose_at(
    token: &[u8],
    key: &VerifyingKey,
    config: &SigningConfig,
    now: i64,
) -> EarResult<AttestationResult> {
    let sign1 = CoseSign1::from_slice(token)?;

    if sign1.protected.header.alg != Some(RegisteredLabelWithPrivate::Assigned(iana::Algorithm::ES384))
    {
        return Err(EarError::decoding("COSE_Sign1 algorithm is not ES384"));
    }

    sign1.verify_signature(b"", |signature, tbs| {
        let signature = Signature::from_slice(signature).map_err(EarError::decoding)?;
        key.verify(tbs, &signature).map_err(EarError::decoding)
    })?;

    let payload = sign1
        .payload
        .as_deref()
        .ok_or_else(|| EarError::decoding("COSE_Sign1 has no payload"))?;
    let claims = wire::from_cbor(payload)?;

    let exp = expiry(&claims)?;
    if exp.saturating_add(config.leeway_seconds as i64) < now {
        return Err(EarError::decoding("token expired"));
    }

    AttestationResult::from_map(&claims, KeyMode::Int)
}

fn expiry(claims: &Value) -> EarResult<i64> {
    let Value::Map(entries) = claims else {
        return Err(EarError::decoding("payload is not a CBOR map"));
    };
    let exp_key = Value::Integer(CWT_CLAIM_EXP.into());
    match entries.iter().find(|(k, _)| *k == exp_key) {
        Some((_, Value::Integer(exp))) => {
            i64::try_from(*exp).map_err(|_| EarError::decoding("exp out of range"))
        }
        Some(_) => Err(EarError::decoding("exp is not an integer")),
        None => Err(EarError::decoding("missing exp claim")),
    }
}
