// Licensed under the Apache-2.0 license

//! EAT Attestation Result (EAR) codec.
//!
//! An [`AttestationResult`] is encoded into one of two interchangeable forms:
//! a string-keyed map for JSON and JWT, and an integer-keyed map for CBOR and
//! COSE_Sign1. Each record declares a [`KeyTable`] pairing every field with
//! both keys, and the generic [`codec`] walks those tables recursively.
//!
//! ```
//! use ear_codec::claim::{Dimension, TRUSTWORTHY_INSTANCE};
//! use ear_codec::{AttestationResult, Record, Submod, TrustTier, TrustVector, Validate, VerifierID};
//!
//! let result = AttestationResult::new("test_profile", 1234567890, VerifierID::new("Acme Inc.", "v1"))
//!     .with_submod(
//!         "submod1",
//!         Submod::new(
//!             TrustVector::default().with(Dimension::InstanceIdentity, TRUSTWORTHY_INSTANCE),
//!             TrustTier::Affirming,
//!         ),
//!     );
//! result.validate().unwrap();
//!
//! let bytes = result.to_cbor().unwrap();
//! assert_eq!(AttestationResult::from_cbor(&bytes).unwrap(), result);
//! ```

pub mod codec;
pub mod config;
pub mod cose;
pub mod error;
pub mod jwt;
pub mod keys;
pub mod result;
pub mod submod;
pub mod trust;
pub mod validate;
pub mod verifier_id;
pub mod wire;

pub use trust::claim;

pub use codec::{decode, encode, Decoder, Record};
pub use config::SigningConfig;
pub use error::{EarError, EarResult};
pub use keys::{FieldKind, KeyMapping, KeyMode, KeyTable};
pub use result::AttestationResult;
pub use submod::Submod;
pub use trust::claim::{Dimension, TrustClaim};
pub use trust::tier::TrustTier;
pub use trust::vector::TrustVector;
pub use validate::Validate;
pub use verifier_id::VerifierID;
