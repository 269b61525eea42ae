//! # Schnorr Verification (BIP340, secp256k1)
//!
//! The primary block-proof scheme: a fixed 64-byte signature over the
//! signing digest.
//!
//! BIP340 keys are x-only. The parity prefix of the 33-byte aggregate key
//! participates in syntactic validation only; verification uses the x
//! coordinate alone.

use k256::ecdsa::signature::Verifier;
use k256::schnorr::{Signature, VerifyingKey};
use shared_types::{AggPubKey, Hash};

use super::errors::SignatureError;

/// Verify a 64-byte Schnorr proof over `digest` under `key`.
pub fn verify_schnorr(
    digest: &Hash,
    proof: &[u8; 64],
    key: &AggPubKey,
) -> Result<(), SignatureError> {
    let verifying_key =
        VerifyingKey::from_bytes(key.x_only()).map_err(|_| SignatureError::InvalidPublicKey)?;

    let signature =
        Signature::try_from(proof.as_slice()).map_err(|_| SignatureError::MalformedProof)?;

    verifying_key
        .verify(digest, &signature)
        .map_err(|_| SignatureError::VerificationFailed)
}
