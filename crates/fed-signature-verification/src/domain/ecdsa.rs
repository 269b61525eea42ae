//! # ECDSA Verification (secp256k1)
//!
//! The legacy block-proof scheme: a DER-encoded ECDSA signature over the
//! signing digest, verified against the full compressed aggregate key.

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{Signature, VerifyingKey};
use shared_types::{AggPubKey, Hash};

use super::errors::SignatureError;

/// Verify a DER-encoded ECDSA proof over `digest` under `key`.
pub fn verify_ecdsa(digest: &Hash, proof: &[u8], key: &AggPubKey) -> Result<(), SignatureError> {
    let verifying_key =
        VerifyingKey::from_sec1_bytes(&key.0).map_err(|_| SignatureError::InvalidPublicKey)?;

    let signature = Signature::from_der(proof).map_err(|_| SignatureError::MalformedProof)?;

    verifying_key
        .verify_prehash(digest, &signature)
        .map_err(|_| SignatureError::VerificationFailed)
}
