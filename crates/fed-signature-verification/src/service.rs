//! # Proof Verifier Service
//!
//! Scheme dispatch over the pure domain modules. The proof length decides
//! the scheme: exactly 64 bytes is Schnorr, anything else must parse as a
//! DER-encoded ECDSA signature. Nothing is negotiated.

use shared_types::{AggPubKey, Hash};

use crate::domain::errors::SignatureError;
use crate::domain::{ecdsa, schnorr};

/// Length of a Schnorr proof, the discriminator between the two schemes.
pub const SCHNORR_PROOF_LEN: usize = 64;

/// Which scheme authorized a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScheme {
    Schnorr,
    Ecdsa,
}

/// Stateless block-proof verifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProofVerifier;

impl ProofVerifier {
    pub fn new() -> Self {
        Self
    }

    /// Verify a proof, reporting which scheme matched.
    pub fn verify(
        &self,
        digest: &Hash,
        proof: &[u8],
        key: &AggPubKey,
    ) -> Result<SignatureScheme, SignatureError> {
        if proof.is_empty() {
            return Err(SignatureError::EmptyProof);
        }
        if proof.len() == SCHNORR_PROOF_LEN {
            let fixed: &[u8; SCHNORR_PROOF_LEN] =
                proof.try_into().expect("length checked above");
            schnorr::verify_schnorr(digest, fixed, key)?;
            Ok(SignatureScheme::Schnorr)
        } else {
            ecdsa::verify_ecdsa(digest, proof, key)?;
            Ok(SignatureScheme::Ecdsa)
        }
    }

    /// Boolean form of [`verify`](Self::verify); the failure reason is
    /// logged, not surfaced.
    pub fn verify_block_proof(&self, digest: &Hash, proof: &[u8], key: &AggPubKey) -> bool {
        match self.verify(digest, proof, key) {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(%key, proof_len = proof.len(), %err, "block proof rejected");
                false
            }
        }
    }
}
