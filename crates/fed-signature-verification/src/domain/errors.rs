//! # Signature Errors

use thiserror::Error;

/// Errors raised while checking a block proof.
///
/// Every variant is a hard rejection of the candidate block; none of them
/// is retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// The proof bytes parse under neither scheme.
    #[error("proof is not a valid Schnorr or DER-encoded ECDSA signature")]
    MalformedProof,

    /// The aggregate key bytes do not name a point on the curve.
    #[error("aggregate public key is not a valid curve point")]
    InvalidPublicKey,

    /// The proof parsed but does not match the digest under the key.
    #[error("proof verification failed")]
    VerificationFailed,

    /// An empty proof, e.g. a block that was never signed.
    #[error("empty proof")]
    EmptyProof,
}
