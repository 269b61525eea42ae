//! # Block Signing
//!
//! Producer-side counterparts to the verifier: the federation's signing
//! tooling uses these to authorize blocks, and the test suites use them to
//! mint valid chains. Verification never touches this module.

use k256::elliptic_curve::rand_core::CryptoRngCore;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use shared_types::{AggPubKey, Hash};

/// Schnorr (BIP340) block signer producing fixed 64-byte proofs.
pub struct SchnorrSigner {
    signing_key: k256::schnorr::SigningKey,
}

impl SchnorrSigner {
    pub fn random(rng: &mut impl CryptoRngCore) -> Self {
        Self {
            signing_key: k256::schnorr::SigningKey::random(rng),
        }
    }

    /// The 33-byte compressed aggregate key this signer answers for.
    ///
    /// BIP340 signing keys normalize to an even-y point, so the prefix is
    /// always 0x02.
    pub fn aggregate_pubkey(&self) -> AggPubKey {
        let mut bytes = [0u8; 33];
        bytes[0] = 0x02;
        bytes[1..].copy_from_slice(&self.signing_key.verifying_key().to_bytes());
        AggPubKey(bytes)
    }

    /// Sign a block digest; the returned proof is always 64 bytes.
    pub fn sign(&self, digest: &Hash) -> Vec<u8> {
        use k256::ecdsa::signature::Signer;
        let signature: k256::schnorr::Signature = self.signing_key.sign(digest);
        signature.to_bytes().to_vec()
    }
}

/// ECDSA block signer producing DER-encoded proofs.
pub struct EcdsaSigner {
    signing_key: k256::ecdsa::SigningKey,
}

impl EcdsaSigner {
    pub fn random(rng: &mut impl CryptoRngCore) -> Self {
        Self {
            signing_key: k256::ecdsa::SigningKey::random(rng),
        }
    }

    /// The 33-byte compressed aggregate key this signer answers for.
    pub fn aggregate_pubkey(&self) -> AggPubKey {
        let point = self.signing_key.verifying_key().to_encoded_point(true);
        AggPubKey::from_slice(point.as_bytes()).expect("compressed point is 33 bytes")
    }

    /// Sign a block digest; the returned proof is DER-encoded and never
    /// 64 bytes long, so scheme inference stays unambiguous.
    pub fn sign(&self, digest: &Hash) -> Vec<u8> {
        use k256::ecdsa::signature::hazmat::PrehashSigner;
        let signature: k256::ecdsa::Signature = self
            .signing_key
            .sign_prehash(digest)
            .expect("prehash signing of a 32-byte digest cannot fail");
        signature.to_der().as_bytes().to_vec()
    }
}
