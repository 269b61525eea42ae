//! # fed-signature-verification
//!
//! Block-proof verification for Federation-Chain.
//!
//! Every block is authorized by one aggregate signature (`proof` in the
//! header) over the signing digest, checked against the federation key
//! active immediately before the block. Two schemes are interchangeable on
//! the wire and the proof length decides which one applies:
//!
//! - **Schnorr** (BIP340): fixed 64-byte proof,
//! - **ECDSA**: DER-encoded proof, variable length.
//!
//! There is no negotiation and no retry: a proof that fails to parse or to
//! verify rejects the block, full stop.
//!
//! ## Architecture
//!
//! The scheme modules under [`domain`] are pure (no I/O, no shared state).
//! [`service::ProofVerifier`] dispatches between them; [`signing`] holds
//! the producer-side counterparts used by federation signers and tests.

pub mod domain;
pub mod service;
pub mod signing;

pub use domain::errors::SignatureError;
pub use service::{ProofVerifier, SignatureScheme, SCHNORR_PROOF_LEN};
pub use signing::{EcdsaSigner, SchnorrSigner};
