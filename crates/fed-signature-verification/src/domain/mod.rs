//! # Domain Layer
//!
//! Pure cryptographic verification with no I/O dependencies.

pub mod ecdsa;
pub mod errors;
pub mod schnorr;
