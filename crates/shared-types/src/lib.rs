//! # Shared Types Crate
//!
//! Domain entities and the canonical wire codec shared by every
//! Federation-Chain subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: the block header layout, the xfield tagged
//!   union and both block digests are defined here and nowhere else.
//! - **Canonical Encoding**: the consensus codec in [`encoding`] is
//!   hand-written and bit-exact. Every value has exactly one valid byte
//!   representation; anything else fails to decode. Serde derives on the
//!   entities exist for reporting surfaces only and are never used for
//!   consensus serialization.

pub mod encoding;
pub mod entities;
pub mod errors;
pub mod xfield;

pub use encoding::{decode_block, decode_header, double_sha256, encode_block, encode_header};
pub use entities::{hex_str, Block, BlockHeader, Hash, BLOCK_FEATURES};
pub use errors::DecodeError;
pub use xfield::{AggPubKey, XField, XFieldKind, AGG_PUBKEY_LEN, MAX_BLOCK_SIZE_LEN};
