//! # Core Domain Entities
//!
//! The block header and block types shared across subsystems.
//!
//! A Federation-Chain header carries no proof-of-work fields: blocks are
//! authorized by an aggregate signature (`proof`) checked against the
//! federation key active at the parent. The optional [`XField`] region is
//! how the federation evolves its own parameters in-band.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

use crate::encoding;
use crate::xfield::XField;

/// A 32-byte hash (double SHA-256).
pub type Hash = [u8; 32];

/// Protocol feature bits carried in every header.
pub const BLOCK_FEATURES: i32 = 1;

/// Render bytes as lowercase hex for logs and reports.
pub fn hex_str(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        s.push_str(&format!("{b:02x}"));
    }
    s
}

/// The block header.
///
/// Wire order matches [`crate::encoding::encode_header`] exactly; the
/// `proof` field is the only part excluded from the signing digest.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Protocol feature bits.
    pub features: i32,
    /// Hash of the parent block.
    #[serde_as(as = "Bytes")]
    pub prev_hash: Hash,
    /// Merkle root of the block's transactions.
    #[serde_as(as = "Bytes")]
    pub merkle_root: Hash,
    /// Merkle root over immutable transaction ids.
    #[serde_as(as = "Bytes")]
    pub im_merkle_root: Hash,
    /// Unix timestamp (seconds).
    pub time: u32,
    /// Optional consensus-parameter change declared by this block.
    pub xfield: XField,
    /// Aggregate block signature. Empty only while the block is unsigned.
    pub proof: Vec<u8>,
}

impl BlockHeader {
    /// Block id: double SHA-256 over the full serialized header.
    pub fn hash(&self) -> Hash {
        encoding::double_sha256(&encoding::encode_header(self))
    }

    /// Signing digest: double SHA-256 over the header with the proof
    /// field excluded, so the signature cannot cover itself.
    pub fn hash_for_sign(&self) -> Hash {
        encoding::double_sha256(&encoding::encode_header_for_sign(self))
    }
}

/// A block: header plus opaque serialized transactions.
///
/// Transaction contents are never interpreted here; script and sighash
/// evaluation belong to the transaction-validation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Vec<u8>>,
}

impl Block {
    /// Block id (the header hash).
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    /// Exact serialized size in bytes, as it would travel on the wire.
    pub fn serialized_size(&self) -> usize {
        encoding::encode_block(self).len()
    }
}
