//! # Extension Field
//!
//! The typed, variable-content field a block header may carry to change a
//! federation consensus parameter. A closed tagged union: adding a kind is
//! a compile-time extension, and every consumer matches exhaustively.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

use crate::entities::hex_str;

/// Wire length of an aggregate public key payload (compressed secp256k1).
pub const AGG_PUBKEY_LEN: usize = 33;

/// Wire length of a max-block-size payload (little-endian u32).
pub const MAX_BLOCK_SIZE_LEN: usize = 4;

/// The xfield kind, i.e. the tag byte on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum XFieldKind {
    None,
    AggregatePubKey,
    MaxBlockSize,
}

impl XFieldKind {
    /// Map a wire tag to a kind. Any other tag byte is an invalid encoding.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::None),
            1 => Some(Self::AggregatePubKey),
            2 => Some(Self::MaxBlockSize),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        match self {
            Self::None => 0,
            Self::AggregatePubKey => 1,
            Self::MaxBlockSize => 2,
        }
    }
}

/// A compressed secp256k1 public key as carried in the xfield.
///
/// Only the byte shape is guaranteed here (length and 0x02/0x03 prefix);
/// whether the bytes name a real curve point is decided by the
/// cryptographic library at verification time.
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggPubKey(#[serde_as(as = "Bytes")] pub [u8; AGG_PUBKEY_LEN]);

impl AggPubKey {
    /// Build from raw bytes, checking length and compression prefix.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != AGG_PUBKEY_LEN {
            return None;
        }
        let mut key = [0u8; AGG_PUBKEY_LEN];
        key.copy_from_slice(bytes);
        let pk = Self(key);
        pk.has_valid_prefix().then_some(pk)
    }

    /// True when the prefix byte declares a compressed point.
    pub fn has_valid_prefix(&self) -> bool {
        matches!(self.0[0], 0x02 | 0x03)
    }

    /// The x coordinate without the parity prefix.
    pub fn x_only(&self) -> &[u8] {
        &self.0[1..]
    }
}

impl std::fmt::Debug for AggPubKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AggPubKey({})", hex_str(&self.0))
    }
}

impl std::fmt::Display for AggPubKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex_str(&self.0))
    }
}

/// The extension field itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum XField {
    /// No parameter change declared.
    None,
    /// Rotate the federation's aggregate signing key.
    AggregatePubKey(AggPubKey),
    /// Change the maximum permitted serialized block size, in bytes.
    MaxBlockSize(u32),
}

impl XField {
    pub fn kind(&self) -> XFieldKind {
        match self {
            Self::None => XFieldKind::None,
            Self::AggregatePubKey(_) => XFieldKind::AggregatePubKey,
            Self::MaxBlockSize(_) => XFieldKind::MaxBlockSize,
        }
    }

    /// True when a parameter change is declared.
    pub fn is_some(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::fmt::Display for XField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::AggregatePubKey(key) => write!(f, "aggregate-pubkey {key}"),
            Self::MaxBlockSize(size) => write!(f, "max-block-size {size}"),
        }
    }
}
