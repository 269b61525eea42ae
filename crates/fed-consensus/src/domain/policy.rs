//! Parameter policy: legal value ranges and fixed constants.
//!
//! Everything here is a pure predicate over values already decoded; no
//! chain state is consulted. The acceptance pipeline calls these before
//! anything cryptographic runs, so a malformed field can never influence
//! how a signing digest is computed.

use shared_types::xfield::AGG_PUBKEY_LEN;
use shared_types::XField;

use super::error::{ConsensusError, ConsensusResult};

/// The size limit in force at genesis, before any xfield changes it.
pub const DEFAULT_MAX_BLOCK_SIZE: u32 = 1_000_000;

/// The transport layer's maximum message size. No block may declare a
/// limit above this: it could never be transmitted at that size.
pub const MAX_PROTOCOL_MESSAGE_LENGTH: u32 = 4_000_000;

/// Floor for a declared size limit. A chain whose blocks cannot hold a
/// header and a coinbase is unusable.
pub const MIN_BLOCK_SIZE: u32 = 1_000;

/// Fixed per-block ceiling on signature-check operations. Independent of
/// the size axis and never changed by any extension field.
pub const MAX_BLOCK_SIGOPS: u64 = (DEFAULT_MAX_BLOCK_SIZE / 50) as u64;

/// Syntactic check for an aggregate-key payload: compressed-point length
/// and prefix. Whether the bytes name a real curve point is decided by the
/// cryptographic library, not here.
pub fn is_valid_pubkey_payload(bytes: &[u8]) -> bool {
    bytes.len() == AGG_PUBKEY_LEN && matches!(bytes[0], 0x02 | 0x03)
}

/// Range check for a declared size limit; the interval is closed on both
/// ends and zero is always outside it.
pub fn is_valid_max_block_size(size: u32) -> bool {
    (MIN_BLOCK_SIZE..=MAX_PROTOCOL_MESSAGE_LENGTH).contains(&size)
}

/// Strict bound: exceeding the active limit by a single byte fails.
pub fn check_block_size(serialized_size: usize, active_limit: u32) -> bool {
    serialized_size <= active_limit as usize
}

pub fn check_sig_ops(count: u64) -> bool {
    count <= MAX_BLOCK_SIGOPS
}

/// Structural and range validity of a decoded extension field. Failure is
/// always the `bad-xfieldType-xfield` rejection, whichever rule tripped.
pub fn validate_xfield(xfield: &XField) -> ConsensusResult<()> {
    match xfield {
        XField::None => Ok(()),
        XField::AggregatePubKey(key) => {
            if is_valid_pubkey_payload(&key.0) {
                Ok(())
            } else {
                Err(ConsensusError::BadXField {
                    detail: format!("invalid aggregate pubkey payload {key}"),
                })
            }
        }
        XField::MaxBlockSize(size) => {
            if is_valid_max_block_size(*size) {
                Ok(())
            } else {
                Err(ConsensusError::BadXField {
                    detail: format!("max block size {size} outside [{MIN_BLOCK_SIZE}, {MAX_PROTOCOL_MESSAGE_LENGTH}]"),
                })
            }
        }
    }
}
