//! Error types for the consensus subsystem.
//!
//! Block-level rejections carry one of the five wire reject reasons via
//! [`ConsensusError::reject_reason`]; the `Display` text of those variants
//! starts with the same string so logs and peers always agree.

use shared_types::{DecodeError, Hash};

/// Wire reject reason for malformed or out-of-policy extension fields.
pub const REJECT_XFIELD: &str = "bad-xfieldType-xfield";
/// Wire reject reason for a failed block-proof check.
pub const REJECT_SIGNATURE: &str = "bad-signature";
/// Wire reject reason for a block over the active size limit.
pub const REJECT_BLOCK_SIZE: &str = "bad-blk-size";
/// Wire reject reason for a block over the absolute transport ceiling.
pub const REJECT_BLOCK_LENGTH: &str = "bad-blk-length";
/// Wire reject reason for a block over the sigop ceiling.
pub const REJECT_BLOCK_SIGOPS: &str = "bad-blk-sigops";

/// Consensus error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsensusError {
    /// The extension field is malformed or out of policy. At this layer the
    /// two are indistinguishable and share one reject reason.
    #[error("bad-xfieldType-xfield: {detail}")]
    BadXField { detail: String },

    /// The block proof does not verify under the key active before the block.
    #[error("bad-signature")]
    BadSignature,

    /// Serialized size exceeds the size limit active before the block.
    #[error("bad-blk-size: block of {size} bytes exceeds active limit {limit}")]
    BlockSizeExceeded { size: usize, limit: u32 },

    /// Serialized size exceeds what the transport could ever carry.
    #[error("bad-blk-length: block of {size} bytes exceeds transport ceiling {ceiling}")]
    BlockLengthExceeded { size: usize, ceiling: u32 },

    /// Signature-operation count exceeds the fixed ceiling.
    #[error("bad-blk-sigops: {count} signature operations exceed limit {limit}")]
    SigOpsExceeded { count: u64, limit: u64 },

    /// The transaction-validation collaborator rejected the block body.
    #[error("invalid transactions: {0}")]
    InvalidTransactions(String),

    /// The block bytes do not decode (outside the xfield region).
    #[error("malformed block encoding: {0}")]
    MalformedBlock(#[from] DecodeError),

    /// The named parent is not in the block index.
    #[error("unknown parent block")]
    UnknownParent(Hash),

    /// The parent chain was marked invalid.
    #[error("block extends an invalidated chain")]
    InvalidAncestor,

    /// The named block is not in the block index.
    #[error("unknown block")]
    UnknownBlock(Hash),

    /// Manual invalidation would excise the block defining the active
    /// parameter set. Only a heavier competing chain may supersede it.
    #[error("Federation block found")]
    FederationBlockFound,

    /// The genesis block is not subject to invalidation.
    #[error("the genesis block cannot be invalidated")]
    CannotInvalidateGenesis,

    /// The genesis block handed to the chain manager is unusable.
    #[error("invalid genesis block: {0}")]
    InvalidGenesis(&'static str),
}

impl ConsensusError {
    /// The wire reject reason for block-level failures, if any.
    pub fn reject_reason(&self) -> Option<&'static str> {
        match self {
            Self::BadXField { .. } => Some(REJECT_XFIELD),
            Self::BadSignature => Some(REJECT_SIGNATURE),
            Self::BlockSizeExceeded { .. } => Some(REJECT_BLOCK_SIZE),
            Self::BlockLengthExceeded { .. } => Some(REJECT_BLOCK_LENGTH),
            Self::SigOpsExceeded { .. } => Some(REJECT_BLOCK_SIGOPS),
            _ => None,
        }
    }
}

/// Result type for consensus operations.
pub type ConsensusResult<T> = Result<T, ConsensusError>;
