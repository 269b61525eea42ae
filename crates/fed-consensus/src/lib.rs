//! # fed-consensus
//!
//! Federation parameter tracking and block acceptance for Federation-Chain.
//!
//! ## Architecture
//!
//! A federated, signed blockchain evolves two consensus parameters, the
//! aggregate block-signing key and the maximum block size, through the
//! optional xfield in each header. This crate decides accept/reject
//! for candidate blocks and keeps the height-indexed history of activated
//! parameters consistent with the best chain:
//!
//! ```text
//! candidate block ──→ [ChainManager]
//!                         │ 1-2. xfield structural + policy checks
//!                         │ 3.   active key/size before this block
//!                         │ 4.   block proof        (port: BlockProofVerifier)
//!                         │ 5-6. size and sigop ceilings
//!                         │ 7.   transaction validity (port: TransactionValidator)
//!                         │ 8.   connect + record activation
//!                         ↓
//!                  [XFieldHistory]  ←──  rewind on disconnect (reorg)
//! ```
//!
//! A parameter declared at height `h` activates at `h + 1`; the declaring
//! block is still validated under the previous values. The block that
//! defines the currently-active parameter set (the "federation block") is
//! protected from manual invalidation and can only be superseded by a
//! heavier competing chain.
//!
//! State is rebuilt by replaying accepted blocks from genesis; the
//! history has no persistence of its own.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;
pub mod state;

// Re-export main types
pub use adapters::StaticTransactionValidator;
pub use domain::error::{
    REJECT_BLOCK_LENGTH, REJECT_BLOCK_SIGOPS, REJECT_BLOCK_SIZE, REJECT_SIGNATURE, REJECT_XFIELD,
};
pub use domain::{
    ActivationRecord, BlockEntry, BlockStatus, ChainHead, ChainIndex, ConsensusError,
    ConsensusResult, FederationSnapshot, KeyChange, SizeChange, XFieldHistory,
};
pub use domain::policy;
pub use ports::{BlockProofVerifier, TransactionValidator};
pub use service::{pre_screen, BlockDisposition, ChainManager};
pub use state::{ChainState, ChainStateCell};
