//! Outbound ports: the collaborators the acceptance pipeline drives.
//!
//! Both ports are synchronous; nothing in this subsystem blocks on I/O.

use shared_types::{AggPubKey, Block, Hash};

/// Block-proof verification against the active aggregate key.
///
/// Implementations must be pure: the same digest/proof/key triple always
/// yields the same answer, and a `false` is a hard rejection.
pub trait BlockProofVerifier: Send + Sync {
    fn verify_block_proof(&self, digest: &Hash, proof: &[u8], key: &AggPubKey) -> bool;
}

/// Transaction-level validity, consumed as a black box.
///
/// Script and signature-hash evaluation live behind this port; the
/// pipeline only sees a sigop total and a pass/fail verdict.
pub trait TransactionValidator: Send + Sync {
    /// Total signature-check operations across the block's transactions.
    fn count_sig_ops(&self, block: &Block) -> u64;

    /// Full transaction validity for the block body. An `Err` rejects the
    /// block with a generic reason, never an xfield/size one.
    fn check_transactions(&self, block: &Block) -> Result<(), String>;
}
