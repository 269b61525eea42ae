//! Chain manager: the block acceptance pipeline.
//!
//! Orchestrates codec, policy, proof verification and the federation
//! history to decide accept/reject for one candidate block, and keeps the
//! history consistent with the best chain across reorganizations and
//! manual invalidation.
//!
//! Check ordering is consensus-critical: structural and policy checks on
//! the extension field run before anything cryptographic, so a malformed
//! field can never reach signature verification; the signature runs before
//! resource checks; transaction-level validity comes last.
//!
//! Connect and disconnect are strictly sequential per chain, because every
//! block depends on the federation state left by its predecessor, so all
//! writes funnel through one exclusive lock. Only the stateless pre-screen
//! is parallel.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{info, warn};

use shared_types::{decode_block, hex_str, Block, DecodeError, Hash, XField};

use crate::domain::policy;
use crate::domain::{
    BlockStatus, ChainHead, ChainIndex, ConsensusError, ConsensusResult, FederationSnapshot,
    XFieldHistory,
};
use crate::ports::{BlockProofVerifier, TransactionValidator};
use crate::state::{ChainState, ChainStateCell};

/// What happened to an accepted block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockDisposition {
    /// Extended the best chain.
    Connected,
    /// Parked on a side branch; the best chain is unchanged.
    SideChain,
    /// Its branch became the best chain.
    Reorganized { disconnected: usize, connected: usize },
    /// Already known; nothing changed.
    Duplicate,
}

/// Structural and policy checks (pipeline steps that are pure) for
/// independent candidates, in parallel. Never touches chain state; a
/// passing result here still goes through the full pipeline on submit.
pub fn pre_screen(blocks: &[Block]) -> Vec<ConsensusResult<()>> {
    blocks
        .par_iter()
        .map(|block| policy::validate_xfield(&block.header.xfield))
        .collect()
}

/// The acceptance pipeline and best-chain bookkeeping for one node.
pub struct ChainManager<V, T>
where
    V: BlockProofVerifier,
    T: TransactionValidator,
{
    state: Arc<ChainStateCell>,
    proof_verifier: V,
    tx_validator: T,
}

impl<V, T> ChainManager<V, T>
where
    V: BlockProofVerifier,
    T: TransactionValidator,
{
    /// Boot a manager from a signed genesis block. The genesis must
    /// declare the federation's initial aggregate key and be signed by it;
    /// the size axis starts at the protocol default.
    pub fn new(genesis: Block, proof_verifier: V, tx_validator: T) -> ConsensusResult<Self> {
        let XField::AggregatePubKey(genesis_key) = genesis.header.xfield else {
            return Err(ConsensusError::InvalidGenesis(
                "genesis must declare an aggregate public key",
            ));
        };
        if genesis.header.prev_hash != [0u8; 32] {
            return Err(ConsensusError::InvalidGenesis("genesis cannot have a parent"));
        }
        let digest = genesis.header.hash_for_sign();
        if !proof_verifier.verify_block_proof(&digest, &genesis.header.proof, &genesis_key) {
            return Err(ConsensusError::BadSignature);
        }

        let genesis_hash = genesis.hash();
        let state = ChainState {
            index: ChainIndex::new(genesis),
            history: XFieldHistory::new(genesis_key, genesis_hash),
        };
        info!(genesis = %hex_str(&genesis_hash), "chain initialized");
        Ok(Self {
            state: Arc::new(ChainStateCell::new(state)),
            proof_verifier,
            tx_validator,
        })
    }

    /// Rebuild state by replaying an accepted chain from genesis. This is
    /// the crash-recovery path: the history has no persistence of its own
    /// and is derived entirely from the blocks.
    pub fn replay<I>(
        genesis: Block,
        blocks: I,
        proof_verifier: V,
        tx_validator: T,
    ) -> ConsensusResult<Self>
    where
        I: IntoIterator<Item = Block>,
    {
        let manager = Self::new(genesis, proof_verifier, tx_validator)?;
        for block in blocks {
            manager.submit_block(block)?;
        }
        Ok(manager)
    }

    // === QUERY SURFACE ===

    pub fn head(&self) -> ChainHead {
        self.state.head()
    }

    /// Ordered value → first-activation-height views of both axes,
    /// reflecting only the current best chain.
    pub fn xfield_snapshot(&self) -> FederationSnapshot {
        self.state.snapshot()
    }

    pub fn block_status(&self, hash: &Hash) -> Option<BlockStatus> {
        self.state.chain.read().index.entry(hash).map(|e| e.status)
    }

    /// Key the next block must be signed with.
    pub fn active_aggregate_pubkey(&self) -> shared_types::AggPubKey {
        let state = self.state.chain.read();
        *state.history.active_key(state.index.tip_height() + 1)
    }

    /// Size limit the next block will be checked against.
    pub fn active_max_block_size(&self) -> u32 {
        let state = self.state.chain.read();
        state.history.active_size(state.index.tip_height() + 1)
    }

    // === ACCEPTANCE PIPELINE ===

    /// Decode and submit a block received as raw bytes. Xfield decode
    /// failures share the reject reason of semantically invalid fields.
    pub fn submit_raw_block(&self, bytes: &[u8]) -> ConsensusResult<BlockDisposition> {
        let block = decode_block(bytes).map_err(|err| match err {
            DecodeError::UnknownXFieldTag(_)
            | DecodeError::BadXFieldLength { .. }
            | DecodeError::BadPubKeyPrefix(_) => ConsensusError::BadXField {
                detail: err.to_string(),
            },
            other => ConsensusError::MalformedBlock(other),
        })?;
        self.submit_block(block)
    }

    /// Run one candidate block through the pipeline.
    pub fn submit_block(&self, block: Block) -> ConsensusResult<BlockDisposition> {
        let result = self.submit_block_inner(block);
        if let Err(err) = &result {
            match err.reject_reason() {
                Some(reason) => warn!(%err, reason, "block rejected"),
                None => warn!(%err, "block not accepted"),
            }
        }
        result
    }

    fn submit_block_inner(&self, block: Block) -> ConsensusResult<BlockDisposition> {
        // Steps 1-2: structural and policy validity of the extension
        // field. Pure; runs before the lock and before any crypto.
        policy::validate_xfield(&block.header.xfield)?;

        let mut state = self.state.chain.write();
        let hash = block.hash();

        if let Some(entry) = state.index.entry(&hash) {
            if entry.status == BlockStatus::Invalid {
                return Err(ConsensusError::InvalidAncestor);
            }
            return Ok(BlockDisposition::Duplicate);
        }

        let parent_hash = block.header.prev_hash;
        let parent = state
            .index
            .entry(&parent_hash)
            .ok_or(ConsensusError::UnknownParent(parent_hash))?;
        if parent.status == BlockStatus::Invalid {
            return Err(ConsensusError::InvalidAncestor);
        }
        let height = parent.height + 1;

        if parent_hash == state.index.tip_hash() {
            // Steps 3-7 against the state at the parent, then connect.
            self.contextual_check(&state, &block, height)?;
            state.index.insert(block);
            Self::connect_tip(&mut state, hash);
            info!(height, block = %hex_str(&hash), "block connected");
            return Ok(BlockDisposition::Connected);
        }

        // Side branch: park it. Contextual validation happens if and when
        // the branch becomes best.
        state.index.insert(block);
        if height > state.index.tip_height() {
            let (disconnected, connected) = self.activate_best_chain(&mut state, hash)?;
            return Ok(BlockDisposition::Reorganized {
                disconnected,
                connected,
            });
        }
        Ok(BlockDisposition::SideChain)
    }

    /// Pipeline steps 3-7 for a block at `height` whose parent is the
    /// current tip of `state`: resolve the active parameters (values in
    /// force *before* this block), verify the proof, then the resource
    /// checks, then delegate transaction validity.
    fn contextual_check(
        &self,
        state: &ChainState,
        block: &Block,
        height: u32,
    ) -> ConsensusResult<()> {
        let active_key = state.history.active_key(height);
        let active_size = state.history.active_size(height);

        let digest = block.header.hash_for_sign();
        if !self
            .proof_verifier
            .verify_block_proof(&digest, &block.header.proof, active_key)
        {
            return Err(ConsensusError::BadSignature);
        }

        let size = block.serialized_size();
        if size > policy::MAX_PROTOCOL_MESSAGE_LENGTH as usize {
            return Err(ConsensusError::BlockLengthExceeded {
                size,
                ceiling: policy::MAX_PROTOCOL_MESSAGE_LENGTH,
            });
        }
        if !policy::check_block_size(size, active_size) {
            return Err(ConsensusError::BlockSizeExceeded {
                size,
                limit: active_size,
            });
        }

        let sig_ops = self.tx_validator.count_sig_ops(block);
        if !policy::check_sig_ops(sig_ops) {
            return Err(ConsensusError::SigOpsExceeded {
                count: sig_ops,
                limit: policy::MAX_BLOCK_SIGOPS,
            });
        }

        self.tx_validator
            .check_transactions(block)
            .map_err(ConsensusError::InvalidTransactions)?;
        Ok(())
    }

    /// Promote an already-stored block to the tip, recording its
    /// activation (step 8). Only fully validated blocks reach this point.
    fn connect_tip(state: &mut ChainState, hash: Hash) {
        let (height, xfield) = {
            let entry = state.index.entry(&hash).expect("connect of stored block");
            (entry.height, entry.block.header.xfield)
        };
        state.index.connect_tip(hash);
        if state.history.is_new_to_history(&xfield) {
            state.history.record_activation(height, hash, &xfield);
            info!(height, block = %hex_str(&hash), %xfield, "federation parameter activated");
        }
    }

    /// Disconnect the tip and rewind its activation, in that strict order.
    fn disconnect_tip(state: &mut ChainState) -> Hash {
        let height = state.index.tip_height();
        let hash = state.index.disconnect_tip();
        state.history.rewind(height - 1);
        hash
    }

    /// Reorganize onto the branch ending at `new_tip`: disconnect to the
    /// fork point, then connect the new branch block by block with full
    /// validation. A failing block invalidates its branch and the
    /// incumbent chain is restored.
    fn activate_best_chain(
        &self,
        state: &mut ChainState,
        new_tip: Hash,
    ) -> ConsensusResult<(usize, usize)> {
        let old_tip = state.index.tip_hash();
        let fork = state.index.find_fork(old_tip, new_tip);

        let mut disconnected: Vec<Hash> = Vec::new();
        while state.index.tip_hash() != fork {
            let hash = Self::disconnect_tip(state);
            info!(block = %hex_str(&hash), "block disconnected");
            disconnected.push(hash);
        }

        let branch = state.index.path_from_ancestor(fork, new_tip);
        let mut connected = 0usize;
        for hash in &branch {
            let check = {
                let entry = state.index.entry(hash).expect("branch block is stored");
                self.contextual_check(state, &entry.block, entry.height)
            };
            if let Err(err) = check {
                warn!(block = %hex_str(hash), %err, "branch block invalid, restoring previous chain");
                state.index.mark_subtree_invalid(*hash);
                while state.index.tip_hash() != fork {
                    Self::disconnect_tip(state);
                }
                for hash in disconnected.iter().rev() {
                    Self::connect_tip(state, *hash);
                }
                return Err(err);
            }
            Self::connect_tip(state, *hash);
            connected += 1;
        }

        info!(
            fork = %hex_str(&fork),
            disconnected = disconnected.len(),
            connected,
            "chain reorganized"
        );
        Ok((disconnected.len(), connected))
    }

    // === MANUAL INVALIDATION ===

    /// Mark a block and its descendants invalid, refusing when that would
    /// excise the block defining the currently-active parameter set. Such
    /// a federation block can only be superseded by a heavier competing
    /// chain through an ordinary reorganization.
    pub fn invalidate_block(&self, hash: &Hash) -> ConsensusResult<()> {
        let mut state = self.state.chain.write();
        let entry = state
            .index
            .entry(hash)
            .ok_or(ConsensusError::UnknownBlock(*hash))?;
        let height = entry.height;
        if height == 0 {
            return Err(ConsensusError::CannotInvalidateGenesis);
        }

        if state.index.is_on_active_chain(hash) {
            if state.history.newest_activation_height() >= height {
                return Err(ConsensusError::FederationBlockFound);
            }
            while state.index.tip_height() >= height {
                Self::disconnect_tip(&mut state);
            }
        }
        state.index.mark_subtree_invalid(*hash);
        info!(block = %hex_str(hash), height, "block invalidated");

        // A parked branch may now outweigh the truncated chain.
        loop {
            let Some(candidate) = state.index.best_alternative_tip() else {
                break;
            };
            let candidate_height = state
                .index
                .entry(&candidate)
                .expect("candidate is stored")
                .height;
            if candidate_height <= state.index.tip_height() {
                break;
            }
            if self.activate_best_chain(&mut state, candidate).is_ok() {
                break;
            }
            // The failing branch was marked invalid; try the next one.
        }
        Ok(())
    }
}
