//! Reorganizations, manual invalidation and replay recovery.
//!
//! The federation history must mirror exactly the current best chain:
//! disconnected activations disappear from reporting, re-accepted ones
//! reappear at their new height, and abandoned branches never leak.

#[cfg(test)]
mod tests {
    use crate::fixtures::{genesis_block, new_manager, signed_block, FedSigner, Verifier};
    use fed_consensus::policy::DEFAULT_MAX_BLOCK_SIZE;
    use fed_consensus::{
        BlockDisposition, BlockStatus, ChainManager, ConsensusError, StaticTransactionValidator,
    };
    use shared_types::{Block, XField};

    /// g -> a1(size change). Reorg to g -> b1 -> b2, then extend the new
    /// best chain with the same change at a different height.
    #[test]
    fn test_disconnected_activation_leaves_history_and_returns_elsewhere() {
        let key = FedSigner::schnorr();
        let manager = new_manager(&key);
        let genesis_hash = manager.head().block_hash;

        let a1 = signed_block(genesis_hash, 0x0a, XField::MaxBlockSize(500_000), &key, 0);
        let a1_hash = a1.hash();
        manager.submit_block(a1).unwrap();
        assert_eq!(manager.active_max_block_size(), 500_000);

        let b1 = signed_block(genesis_hash, 0x1a, XField::None, &key, 0);
        let b1_hash = b1.hash();
        assert_eq!(
            manager.submit_block(b1).unwrap(),
            BlockDisposition::SideChain
        );
        let b2 = signed_block(b1_hash, 0x1b, XField::None, &key, 0);
        let b2_hash = b2.hash();
        assert_eq!(
            manager.submit_block(b2).unwrap(),
            BlockDisposition::Reorganized {
                disconnected: 1,
                connected: 2
            }
        );

        // The disconnected activation is gone from the reported history.
        assert_eq!(manager.active_max_block_size(), DEFAULT_MAX_BLOCK_SIZE);
        assert_eq!(manager.xfield_snapshot().max_block_sizes.len(), 1);
        assert_eq!(
            manager.block_status(&a1_hash),
            Some(BlockStatus::ValidHeader),
            "the abandoned block is parked, not invalid"
        );

        // An equivalent change on the new best chain re-activates at the
        // new height.
        let b3 = signed_block(b2_hash, 0x1c, XField::MaxBlockSize(500_000), &key, 0);
        manager.submit_block(b3).unwrap();
        let snapshot = manager.xfield_snapshot();
        assert_eq!(snapshot.max_block_sizes.len(), 2);
        assert_eq!(snapshot.max_block_sizes[1].height, 3);
        assert_eq!(manager.active_max_block_size(), 500_000);
    }

    /// A reorg across a key rotation: the branch must be validated under
    /// the keys as they were on that branch, block by block.
    #[test]
    fn test_reorg_across_key_rotation() {
        let key1 = FedSigner::schnorr();
        let key2 = FedSigner::ecdsa();
        let manager = new_manager(&key1);
        let genesis_hash = manager.head().block_hash;

        // Best chain: rotation at height 1, then a key2 block.
        let a1 = signed_block(
            genesis_hash,
            0x0a,
            XField::AggregatePubKey(key2.aggregate_pubkey()),
            &key1,
            0,
        );
        let a1_hash = a1.hash();
        manager.submit_block(a1).unwrap();
        let a2 = signed_block(a1_hash, 0x0b, XField::None, &key2, 0);
        manager.submit_block(a2).unwrap();

        // Competing branch of plain key1 blocks. After the reorg the
        // rotation is rewound, so key1 governs again.
        let mut tip = genesis_hash;
        let mut last = BlockDisposition::SideChain;
        for seed in [0x1a, 0x1b, 0x1c] {
            let block = signed_block(tip, seed, XField::None, &key1, 0);
            tip = block.hash();
            last = manager.submit_block(block).unwrap();
        }
        assert_eq!(
            last,
            BlockDisposition::Reorganized {
                disconnected: 2,
                connected: 3
            }
        );
        assert_eq!(manager.active_aggregate_pubkey(), key1.aggregate_pubkey());
        assert_eq!(manager.xfield_snapshot().aggregate_pubkeys.len(), 1);
    }

    /// A branch containing a block signed by the wrong key never takes
    /// over; the incumbent chain survives and the branch dies.
    #[test]
    fn test_invalid_branch_is_rejected_and_incumbent_restored() {
        let key = FedSigner::schnorr();
        let stranger = FedSigner::schnorr();
        let manager = new_manager(&key);
        let genesis_hash = manager.head().block_hash;

        let a1 = signed_block(genesis_hash, 0x0a, XField::None, &key, 0);
        let a1_hash = a1.hash();
        manager.submit_block(a1).unwrap();

        // Branch: b1 is properly signed and parks; b2 is not, and its
        // submission is the takeover attempt (it outgrows the tip).
        let b1 = signed_block(genesis_hash, 0x1a, XField::None, &key, 0);
        let b1_hash = b1.hash();
        assert_eq!(
            manager.submit_block(b1).unwrap(),
            BlockDisposition::SideChain
        );
        let b2 = signed_block(b1_hash, 0x1b, XField::None, &stranger, 0);
        let b2_hash = b2.hash();
        assert_eq!(
            manager.submit_block(b2).unwrap_err(),
            ConsensusError::BadSignature
        );

        // Incumbent chain intact, bad branch condemned; building on the
        // condemned block is refused outright.
        assert_eq!(manager.head().block_hash, a1_hash);
        assert_eq!(manager.block_status(&b1_hash), Some(BlockStatus::ValidHeader));
        assert_eq!(manager.block_status(&b2_hash), Some(BlockStatus::Invalid));
        let b3 = signed_block(b2_hash, 0x1c, XField::None, &key, 0);
        assert_eq!(
            manager.submit_block(b3).unwrap_err(),
            ConsensusError::InvalidAncestor
        );

        // The active chain still works.
        let a2 = signed_block(a1_hash, 0x0b, XField::None, &key, 0);
        manager.submit_block(a2).unwrap();
    }

    #[test]
    fn test_invalidation_guard_protects_federation_block_and_ancestors() {
        let key1 = FedSigner::schnorr();
        let key2 = FedSigner::schnorr();
        let manager = new_manager(&key1);
        let mut tip = manager.head().block_hash;

        let plain_early = signed_block(tip, 2, XField::None, &key1, 0);
        let plain_early_hash = plain_early.hash();
        tip = plain_early_hash;
        manager.submit_block(plain_early).unwrap();

        let rotation = signed_block(
            tip,
            3,
            XField::AggregatePubKey(key2.aggregate_pubkey()),
            &key1,
            0,
        );
        let rotation_hash = rotation.hash();
        tip = rotation_hash;
        manager.submit_block(rotation).unwrap();

        let plain_late = signed_block(tip, 4, XField::None, &key2, 0);
        let plain_late_hash = plain_late.hash();
        manager.submit_block(plain_late).unwrap();

        // The federation block and anything whose removal would excise it
        // are protected.
        assert_eq!(
            manager.invalidate_block(&rotation_hash),
            Err(ConsensusError::FederationBlockFound)
        );
        assert_eq!(
            manager.invalidate_block(&plain_early_hash),
            Err(ConsensusError::FederationBlockFound)
        );

        // A block above the federation block invalidates normally.
        manager.invalidate_block(&plain_late_hash).unwrap();
        assert_eq!(manager.head().block_hash, rotation_hash);
        assert_eq!(
            manager.block_status(&plain_late_hash),
            Some(BlockStatus::Invalid)
        );

        // The guard blocks manual excision only: a heavier branch forking
        // below the rotation still displaces it through an ordinary reorg.
        let c3 = signed_block(plain_early_hash, 0x20, XField::None, &key1, 0);
        let c3_hash = c3.hash();
        assert_eq!(
            manager.submit_block(c3).unwrap(),
            BlockDisposition::SideChain
        );
        let c4 = signed_block(c3_hash, 0x21, XField::None, &key1, 0);
        assert_eq!(
            manager.submit_block(c4).unwrap(),
            BlockDisposition::Reorganized {
                disconnected: 1,
                connected: 2
            }
        );
        assert_eq!(manager.block_status(&rotation_hash), Some(BlockStatus::ValidHeader));
        assert_eq!(manager.xfield_snapshot().aggregate_pubkeys.len(), 1);
        assert_eq!(manager.active_aggregate_pubkey(), key1.aggregate_pubkey());
    }

    #[test]
    fn test_invalidation_promotes_surviving_branch() {
        let key = FedSigner::schnorr();
        let manager = new_manager(&key);
        let genesis_hash = manager.head().block_hash;

        let a1 = signed_block(genesis_hash, 0x0a, XField::None, &key, 0);
        let a1_hash = a1.hash();
        manager.submit_block(a1).unwrap();
        let a2 = signed_block(a1_hash, 0x0b, XField::None, &key, 0);
        let a2_hash = a2.hash();
        manager.submit_block(a2).unwrap();

        // Parked branch of equal length.
        let b1 = signed_block(genesis_hash, 0x1a, XField::None, &key, 0);
        let b1_hash = b1.hash();
        manager.submit_block(b1).unwrap();
        let b2 = signed_block(b1_hash, 0x1b, XField::None, &key, 0);
        let b2_hash = b2.hash();
        manager.submit_block(b2).unwrap();

        // Killing a1 strands a2 with it; the parked branch takes over.
        manager.invalidate_block(&a1_hash).unwrap();
        assert_eq!(manager.block_status(&a2_hash), Some(BlockStatus::Invalid));
        assert_eq!(manager.head().block_hash, b2_hash);
        assert_eq!(manager.head().height, 2);
    }

    #[test]
    fn test_invalidating_unknown_block_fails() {
        let key = FedSigner::schnorr();
        let manager = new_manager(&key);
        assert!(matches!(
            manager.invalidate_block(&[0x99; 32]),
            Err(ConsensusError::UnknownBlock(_))
        ));
    }

    /// Crash recovery: replaying the accepted best chain from genesis
    /// reproduces the live tracker state, reorgs included.
    #[test]
    fn test_replay_after_reorg_matches_live_state() {
        let key1 = FedSigner::schnorr();
        let key2 = FedSigner::ecdsa();
        let manager = new_manager(&key1);
        let genesis_hash = manager.head().block_hash;

        // Dead-end branch first.
        let a1 = signed_block(genesis_hash, 0x0a, XField::MaxBlockSize(700_000), &key1, 0);
        manager.submit_block(a1).unwrap();

        // Winning branch with a rotation and a size change.
        let b1 = signed_block(
            genesis_hash,
            0x1a,
            XField::AggregatePubKey(key2.aggregate_pubkey()),
            &key1,
            0,
        );
        let b1_hash = b1.hash();
        manager.submit_block(b1.clone()).unwrap();
        let b2 = signed_block(b1_hash, 0x1b, XField::MaxBlockSize(900_000), &key2, 0);
        let b2_hash = b2.hash();
        manager.submit_block(b2.clone()).unwrap();
        let b3 = signed_block(b2_hash, 0x1c, XField::None, &key2, 0);
        manager.submit_block(b3.clone()).unwrap();

        // Replay only what the best chain accepted.
        let best_chain: Vec<Block> = vec![b1, b2, b3];
        let replayed = ChainManager::replay(
            genesis_block(&key1),
            best_chain,
            Verifier::new(),
            StaticTransactionValidator::default(),
        )
        .unwrap();

        assert_eq!(replayed.head(), manager.head());
        assert_eq!(replayed.xfield_snapshot(), manager.xfield_snapshot());
        assert_eq!(
            replayed.active_aggregate_pubkey(),
            manager.active_aggregate_pubkey()
        );
        assert_eq!(
            replayed.active_max_block_size(),
            manager.active_max_block_size()
        );
    }

    #[test]
    fn test_equal_length_branch_does_not_reorg() {
        let key = FedSigner::schnorr();
        let manager = new_manager(&key);
        let genesis_hash = manager.head().block_hash;

        let a1 = signed_block(genesis_hash, 0x0a, XField::None, &key, 0);
        let a1_hash = a1.hash();
        manager.submit_block(a1).unwrap();

        let b1 = signed_block(genesis_hash, 0x1a, XField::None, &key, 0);
        assert_eq!(
            manager.submit_block(b1).unwrap(),
            BlockDisposition::SideChain
        );
        assert_eq!(manager.head().block_hash, a1_hash, "first seen wins ties");
    }

    #[test]
    fn test_reorg_preserves_strict_sequencing_of_rewind_and_record() {
        // A reorg that recreates an activation block at a different height
        // must end with exactly one record at the new height, proving the
        // rewind ran before the re-record.
        let key = FedSigner::schnorr();
        let manager = new_manager(&key);
        let genesis_hash = manager.head().block_hash;

        let a1 = signed_block(genesis_hash, 0x0a, XField::None, &key, 0);
        let a1_hash = a1.hash();
        manager.submit_block(a1).unwrap();
        let a2 = signed_block(a1_hash, 0x0b, XField::MaxBlockSize(600_000), &key, 0);
        manager.submit_block(a2).unwrap();

        let b1 = signed_block(genesis_hash, 0x1a, XField::MaxBlockSize(600_000), &key, 0);
        let b1_hash = b1.hash();
        manager.submit_block(b1).unwrap();
        let b2 = signed_block(b1_hash, 0x1b, XField::None, &key, 0);
        let b2_hash = b2.hash();
        manager.submit_block(b2).unwrap();
        let b3 = signed_block(b2_hash, 0x1c, XField::None, &key, 0);
        manager.submit_block(b3).unwrap();

        let snapshot = manager.xfield_snapshot();
        assert_eq!(snapshot.max_block_sizes.len(), 2);
        assert_eq!(snapshot.max_block_sizes[1].height, 1, "record moved to the branch height");
        assert_eq!(manager.active_max_block_size(), 600_000);
    }
}
