//! Federation parameter history.
//!
//! The ordered, height-indexed record of every activated aggregate key and
//! size limit on the tracked chain. Exactly one history exists per tracked
//! branch; it is owned by the chain state and mutated only by the
//! acceptance pipeline (append on connect, rewind on disconnect).
//!
//! ## Deferred activation
//!
//! A parameter declared by the block at height `h` takes effect at `h + 1`.
//! The entire off-by-one lives in one place, [`XFieldHistory::active`]:
//! lookups for "the value in force while validating height `h`" consider
//! only records strictly below `h`. Callers never do their own height
//! arithmetic.

use serde::Serialize;
use shared_types::{hex_str, AggPubKey, Hash, XField};

use super::policy::DEFAULT_MAX_BLOCK_SIZE;

/// The height at which a parameter value became part of the chain, and the
/// federation block that carried it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivationRecord<T> {
    pub height: u32,
    pub block_hash: Hash,
    pub value: T,
}

/// One entry of the reported aggregate-key axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyChange {
    pub aggregate_pubkey: String,
    pub height: u32,
    pub block_hash: String,
}

/// One entry of the reported size axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SizeChange {
    pub max_block_size: u32,
    pub height: u32,
    pub block_hash: String,
}

/// The externally visible view of both axes, best chain only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FederationSnapshot {
    pub aggregate_pubkeys: Vec<KeyChange>,
    pub max_block_sizes: Vec<SizeChange>,
}

/// Ordered history of federation parameter activations for one chain.
///
/// Invariants: both axes hold a genesis record at height 0, heights within
/// an axis strictly increase, and a violation of either is a programming
/// error in the pipeline; the process aborts rather than continue on
/// corrupted consensus state.
#[derive(Debug, Clone)]
pub struct XFieldHistory {
    key_history: Vec<ActivationRecord<AggPubKey>>,
    size_history: Vec<ActivationRecord<u32>>,
}

impl XFieldHistory {
    /// Seed both axes from the genesis block: its declared aggregate key
    /// and the protocol default size limit.
    pub fn new(genesis_key: AggPubKey, genesis_hash: Hash) -> Self {
        Self {
            key_history: vec![ActivationRecord {
                height: 0,
                block_hash: genesis_hash,
                value: genesis_key,
            }],
            size_history: vec![ActivationRecord {
                height: 0,
                block_hash: genesis_hash,
                value: DEFAULT_MAX_BLOCK_SIZE,
            }],
        }
    }

    /// The record in force while validating the block at `height`.
    fn active<T>(records: &[ActivationRecord<T>], height: u32) -> &ActivationRecord<T> {
        // A record appended by block h applies from h + 1 on, hence the
        // strict bound. Index 0 is the genesis record and answers height 0.
        let idx = records.partition_point(|record| record.height < height);
        if idx == 0 {
            &records[0]
        } else {
            &records[idx - 1]
        }
    }

    /// Aggregate key the block at `height` must be signed with.
    pub fn active_key(&self, height: u32) -> &AggPubKey {
        &Self::active(&self.key_history, height).value
    }

    /// Size limit the block at `height` is checked against.
    pub fn active_size(&self, height: u32) -> u32 {
        Self::active(&self.size_history, height).value
    }

    /// Whether this xfield would change the newest value of its axis.
    /// Re-declaring the current value is valid but records nothing.
    pub fn is_new_to_history(&self, xfield: &XField) -> bool {
        match xfield {
            XField::None => false,
            XField::AggregatePubKey(key) => self.newest_key().value != *key,
            XField::MaxBlockSize(size) => self.newest_size().value != *size,
        }
    }

    /// Append the activation carried by a fully validated block.
    pub fn record_activation(&mut self, height: u32, block_hash: Hash, xfield: &XField) {
        match xfield {
            XField::None => {}
            XField::AggregatePubKey(key) => Self::push(
                &mut self.key_history,
                ActivationRecord {
                    height,
                    block_hash,
                    value: *key,
                },
            ),
            XField::MaxBlockSize(size) => Self::push(
                &mut self.size_history,
                ActivationRecord {
                    height,
                    block_hash,
                    value: *size,
                },
            ),
        }
    }

    fn push<T>(records: &mut Vec<ActivationRecord<T>>, record: ActivationRecord<T>) {
        let last = records.last().expect("axis is seeded at genesis");
        assert!(
            record.height > last.height,
            "activation height {} does not advance past {}",
            record.height,
            last.height
        );
        records.push(record);
    }

    /// Drop all records above `to_height` from both axes, as blocks above
    /// that height are disconnected.
    pub fn rewind(&mut self, to_height: u32) {
        Self::rewind_axis(&mut self.key_history, to_height);
        Self::rewind_axis(&mut self.size_history, to_height);
    }

    fn rewind_axis<T>(records: &mut Vec<ActivationRecord<T>>, to_height: u32) {
        while records.last().is_some_and(|record| record.height > to_height) {
            records.pop();
        }
        assert!(
            !records.is_empty(),
            "rewind to {to_height} dropped the genesis record"
        );
    }

    fn newest_key(&self) -> &ActivationRecord<AggPubKey> {
        self.key_history.last().expect("axis is seeded at genesis")
    }

    fn newest_size(&self) -> &ActivationRecord<u32> {
        self.size_history.last().expect("axis is seeded at genesis")
    }

    /// Height of the newest activation on either axis. Zero means only the
    /// genesis records exist.
    pub fn newest_activation_height(&self) -> u32 {
        self.newest_key().height.max(self.newest_size().height)
    }

    pub fn key_history(&self) -> &[ActivationRecord<AggPubKey>] {
        &self.key_history
    }

    pub fn size_history(&self) -> &[ActivationRecord<u32>] {
        &self.size_history
    }

    /// Ordered value → first-activation-height views for reporting.
    pub fn snapshot(&self) -> FederationSnapshot {
        FederationSnapshot {
            aggregate_pubkeys: self
                .key_history
                .iter()
                .map(|record| KeyChange {
                    aggregate_pubkey: record.value.to_string(),
                    height: record.height,
                    block_hash: hex_str(&record.block_hash),
                })
                .collect(),
            max_block_sizes: self
                .size_history
                .iter()
                .map(|record| SizeChange {
                    max_block_size: record.value,
                    height: record.height,
                    block_hash: hex_str(&record.block_hash),
                })
                .collect(),
        }
    }
}
