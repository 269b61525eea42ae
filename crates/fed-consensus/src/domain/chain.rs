//! Block index and best-chain bookkeeping.
//!
//! Branches are an arena of block records keyed by hash with parent
//! pointers, never live references across branches. The best chain is an
//! explicit vector of hashes through the arena; reorganizations are driven
//! by diffing the old and new paths, computed here and executed by the
//! service layer.

use std::collections::HashMap;

use shared_types::{Block, Hash};

/// Where a known block currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStatus {
    /// Part of the current best chain.
    Active,
    /// Structurally valid, parked on a side branch. Full contextual
    /// validation happens if its branch ever becomes best.
    ValidHeader,
    /// Rejected during a branch activation or manually invalidated,
    /// together with everything that builds on it.
    Invalid,
}

/// One block in the arena.
#[derive(Debug, Clone)]
pub struct BlockEntry {
    pub block: Block,
    pub height: u32,
    pub status: BlockStatus,
}

/// Current best-chain tip information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainHead {
    pub block_hash: Hash,
    pub height: u32,
}

/// Arena of known blocks plus the selected best chain.
#[derive(Debug, Clone)]
pub struct ChainIndex {
    entries: HashMap<Hash, BlockEntry>,
    children: HashMap<Hash, Vec<Hash>>,
    /// Best chain, indexed by height. Never empty; slot 0 is genesis.
    active_chain: Vec<Hash>,
}

impl ChainIndex {
    pub fn new(genesis: Block) -> Self {
        let hash = genesis.hash();
        let mut entries = HashMap::new();
        entries.insert(
            hash,
            BlockEntry {
                block: genesis,
                height: 0,
                status: BlockStatus::Active,
            },
        );
        Self {
            entries,
            children: HashMap::new(),
            active_chain: vec![hash],
        }
    }

    pub fn genesis_hash(&self) -> Hash {
        self.active_chain[0]
    }

    pub fn tip_hash(&self) -> Hash {
        *self.active_chain.last().expect("chain is never empty")
    }

    pub fn tip_height(&self) -> u32 {
        (self.active_chain.len() - 1) as u32
    }

    pub fn head(&self) -> ChainHead {
        ChainHead {
            block_hash: self.tip_hash(),
            height: self.tip_height(),
        }
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.entries.contains_key(hash)
    }

    pub fn entry(&self, hash: &Hash) -> Option<&BlockEntry> {
        self.entries.get(hash)
    }

    pub fn hash_at_height(&self, height: u32) -> Option<Hash> {
        self.active_chain.get(height as usize).copied()
    }

    pub fn is_on_active_chain(&self, hash: &Hash) -> bool {
        self.entries
            .get(hash)
            .is_some_and(|entry| self.hash_at_height(entry.height) == Some(*hash))
    }

    /// Store a block on a side branch (or as the not-yet-connected child
    /// of the tip). The parent must already be in the arena.
    pub fn insert(&mut self, block: Block) -> Hash {
        let hash = block.hash();
        let parent = block.header.prev_hash;
        let height = self
            .entries
            .get(&parent)
            .expect("insert requires a known parent")
            .height
            + 1;
        self.children.entry(parent).or_default().push(hash);
        self.entries.insert(
            hash,
            BlockEntry {
                block,
                height,
                status: BlockStatus::ValidHeader,
            },
        );
        hash
    }

    /// Promote a stored block to the tip of the best chain.
    pub fn connect_tip(&mut self, hash: Hash) {
        let tip = self.tip_hash();
        let entry = self.entries.get_mut(&hash).expect("connect of unknown block");
        assert_eq!(
            entry.block.header.prev_hash, tip,
            "connect must extend the current tip"
        );
        entry.status = BlockStatus::Active;
        self.active_chain.push(hash);
    }

    /// Demote the tip back to a side-branch block and return its hash.
    pub fn disconnect_tip(&mut self) -> Hash {
        assert!(
            self.active_chain.len() > 1,
            "the genesis block cannot be disconnected"
        );
        let hash = self.active_chain.pop().expect("checked above");
        self.entries
            .get_mut(&hash)
            .expect("active block is in the arena")
            .status = BlockStatus::ValidHeader;
        hash
    }

    fn parent_of(&self, hash: &Hash) -> Hash {
        self.entries
            .get(hash)
            .expect("walk of unknown block")
            .block
            .header
            .prev_hash
    }

    fn height_of(&self, hash: &Hash) -> u32 {
        self.entries.get(hash).expect("walk of unknown block").height
    }

    /// Last common ancestor of two blocks in the arena.
    pub fn find_fork(&self, a: Hash, b: Hash) -> Hash {
        let (mut a, mut b) = (a, b);
        let (mut height_a, mut height_b) = (self.height_of(&a), self.height_of(&b));
        while height_a > height_b {
            a = self.parent_of(&a);
            height_a -= 1;
        }
        while height_b > height_a {
            b = self.parent_of(&b);
            height_b -= 1;
        }
        while a != b {
            a = self.parent_of(&a);
            b = self.parent_of(&b);
        }
        a
    }

    /// The blocks from `ancestor` (exclusive) up to `tip` (inclusive), in
    /// connect order.
    pub fn path_from_ancestor(&self, ancestor: Hash, tip: Hash) -> Vec<Hash> {
        let mut path = Vec::new();
        let mut current = tip;
        while current != ancestor {
            path.push(current);
            current = self.parent_of(&current);
        }
        path.reverse();
        path
    }

    /// Mark a block and everything building on it invalid.
    pub fn mark_subtree_invalid(&mut self, root: Hash) {
        let mut queue = vec![root];
        while let Some(hash) = queue.pop() {
            if let Some(entry) = self.entries.get_mut(&hash) {
                entry.status = BlockStatus::Invalid;
            }
            if let Some(kids) = self.children.get(&hash) {
                queue.extend(kids.iter().copied());
            }
        }
    }

    /// Best parked branch tip: the highest `ValidHeader` entry. Ties break
    /// on the lexicographically smallest hash so selection is
    /// deterministic.
    pub fn best_alternative_tip(&self) -> Option<Hash> {
        let mut best: Option<(u32, Hash)> = None;
        for (hash, entry) in &self.entries {
            if entry.status != BlockStatus::ValidHeader {
                continue;
            }
            let candidate = (entry.height, *hash);
            best = match best {
                None => Some(candidate),
                Some((height, tip)) => {
                    if candidate.0 > height || (candidate.0 == height && candidate.1 < tip) {
                        Some(candidate)
                    } else {
                        Some((height, tip))
                    }
                }
            };
        }
        best.map(|(_, hash)| hash)
    }

    pub fn block_count(&self) -> usize {
        self.entries.len()
    }
}
