//! Shared mutable chain state.
//!
//! The one piece of shared state in the subsystem. All writes (connect,
//! disconnect, invalidate) go through a single exclusive lock held by the
//! service layer; reads run concurrently with each other.

use parking_lot::RwLock;

use crate::domain::{ChainHead, ChainIndex, FederationSnapshot, XFieldHistory};

/// Chain index plus the federation history it mirrors. The two move in
/// lockstep: every connect/disconnect updates both under one write lock,
/// so readers can never observe them disagreeing.
#[derive(Debug)]
pub struct ChainState {
    pub index: ChainIndex,
    pub history: XFieldHistory,
}

/// Lock cell around [`ChainState`].
pub struct ChainStateCell {
    pub chain: RwLock<ChainState>,
}

impl ChainStateCell {
    pub fn new(state: ChainState) -> Self {
        Self {
            chain: RwLock::new(state),
        }
    }

    pub fn head(&self) -> ChainHead {
        self.chain.read().index.head()
    }

    pub fn snapshot(&self) -> FederationSnapshot {
        self.chain.read().history.snapshot()
    }
}
