//! # Domain Layer
//!
//! Pure consensus logic: parameter policy, the federation history tracker
//! and the block arena. No I/O, no locks; shared-state concerns live in
//! [`crate::state`] and orchestration in [`crate::service`].

pub mod chain;
pub mod error;
pub mod history;
pub mod policy;

pub use chain::{BlockEntry, BlockStatus, ChainHead, ChainIndex};
pub use error::{ConsensusError, ConsensusResult};
pub use history::{ActivationRecord, FederationSnapshot, KeyChange, SizeChange, XFieldHistory};
