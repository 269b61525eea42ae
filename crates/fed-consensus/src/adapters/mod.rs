//! In-process adapters for the outbound ports.

use shared_types::Block;

use crate::ports::TransactionValidator;

/// Transaction validator with fixed behavior, for wiring environments
/// that have no script engine attached (tools, simulations, tests). A
/// real node plugs its script/sighash evaluator into the port instead.
#[derive(Debug, Clone)]
pub struct StaticTransactionValidator {
    /// Sigops attributed to each transaction.
    pub sig_ops_per_tx: u64,
    /// When set, every block body fails with this reason.
    pub reject_with: Option<String>,
}

impl Default for StaticTransactionValidator {
    fn default() -> Self {
        Self {
            sig_ops_per_tx: 1,
            reject_with: None,
        }
    }
}

impl TransactionValidator for StaticTransactionValidator {
    fn count_sig_ops(&self, block: &Block) -> u64 {
        block.transactions.len() as u64 * self.sig_ops_per_tx
    }

    fn check_transactions(&self, _block: &Block) -> Result<(), String> {
        match &self.reject_with {
            None => Ok(()),
            Some(reason) => Err(reason.clone()),
        }
    }
}
