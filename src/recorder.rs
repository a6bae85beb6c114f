use std::sync::RwLock;

use crate::account::AccountId;
use crate::error::StorageFailure;
use crate::transaction::{Transaction, TransactionKind};

/// Append-only audit trail of committed mutations.
pub trait TransactionRecorder: Send + Sync {
    fn record(&self, transaction: Transaction) -> Result<(), StorageFailure>;

    /// Every record, oldest first.
    fn all_transactions(&self) -> Vec<Transaction>;

    /// Deposits/withdrawals of `account_id`, or transfers where it is either side.
    fn by_account_and_type(&self, account_id: AccountId, kind: TransactionKind)
    -> Vec<Transaction>;
}

#[derive(Debug, Default)]
pub struct InMemoryTransactionRecorder {
    log: RwLock<Vec<Transaction>>,
}

impl InMemoryTransactionRecorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransactionRecorder for InMemoryTransactionRecorder {
    fn record(&self, transaction: Transaction) -> Result<(), StorageFailure> {
        let mut log = self.log.write().map_err(|_| StorageFailure::Poisoned)?;
        // appends from concurrent callers can race, keep the log sorted by time
        let pos = log.partition_point(|tx| tx.timestamp() <= transaction.timestamp());
        log.insert(pos, transaction);
        Ok(())
    }

    fn all_transactions(&self) -> Vec<Transaction> {
        self.log.read().map(|log| log.clone()).unwrap_or_default()
    }

    fn by_account_and_type(
        &self,
        account_id: AccountId,
        kind: TransactionKind,
    ) -> Vec<Transaction> {
        self.log
            .read()
            .map(|log| {
                log.iter()
                    .filter(|tx| tx.kind() == kind && tx.involves(account_id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
