use std::collections::HashSet;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::account::AccountId;
use crate::error::{CommitFailure, StorageFailure};

/// Exclusive per-account access for the duration of one ledger operation.
///
/// Accounts are always acquired in ascending id order, regardless of the order
/// they were requested in, so two operations touching the same pair can never
/// wait on each other in a cycle. Waiting is bounded by a timeout.
#[derive(Debug, Default)]
pub struct LockTable {
    held: Mutex<HashSet<AccountId>>,
    released: Condvar,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks every account in `ids`, duplicates are locked once.
    ///
    /// On timeout nothing stays locked.
    pub fn acquire(
        &self,
        ids: &[AccountId],
        timeout: Duration,
    ) -> Result<AccountGuard<'_>, CommitFailure> {
        let mut ordered = ids.to_vec();
        ordered.sort_unstable();
        ordered.dedup();

        let deadline = Instant::now() + timeout;
        let mut guard = AccountGuard {
            table: self,
            ids: Vec::with_capacity(ordered.len()),
        };
        for id in ordered {
            self.lock_one(id, deadline)?;
            guard.ids.push(id);
        }
        Ok(guard)
    }

    fn lock_one(&self, id: AccountId, deadline: Instant) -> Result<(), CommitFailure> {
        let mut held = self.held.lock().map_err(|_| StorageFailure::Poisoned)?;
        while held.contains(&id) {
            let now = Instant::now();
            if now >= deadline {
                return Err(CommitFailure::LockTimeout { account_id: id });
            }
            held = self
                .released
                .wait_timeout(held, deadline - now)
                .map_err(|_| StorageFailure::Poisoned)?
                .0;
        }
        held.insert(id);
        Ok(())
    }

    fn release(&self, ids: &[AccountId]) {
        // a poisoned table still has to hand the accounts back
        let mut held = match self.held.lock() {
            Ok(held) => held,
            Err(poisoned) => poisoned.into_inner(),
        };
        for id in ids {
            held.remove(id);
        }
        drop(held);
        self.released.notify_all();
    }

    #[cfg(test)]
    fn is_locked(&self, id: AccountId) -> bool {
        self.held.lock().is_ok_and(|held| held.contains(&id))
    }
}

/// Releases its accounts on drop.
#[derive(Debug)]
pub struct AccountGuard<'a> {
    table: &'a LockTable,
    ids: Vec<AccountId>,
}

impl Drop for AccountGuard<'_> {
    fn drop(&mut self) {
        self.table.release(&self.ids);
    }
}
