use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::account::{Account, AccountId};
use crate::error::StorageFailure;

/// Persistence of accounts. Enforces no business invariants.
pub trait AccountStore: Send + Sync {
    /// Persists a new zero-balance account under a fresh id.
    fn create(&self, owner_id: &str) -> Result<Account, StorageFailure>;

    fn get(&self, id: AccountId) -> Option<Account>;

    fn save(&self, account: Account) -> Result<Account, StorageFailure>;

    /// Ordered by id.
    fn all(&self) -> Vec<Account>;
}

#[derive(Debug, Default)]
struct StoreState {
    last_id: AccountId,
    accounts: BTreeMap<AccountId, Account>,
}

/// Table-backed store, ids start at 1.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    inner: RwLock<StoreState>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn create(&self, owner_id: &str) -> Result<Account, StorageFailure> {
        let mut state = self.inner.write().map_err(|_| StorageFailure::Poisoned)?;
        state.last_id += 1;
        let account = Account::open(state.last_id, owner_id);
        state.accounts.insert(account.id(), account.clone());
        Ok(account)
    }

    fn get(&self, id: AccountId) -> Option<Account> {
        self.inner.read().ok()?.accounts.get(&id).cloned()
    }

    fn save(&self, account: Account) -> Result<Account, StorageFailure> {
        let mut state = self.inner.write().map_err(|_| StorageFailure::Poisoned)?;
        state.accounts.insert(account.id(), account.clone());
        Ok(account)
    }

    fn all(&self) -> Vec<Account> {
        self.inner
            .read()
            .map(|state| state.accounts.values().cloned().collect())
            .unwrap_or_default()
    }
}
