use rust_decimal::Decimal;
use tracing::{debug, error, info, instrument, warn};

use crate::account::{Account, AccountError, AccountId};
use crate::commission::CommissionCalculator;
use crate::config::LedgerConfig;
use crate::directory::{OwnerDirectory, RelationshipOracle, UserRegistry};
use crate::error::{
    CommitFailure, CreateAccountError, DepositError, TransferError, WithdrawError,
};
use crate::events::{EventName, EventSink, LedgerEvent, NullEventSink, Subject};
use crate::locks::LockTable;
use crate::recorder::{InMemoryTransactionRecorder, TransactionRecorder};
use crate::store::{AccountStore, InMemoryAccountStore};
use crate::transaction::{Transaction, TransactionKind};

/// Ledger wired to the in-memory collaborators. `E` receives account events,
/// `U` the client events of the user registry.
pub type InMemoryLedger<E = NullEventSink, U = NullEventSink> =
    AccountLedger<InMemoryAccountStore, InMemoryTransactionRecorder, UserRegistry<U>, E>;

/// Account before and after a mutation.
struct Pending {
    original: Account,
    updated: Account,
}

/// The only component allowed to change balances.
///
/// Every mutation holds exclusive access to the accounts it touches from
/// validation until the transaction record is appended. If any write fails,
/// the accounts already saved are restored before the locks are released.
/// Events are published after the locks are released and their failures are
/// only logged.
pub struct AccountLedger<S, R, D, E> {
    store: S,
    recorder: R,
    directory: D,
    sink: E,
    locks: LockTable,
    config: LedgerConfig,
}

impl<D, E> AccountLedger<InMemoryAccountStore, InMemoryTransactionRecorder, D, E> {
    pub fn in_memory(directory: D, sink: E, config: LedgerConfig) -> Self {
        Self::new(
            InMemoryAccountStore::new(),
            InMemoryTransactionRecorder::new(),
            directory,
            sink,
            config,
        )
    }
}

impl<S, R, D, E> AccountLedger<S, R, D, E> {
    pub fn new(store: S, recorder: R, directory: D, sink: E, config: LedgerConfig) -> Self {
        Self {
            store,
            recorder,
            directory,
            sink,
            locks: LockTable::new(),
            config,
        }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }
}

impl<S, R, D, E> AccountLedger<S, R, D, E>
where
    S: AccountStore,
    R: TransactionRecorder,
    D: OwnerDirectory + RelationshipOracle,
    E: EventSink,
{
    #[instrument(skip(self))]
    pub fn create_account(&self, owner_id: &str) -> Result<Account, CreateAccountError> {
        if !self.directory.owner_exists(owner_id) {
            return Err(CreateAccountError::UserNotFound {
                owner_id: owner_id.to_owned(),
            });
        }
        let account = self
            .store
            .create(owner_id)
            .map_err(CommitFailure::from)?;
        info!(account_id = account.id(), "account created");

        self.notify(
            Subject::account(account.id()),
            &LedgerEvent::new(EventName::AccountCreated, vec![account.clone()], None),
        );
        Ok(account)
    }

    /// A zero amount is accepted: the balance stays, the deposit is still recorded.
    #[instrument(skip(self))]
    pub fn deposit(
        &self,
        account_id: AccountId,
        amount: Decimal,
    ) -> Result<Transaction, DepositError> {
        if amount < Decimal::ZERO {
            return Err(DepositError::NegativeAmount);
        }
        let guard = self.locks.acquire(&[account_id], self.config.lock_timeout)?;

        let account = self
            .store
            .get(account_id)
            .ok_or(DepositError::AccountNotFound { account_id })?;
        let change = account
            .handle_credit(amount)
            .map_err(|_| CommitFailure::Overflow)?;
        let mut updated = account.clone();
        updated.apply(&change);

        let transaction = Transaction::deposit(account_id, amount);
        let accounts = self.commit(
            vec![Pending {
                original: account,
                updated,
            }],
            &transaction,
        )?;
        drop(guard);
        debug!(%amount, "deposit committed");

        self.notify(
            Subject::account(account_id),
            &LedgerEvent::new(EventName::Deposited, accounts, Some(transaction.clone())),
        );
        Ok(transaction)
    }

    /// Same zero-amount policy as [`Self::deposit`].
    #[instrument(skip(self))]
    pub fn withdraw(
        &self,
        account_id: AccountId,
        amount: Decimal,
    ) -> Result<Transaction, WithdrawError> {
        if amount < Decimal::ZERO {
            return Err(WithdrawError::NegativeAmount);
        }
        let guard = self.locks.acquire(&[account_id], self.config.lock_timeout)?;

        let account = self
            .store
            .get(account_id)
            .ok_or(WithdrawError::AccountNotFound { account_id })?;
        let change = account.handle_debit(amount).map_err(|err| match err {
            AccountError::InsufficientFunds {
                available,
                requested,
            } => WithdrawError::InsufficientFunds {
                available,
                requested,
            },
            AccountError::Overflow { .. } => CommitFailure::Overflow.into(),
        })?;
        let mut updated = account.clone();
        updated.apply(&change);

        let transaction = Transaction::withdrawal(account_id, amount);
        let accounts = self.commit(
            vec![Pending {
                original: account,
                updated,
            }],
            &transaction,
        )?;
        drop(guard);
        debug!(%amount, "withdrawal committed");

        self.notify(
            Subject::account(account_id),
            &LedgerEvent::new(EventName::Withdrawn, accounts, Some(transaction.clone())),
        );
        Ok(transaction)
    }

    /// Moves `amount` from `from_id` to `to_id`; the sender also pays the commission.
    #[instrument(skip(self))]
    pub fn transfer(
        &self,
        from_id: AccountId,
        to_id: AccountId,
        amount: Decimal,
    ) -> Result<Transaction, TransferError> {
        if amount < Decimal::ZERO {
            return Err(TransferError::NegativeAmount);
        }
        let guard = self
            .locks
            .acquire(&[from_id, to_id], self.config.lock_timeout)?;

        let from = self
            .store
            .get(from_id)
            .ok_or(TransferError::AccountNotFound {
                account_id: from_id,
            })?;
        let to = self
            .store
            .get(to_id)
            .ok_or(TransferError::AccountNotFound { account_id: to_id })?;
        for account in [&from, &to] {
            if !self.directory.owner_exists(account.owner_id()) {
                return Err(TransferError::OwnerNotFound {
                    account_id: account.id(),
                });
            }
        }

        let commission = CommissionCalculator::new(&self.directory)
            .calculate(from.owner_id(), to.owner_id(), amount)
            .ok_or(CommitFailure::Overflow)?;
        // no balance can exceed Decimal::MAX, so a debit that overflows is never covered
        let debit = amount
            .checked_add(commission.amount)
            .ok_or(TransferError::InsufficientFunds {
                available: from.balance(),
                requested: amount,
            })?;
        // the reported request is the transfer amount, not the debit with commission
        let debit_change = from.handle_debit(debit).map_err(|err| match err {
            AccountError::InsufficientFunds { available, .. } => TransferError::InsufficientFunds {
                available,
                requested: amount,
            },
            AccountError::Overflow { .. } => CommitFailure::Overflow.into(),
        })?;

        let mut pending = Vec::with_capacity(2);
        if from_id == to_id {
            let mut updated = from.clone();
            updated.apply(&debit_change);
            let credit_change = updated
                .handle_credit(amount)
                .map_err(|_| CommitFailure::Overflow)?;
            updated.apply(&credit_change);
            pending.push(Pending {
                original: from,
                updated,
            });
        } else {
            let credit_change = to
                .handle_credit(amount)
                .map_err(|_| CommitFailure::Overflow)?;
            let mut from_updated = from.clone();
            from_updated.apply(&debit_change);
            let mut to_updated = to.clone();
            to_updated.apply(&credit_change);
            pending.push(Pending {
                original: from,
                updated: from_updated,
            });
            pending.push(Pending {
                original: to,
                updated: to_updated,
            });
        }

        let transaction = Transaction::transfer(from_id, to_id, amount, commission.amount);
        let accounts = self.commit(pending, &transaction)?;
        drop(guard);
        debug!(%amount, commission = %commission.amount, tier = ?commission.tier, "transfer committed");

        let event = LedgerEvent::new(EventName::Transferred, accounts, Some(transaction.clone()));
        self.notify(Subject::account(from_id), &event);
        self.notify(Subject::account(to_id), &event);
        Ok(transaction)
    }

    pub fn account(&self, id: AccountId) -> Option<Account> {
        self.store.get(id)
    }

    pub fn accounts(&self) -> Vec<Account> {
        self.store.all()
    }

    pub fn accounts_of(&self, owner_id: &str) -> Vec<Account> {
        self.store
            .all()
            .into_iter()
            .filter(|account| account.owner_id() == owner_id)
            .collect()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.recorder.all_transactions()
    }

    pub fn transactions_of(&self, account_id: AccountId, kind: TransactionKind) -> Vec<Transaction> {
        self.recorder.by_account_and_type(account_id, kind)
    }

    /// Saves every account, then appends the record.
    ///
    /// Must be called with all touched accounts locked. On failure the
    /// accounts saved so far are restored to their originals.
    fn commit(
        &self,
        pending: Vec<Pending>,
        transaction: &Transaction,
    ) -> Result<Vec<Account>, CommitFailure> {
        let mut saved: Vec<&Account> = Vec::with_capacity(pending.len());
        let mut committed = Vec::with_capacity(pending.len());
        for change in &pending {
            match self.store.save(change.updated.clone()) {
                Ok(account) => {
                    saved.push(&change.original);
                    committed.push(account);
                }
                Err(err) => {
                    self.restore(&saved);
                    return Err(err.into());
                }
            }
        }
        if let Err(err) = self.recorder.record(transaction.clone()) {
            self.restore(&saved);
            return Err(err.into());
        }
        Ok(committed)
    }

    fn restore(&self, originals: &[&Account]) {
        for original in originals.iter().rev() {
            if let Err(err) = self.store.save((*original).clone()) {
                error!(
                    account_id = original.id(),
                    %err,
                    "failed to restore account after aborted commit, balance is inconsistent"
                );
            }
        }
    }

    fn notify(&self, subject: Subject, event: &LedgerEvent) {
        if let Err(err) = self.sink.publish(&subject, event) {
            warn!(%subject, %err, "failed to publish ledger event");
        }
    }
}
