use rust_decimal::Decimal;
use thiserror::Error;

use crate::account::{AccountId, OwnerId};

/// Failure of a persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageFailure {
    #[error("Storage is unavailable: {0}")]
    Unavailable(String),
    #[error("Storage lock is poisoned")]
    Poisoned,
}

/// Reasons an operation failed after validation passed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitFailure {
    #[error(transparent)]
    Storage(#[from] StorageFailure),
    #[error("Timed out waiting for exclusive access to account {account_id}")]
    LockTimeout { account_id: AccountId },
    #[error("Arithmetic overflow while computing balances")]
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateAccountError {
    #[error("User `{owner_id}` does not exist")]
    UserNotFound { owner_id: OwnerId },
    #[error("Account creation failed: {0}")]
    Failed(#[from] CommitFailure),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DepositError {
    #[error("Amount must not be negative")]
    NegativeAmount,
    #[error("Account {account_id} does not exist")]
    AccountNotFound { account_id: AccountId },
    #[error("Deposit failed: {0}")]
    Failed(#[from] CommitFailure),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WithdrawError {
    #[error("Amount must not be negative")]
    NegativeAmount,
    #[error("Account {account_id} does not exist")]
    AccountNotFound { account_id: AccountId },
    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        available: Decimal,
        requested: Decimal,
    },
    #[error("Withdrawal failed: {0}")]
    Failed(#[from] CommitFailure),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("Amount must not be negative")]
    NegativeAmount,
    #[error("Account {account_id} does not exist")]
    AccountNotFound { account_id: AccountId },
    #[error("Owner of account {account_id} cannot be resolved")]
    OwnerNotFound { account_id: AccountId },
    /// `requested` is the transfer amount, without commission.
    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        available: Decimal,
        requested: Decimal,
    },
    #[error("Transfer failed: {0}")]
    Failed(#[from] CommitFailure),
}

/// Any ledger operation outcome, for callers driving mixed commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error(transparent)]
    CreateAccount(#[from] CreateAccountError),
    #[error(transparent)]
    Deposit(#[from] DepositError),
    #[error(transparent)]
    Withdraw(#[from] WithdrawError),
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

impl LedgerError {
    /// `true` for failures after validation (storage, lock timeouts, overflow).
    pub fn is_commit_failure(&self) -> bool {
        matches!(
            self,
            LedgerError::CreateAccount(CreateAccountError::Failed(_))
                | LedgerError::Deposit(DepositError::Failed(_))
                | LedgerError::Withdraw(WithdrawError::Failed(_))
                | LedgerError::Transfer(TransferError::Failed(_))
        )
    }
}
