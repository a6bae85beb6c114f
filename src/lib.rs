/// Account data and balance changes.
/// Balances are modified by applying changes, which are created by validating amounts
pub mod account;

/// Transaction records: the immutable audit trail of every mutation.
pub mod transaction;

/// Commission tiers for transfers, picked from the owners' relationship.
pub mod commission;

/// Users and friendships, the owner-existence and relationship lookups used by the ledger.
pub mod directory;

/// Account persistence interface, plus "in memory" implementation.
pub mod store;

/// Append-only transaction log interface, plus "in memory" implementation.
pub mod recorder;

/// Best-effort notifications about committed mutations.
pub mod events;

/// Ordered, bounded-wait exclusive access to accounts.
pub mod locks;

/// Deposit, withdrawal and transfer orchestration.
/// The only place balances are changed.
pub mod ledger;

pub mod error;

pub mod config;

/// Ledger commands parsed from scripts, later executed by [`processor`].
pub mod command;

/// Command processor interface, plus "in memory" implementation.
/// Coordinates command parsing and dispatch to the ledger
pub mod processor;

/// Bootstraps the ledger from a CSV script. Lives in the library so that
/// integration tests can use it.
pub mod bin_utils;

pub use account::{Account, AccountId, OwnerId};
pub use error::{
    CommitFailure, CreateAccountError, DepositError, LedgerError, StorageFailure, TransferError,
    WithdrawError,
};
pub use ledger::{AccountLedger, InMemoryLedger};
pub use transaction::{Transaction, TransactionKind};
