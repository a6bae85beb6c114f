use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account::AccountId;

/// Time-ordered (UUID v7) transaction identifier.
pub type TransactionId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Transfer,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
            TransactionKind::Transfer => "transfer",
        })
    }
}

/// Immutable record of a committed balance mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Transaction {
    Deposit {
        id: TransactionId,
        amount: Decimal,
        timestamp: DateTime<Utc>,
        account_id: AccountId,
    },
    Withdrawal {
        id: TransactionId,
        amount: Decimal,
        timestamp: DateTime<Utc>,
        account_id: AccountId,
    },
    Transfer {
        id: TransactionId,
        amount: Decimal,
        timestamp: DateTime<Utc>,
        sender_account_id: AccountId,
        receiver_account_id: AccountId,
        commission: Decimal,
    },
}

impl Transaction {
    pub fn deposit(account_id: AccountId, amount: Decimal) -> Self {
        Self::Deposit {
            id: Uuid::now_v7(),
            amount,
            timestamp: Utc::now(),
            account_id,
        }
    }

    pub fn withdrawal(account_id: AccountId, amount: Decimal) -> Self {
        Self::Withdrawal {
            id: Uuid::now_v7(),
            amount,
            timestamp: Utc::now(),
            account_id,
        }
    }

    pub fn transfer(
        sender_account_id: AccountId,
        receiver_account_id: AccountId,
        amount: Decimal,
        commission: Decimal,
    ) -> Self {
        Self::Transfer {
            id: Uuid::now_v7(),
            amount,
            timestamp: Utc::now(),
            sender_account_id,
            receiver_account_id,
            commission,
        }
    }

    pub fn id(&self) -> TransactionId {
        match self {
            Transaction::Deposit { id, .. }
            | Transaction::Withdrawal { id, .. }
            | Transaction::Transfer { id, .. } => *id,
        }
    }

    pub fn kind(&self) -> TransactionKind {
        match self {
            Transaction::Deposit { .. } => TransactionKind::Deposit,
            Transaction::Withdrawal { .. } => TransactionKind::Withdrawal,
            Transaction::Transfer { .. } => TransactionKind::Transfer,
        }
    }

    pub fn amount(&self) -> Decimal {
        match self {
            Transaction::Deposit { amount, .. }
            | Transaction::Withdrawal { amount, .. }
            | Transaction::Transfer { amount, .. } => *amount,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Transaction::Deposit { timestamp, .. }
            | Transaction::Withdrawal { timestamp, .. }
            | Transaction::Transfer { timestamp, .. } => *timestamp,
        }
    }

    /// Zero for deposits and withdrawals.
    pub fn commission(&self) -> Decimal {
        match self {
            Transaction::Transfer { commission, .. } => *commission,
            Transaction::Deposit { .. } | Transaction::Withdrawal { .. } => Decimal::ZERO,
        }
    }

    /// Transfers involve both the sender and the receiver.
    pub fn involves(&self, account: AccountId) -> bool {
        match self {
            Transaction::Deposit { account_id, .. } | Transaction::Withdrawal { account_id, .. } => {
                *account_id == account
            }
            Transaction::Transfer {
                sender_account_id,
                receiver_account_id,
                ..
            } => *sender_account_id == account || *receiver_account_id == account,
        }
    }
}
