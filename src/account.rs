use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type AccountId = u64;

/// Login of the user owning an account.
pub type OwnerId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceChangeKind {
    Credited,
    Debited,
}

/// Validated change to a single account balance.
///
/// Produced by [`Account::handle_credit`] / [`Account::handle_debit`], applied with
/// [`Account::apply`]. Applying never fails, all checks happen while handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceChange {
    account_id: AccountId,
    amount: Decimal,
    kind: BalanceChangeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        available: Decimal,
        requested: Decimal,
    },
    #[error("Balance of account {account_id} would overflow")]
    Overflow { account_id: AccountId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    owner_id: OwnerId,
    balance: Decimal,
}

impl Account {
    /// Fresh account with a zero balance.
    pub fn open(id: AccountId, owner_id: impl Into<OwnerId>) -> Self {
        Self {
            id,
            owner_id: owner_id.into(),
            balance: Decimal::ZERO,
        }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn apply(&mut self, change: &BalanceChange) {
        debug_assert_eq!(change.account_id, self.id);
        match change.kind {
            BalanceChangeKind::Credited => {
                self.balance += change.amount;
            }
            BalanceChangeKind::Debited => {
                self.balance -= change.amount;
            }
        }
    }

    pub fn handle_credit(&self, amount: Decimal) -> Result<BalanceChange, AccountError> {
        if self.balance.checked_add(amount).is_none() {
            return Err(AccountError::Overflow {
                account_id: self.id,
            });
        }
        Ok(BalanceChange {
            account_id: self.id,
            amount,
            kind: BalanceChangeKind::Credited,
        })
    }

    pub fn handle_debit(&self, amount: Decimal) -> Result<BalanceChange, AccountError> {
        if self.balance >= amount {
            Ok(BalanceChange {
                account_id: self.id,
                amount,
                kind: BalanceChangeKind::Debited,
            })
        } else {
            Err(AccountError::InsufficientFunds {
                available: self.balance,
                requested: amount,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::prelude::FromPrimitive;

    use super::*;

    fn funded(balance: u32) -> Account {
        Account {
            balance: Decimal::from_u32(balance).unwrap(),
            ..Account::open(7, "alice")
        }
    }

    #[test]
    fn open_starts_empty() {
        let acc = Account::open(1, "alice");
        assert_eq!(acc.id(), 1);
        assert_eq!(acc.owner_id(), "alice");
        assert_eq!(acc.balance(), Decimal::ZERO);
    }

    #[test]
    fn apply_changes() {
        let mut acc = funded(10);
        let credit = acc.handle_credit(Decimal::from_u32(5).unwrap()).unwrap();
        acc.apply(&credit);
        assert_eq!(acc.balance(), Decimal::from_u32(15).unwrap());

        let debit = acc.handle_debit(Decimal::from_u32(15).unwrap()).unwrap();
        assert_eq!(debit.kind, BalanceChangeKind::Debited);
        acc.apply(&debit);
        assert_eq!(acc.balance(), Decimal::ZERO);
    }

    #[test]
    fn debit_more_than_balance() {
        let acc = funded(100);
        let err = acc
            .handle_debit(Decimal::from_u32(150).unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            AccountError::InsufficientFunds {
                available: Decimal::from_u32(100).unwrap(),
                requested: Decimal::from_u32(150).unwrap(),
            }
        );
        assert_eq!(
            err.to_string(),
            "Insufficient funds: available 100, requested 150"
        );
    }

    #[test]
    fn credit_overflow_is_rejected() {
        let acc = Account {
            balance: Decimal::MAX,
            ..Account::open(3, "bob")
        };
        let err = acc.handle_credit(Decimal::ONE).unwrap_err();
        assert_eq!(err, AccountError::Overflow { account_id: 3 });
    }
}
