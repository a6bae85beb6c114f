use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::account::{AccountId, OwnerId};

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    User,
    Friend,
    Unfriend,
    Open,
    Deposit,
    Withdraw,
    Transfer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCommand {
    RegisterUser {
        login: OwnerId,
    },
    AddFriend {
        login: OwnerId,
        friend: OwnerId,
    },
    RemoveFriend {
        login: OwnerId,
        friend: OwnerId,
    },
    OpenAccount {
        owner_id: OwnerId,
    },
    Deposit {
        account_id: AccountId,
        amount: Decimal,
    },
    Withdraw {
        account_id: AccountId,
        amount: Decimal,
    },
    Transfer {
        from_id: AccountId,
        to_id: AccountId,
        amount: Decimal,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Amount is required for {kind:?}")]
    AmountRequired { kind: CommandKind },
    #[error("Amount is not expected for {kind:?}")]
    UnexpectedAmount { kind: CommandKind },
    #[error("Target is required for {kind:?}")]
    TargetRequired { kind: CommandKind },
    #[error("`{value}` is not a valid account id")]
    InvalidAccountId { value: String },
}

impl LedgerCommand {
    /// Builds a command from the loosely typed fields of a script row.
    ///
    /// Only the row shape is checked here; amounts are validated by the ledger.
    pub fn parse_command(
        kind: CommandKind,
        subject: &str,
        target: Option<&str>,
        amount: Option<Decimal>,
    ) -> Result<Self, CommandError> {
        match kind {
            CommandKind::User => {
                Self::no_amount(kind, amount)?;
                Ok(Self::RegisterUser {
                    login: subject.to_owned(),
                })
            }
            CommandKind::Friend => {
                Self::no_amount(kind, amount)?;
                Ok(Self::AddFriend {
                    login: subject.to_owned(),
                    friend: Self::target(kind, target)?.to_owned(),
                })
            }
            CommandKind::Unfriend => {
                Self::no_amount(kind, amount)?;
                Ok(Self::RemoveFriend {
                    login: subject.to_owned(),
                    friend: Self::target(kind, target)?.to_owned(),
                })
            }
            CommandKind::Open => {
                Self::no_amount(kind, amount)?;
                Ok(Self::OpenAccount {
                    owner_id: subject.to_owned(),
                })
            }
            CommandKind::Deposit => Ok(Self::Deposit {
                account_id: Self::account_id(subject)?,
                amount: Self::amount(kind, amount)?,
            }),
            CommandKind::Withdraw => Ok(Self::Withdraw {
                account_id: Self::account_id(subject)?,
                amount: Self::amount(kind, amount)?,
            }),
            CommandKind::Transfer => Ok(Self::Transfer {
                from_id: Self::account_id(subject)?,
                to_id: Self::account_id(Self::target(kind, target)?)?,
                amount: Self::amount(kind, amount)?,
            }),
        }
    }

    fn account_id(value: &str) -> Result<AccountId, CommandError> {
        value.parse().map_err(|_| CommandError::InvalidAccountId {
            value: value.to_owned(),
        })
    }

    fn target(kind: CommandKind, target: Option<&str>) -> Result<&str, CommandError> {
        target
            .filter(|t| !t.is_empty())
            .ok_or(CommandError::TargetRequired { kind })
    }

    fn amount(kind: CommandKind, amount: Option<Decimal>) -> Result<Decimal, CommandError> {
        amount.ok_or(CommandError::AmountRequired { kind })
    }

    fn no_amount(kind: CommandKind, amount: Option<Decimal>) -> Result<(), CommandError> {
        match amount {
            Some(_) => Err(CommandError::UnexpectedAmount { kind }),
            None => Ok(()),
        }
    }
}
