use rust_decimal::Decimal;

use crate::{
    command::{CommandKind, LedgerCommand},
    config::LedgerConfig,
    directory::UserRegistry,
    error::LedgerError,
    events::{EventSink, NullEventSink},
    ledger::{AccountLedger, InMemoryLedger},
};

use super::{CommandProcessError, CommandProcessor};

/// Drives an [`InMemoryLedger`] and its [`UserRegistry`] from parsed commands.
/// Account and client events go to the same sink.
pub struct InMemoryCommandProcessor<E = NullEventSink> {
    pub ledger: InMemoryLedger<E, E>,
}

impl<E: EventSink + Clone> InMemoryCommandProcessor<E> {
    pub fn new(sink: E, config: LedgerConfig) -> Self {
        Self {
            ledger: AccountLedger::in_memory(UserRegistry::with_sink(sink.clone()), sink, config),
        }
    }
}

impl Default for InMemoryCommandProcessor {
    fn default() -> Self {
        Self::new(NullEventSink, LedgerConfig::default())
    }
}

impl<E> CommandProcessor for InMemoryCommandProcessor<E>
where
    E: EventSink,
{
    fn process_command(
        &mut self,
        kind: CommandKind,
        subject: &str,
        target: Option<&str>,
        amount: Option<Decimal>,
    ) -> Result<(), CommandProcessError> {
        let users = self.ledger.directory();
        match LedgerCommand::parse_command(kind, subject, target, amount)? {
            LedgerCommand::RegisterUser { login } => users.register(login)?,
            LedgerCommand::AddFriend { login, friend } => users.add_friend(&login, &friend)?,
            LedgerCommand::RemoveFriend { login, friend } => {
                users.remove_friend(&login, &friend)?
            }
            LedgerCommand::OpenAccount { owner_id } => {
                self.ledger
                    .create_account(&owner_id)
                    .map_err(LedgerError::from)?;
            }
            LedgerCommand::Deposit { account_id, amount } => {
                self.ledger
                    .deposit(account_id, amount)
                    .map_err(LedgerError::from)?;
            }
            LedgerCommand::Withdraw { account_id, amount } => {
                self.ledger
                    .withdraw(account_id, amount)
                    .map_err(LedgerError::from)?;
            }
            LedgerCommand::Transfer {
                from_id,
                to_id,
                amount,
            } => {
                self.ledger
                    .transfer(from_id, to_id, amount)
                    .map_err(LedgerError::from)?;
            }
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::prelude::FromPrimitive;

    use crate::{
        command::CommandError,
        error::{TransferError, WithdrawError},
        events::{EventHistory, EventName},
        transaction::TransactionKind,
    };

    use super::*;

    #[test]
    fn process_some_commands() {
        let mut processor = InMemoryCommandProcessor::default();
        processor
            .process_command(CommandKind::User, "alice", None, None)
            .unwrap();
        processor
            .process_command(CommandKind::User, "bob", None, None)
            .unwrap();
        processor
            .process_command(CommandKind::Friend, "alice", Some("bob"), None)
            .unwrap();
        processor
            .process_command(CommandKind::Open, "alice", None, None)
            .unwrap();
        processor
            .process_command(CommandKind::Open, "bob", None, None)
            .unwrap();
        processor
            .process_command(
                CommandKind::Deposit,
                "1",
                None,
                Some(Decimal::from_u32(200).unwrap()),
            )
            .unwrap();
        processor
            .process_command(
                CommandKind::Transfer,
                "1",
                Some("2"),
                Some(Decimal::from_u32(100).unwrap()),
            )
            .unwrap();

        let ledger = &processor.ledger;
        assert_eq!(ledger.accounts().len(), 2);
        assert_eq!(
            ledger.account(1).unwrap().balance(),
            Decimal::from_u32(97).unwrap()
        );
        assert_eq!(
            ledger.account(2).unwrap().balance(),
            Decimal::from_u32(100).unwrap()
        );
        assert_eq!(ledger.transactions_of(2, TransactionKind::Transfer).len(), 1);

        let err = processor
            .process_command(
                CommandKind::Withdraw,
                "2",
                None,
                Some(Decimal::from_u32(500).unwrap()),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            CommandProcessError::LedgerErr(LedgerError::Withdraw(
                WithdrawError::InsufficientFunds { .. }
            ))
        ));

        let err = processor
            .process_command(CommandKind::Transfer, "1", Some("9"), Some(Decimal::ONE))
            .unwrap_err();
        assert!(matches!(
            err,
            CommandProcessError::LedgerErr(LedgerError::Transfer(
                TransferError::AccountNotFound { account_id: 9 }
            ))
        ));

        let err = processor
            .process_command(CommandKind::Deposit, "1", None, None)
            .unwrap_err();
        assert!(matches!(
            err,
            CommandProcessError::CommandErr(CommandError::AmountRequired {
                kind: CommandKind::Deposit
            })
        ));
    }

    #[test]
    fn registry_and_ledger_share_the_sink() {
        let history = Arc::new(EventHistory::new());
        let mut processor = InMemoryCommandProcessor::new(history.clone(), LedgerConfig::default());
        for (kind, subject, target) in [
            (CommandKind::User, "alice", None),
            (CommandKind::User, "bob", None),
            (CommandKind::Friend, "alice", Some("bob")),
            (CommandKind::Unfriend, "bob", Some("alice")),
            (CommandKind::Open, "alice", None),
        ] {
            processor
                .process_command(kind, subject, target, None)
                .unwrap();
        }

        let names: Vec<_> = history
            .client_events("bob")
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(
            names,
            [
                EventName::UserRegistered,
                EventName::FriendAdded,
                EventName::FriendRemoved
            ]
        );
        let opened = history.account_events(1);
        assert_eq!(opened.len(), 1);
        assert_eq!(opened[0].name, EventName::AccountCreated);
    }
}
