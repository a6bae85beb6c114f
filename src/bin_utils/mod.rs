//! Replays a CSV ledger script through [`crate::ledger::AccountLedger`] and
//! reports the final state. Kept in the library so integration tests can drive it.

use std::io::{Read, Write};

use crate::{
    config::LedgerConfig,
    events::EventSink,
    processor::{
        CommandProcessError, CommandProcessor, in_memory_processor::InMemoryCommandProcessor,
    },
};
use anyhow::Result;
use csv_parser::CsvCommandParser;
use csv_printer::{AccountRow, TransactionRow, print_rows};
pub mod csv_parser;
pub mod csv_printer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Report {
    /// `id,owner,balance` per account.
    #[default]
    Accounts,
    /// The full transaction log, oldest first.
    Audit,
}

pub struct Service<'w, R, W: 'w, E> {
    pub input: R,
    pub output: &'w mut W,
    pub report: Report,
    pub sink: E,
    pub config: LedgerConfig,
    pub error_printer: Box<dyn FnMut(u64, ReplayError)>,
}

/// Why a script row was not applied.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Malformed row: {0}")]
    Row(#[from] csv::Error),
    #[error(transparent)]
    Process(#[from] CommandProcessError),
}

impl<'w, R, W, E> Service<'w, R, W, E>
where
    R: Read,
    W: Write + 'w,
    E: EventSink + Clone,
{
    pub fn run(mut self) -> Result<()> {
        let parser = CsvCommandParser::new(self.input);

        let mut processor = InMemoryCommandProcessor::new(self.sink, self.config);

        for (line, row) in parser {
            let row = match row {
                Ok(row) => row,
                Err(err) => {
                    (self.error_printer)(line, err.into());
                    continue;
                }
            };
            if let Err(err) = processor.process_command(
                row.command,
                &row.subject,
                row.target.as_deref(),
                row.amount,
            ) {
                (self.error_printer)(line, err.into());
            }
        }

        let ledger = &processor.ledger;
        match self.report {
            Report::Accounts => print_rows(
                self.output,
                ledger.accounts().into_iter().map(|acc| AccountRow {
                    id: acc.id(),
                    owner: acc.owner_id().to_owned(),
                    balance: acc.balance(),
                }),
            ),
            Report::Audit => print_rows(
                self.output,
                ledger.transactions().iter().map(TransactionRow::from),
            ),
        }
    }
}
