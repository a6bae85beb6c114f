use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    command::{CommandError, CommandKind},
    directory::RegistryError,
    error::LedgerError,
};

pub mod in_memory_processor;

#[derive(Debug, Error)]
pub enum CommandProcessError {
    #[error(transparent)]
    CommandErr(#[from] CommandError),
    #[error(transparent)]
    RegistryErr(#[from] RegistryError),
    #[error(transparent)]
    LedgerErr(#[from] LedgerError),
}

pub trait CommandProcessor {
    fn process_command(
        &mut self,
        kind: CommandKind,
        subject: &str,
        target: Option<&str>,
        amount: Option<Decimal>,
    ) -> Result<(), CommandProcessError>;
}
