use std::io::Write;

use crate::account::AccountId;
use crate::transaction::{Transaction, TransactionId, TransactionKind};
use chrono::{DateTime, Utc};
use csv::Writer;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AccountRow {
    pub id: AccountId,
    pub owner: String,
    pub balance: Decimal,
}

#[derive(Debug, Serialize)]
pub struct TransactionRow {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub timestamp: DateTime<Utc>,
    pub account: AccountId,
    pub counterparty: Option<AccountId>,
    pub amount: Decimal,
    pub commission: Decimal,
}

impl From<&Transaction> for TransactionRow {
    fn from(tx: &Transaction) -> Self {
        let (account, counterparty) = match tx {
            Transaction::Deposit { account_id, .. } | Transaction::Withdrawal { account_id, .. } => {
                (*account_id, None)
            }
            Transaction::Transfer {
                sender_account_id,
                receiver_account_id,
                ..
            } => (*sender_account_id, Some(*receiver_account_id)),
        };
        Self {
            id: tx.id(),
            kind: tx.kind(),
            timestamp: tx.timestamp(),
            account,
            counterparty,
            amount: tx.amount(),
            commission: tx.commission(),
        }
    }
}

pub fn print_rows<W, T>(output: &mut W, rows: impl Iterator<Item = T>) -> anyhow::Result<()>
where
    W: Write,
    T: Serialize,
{
    let mut writer = Writer::from_writer(output);
    for row in rows {
        if let Err(err) = writer.serialize(row) {
            anyhow::bail!("Failed to write to CSV: {err}")
        }
    }
    // Ensure all data is flushed to the output
    if let Err(err) = writer.flush() {
        anyhow::bail!("Failed to flush CSV writer: {err}")
    }
    Ok(())
}
