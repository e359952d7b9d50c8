//! Core ledger domain types.

use std::{fmt::Display, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, database_id::DatabaseId};

/// The type of a transaction journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum TransactionType {
    /// Money leaving one of the user's asset accounts.
    Withdrawal,
    /// Money entering one of the user's asset accounts.
    Deposit,
    /// Money moving between two of the user's asset accounts.
    Transfer,
}

impl TransactionType {
    /// The name stored in the `transaction_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Withdrawal => "Withdrawal",
            TransactionType::Deposit => "Deposit",
            TransactionType::Transfer => "Transfer",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Withdrawal" => Ok(TransactionType::Withdrawal),
            "Deposit" => Ok(TransactionType::Deposit),
            "Transfer" => Ok(TransactionType::Transfer),
            other => Err(Error::InvalidTransactionType(other.to_string())),
        }
    }
}

/// A currency that journals are denominated in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Currency {
    /// The ID of the currency.
    pub id: DatabaseId,
    /// ISO 4217 code, e.g. "EUR".
    pub code: String,
    /// The currency's display name, e.g. "Euro".
    pub name: String,
    /// The currency's symbol, e.g. "€".
    pub symbol: String,
    /// The number of decimal places amounts in this currency are stored with.
    pub decimal_places: u32,
}

/// A transaction journal flattened into a single row.
///
/// The amount is the destination leg of the journal, i.e. positive. Report
/// code normalizes the sign per transaction type before summing or listing.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalRow {
    /// The ID of the journal.
    pub journal_id: DatabaseId,
    /// The journal's transaction type.
    pub transaction_type: TransactionType,
    /// The date of the journal.
    pub date: Date,
    /// The journal's description.
    pub description: String,
    /// The transaction group the journal belongs to.
    pub transaction_group_id: DatabaseId,
    /// The currency the journal is denominated in.
    pub currency: Currency,
    /// The amount of the destination leg.
    pub amount: Decimal,
    /// The account the money came from.
    pub source_account_id: DatabaseId,
    /// The name of the account the money came from.
    pub source_account_name: String,
    /// The account the money went to.
    pub destination_account_id: DatabaseId,
    /// The name of the account the money went to.
    pub destination_account_name: String,
    /// The ID of the customer tagged on the journal, or 0 when there is none.
    pub customer_id: DatabaseId,
    /// The name of the customer tagged on the journal, or "" when there is none.
    pub customer_name: String,
}
