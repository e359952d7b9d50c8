//! The ledger subsystem: currencies, accounts, transaction journals and their
//! signed transaction legs.
//!
//! Customers tag journals (and individual legs) through join tables owned by
//! the customer module; this module owns the ledger tables themselves and the
//! query code that flattens journals into rows for the reports and the
//! customer show pages.

mod collector;
mod db;
mod domain;

pub use collector::{JournalQuery, collect_journals};
pub use db::{
    create_account, create_currency, create_ledger_tables, create_transaction_journal,
};
pub use domain::{Currency, JournalRow, TransactionType};
