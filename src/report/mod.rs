//! Read-only reports that break down journals per currency and per customer.
//!
//! All report output groups by currency first, then by customer. Sums use
//! [rust_decimal::Decimal] so that currency totals are exact, including for
//! currencies with three or more decimal places.

mod no_customer;
mod operations;
mod page;

use std::collections::HashMap;

use rust_decimal::Decimal;
use time::Date;

use crate::{customer::CustomerId, database_id::DatabaseId, journal::JournalRow};

pub use no_customer::{
    NoCustomerListing, NoCustomerListings, no_customer_list_expenses, no_customer_list_income,
    no_customer_sum_expenses, no_customer_sum_income, no_customer_sum_transfers,
};
pub use operations::{
    list_expenses, list_income, list_transferred_in, list_transferred_out, sum_expenses,
    sum_income, sum_transfers,
};
pub use page::get_report_page;

/// The display name used for the bucket of journals without a customer.
pub const NO_CUSTOMER_NAME: &str = "(no customer)";

/// A per-currency sum.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencySum {
    pub currency_id: DatabaseId,
    pub currency_name: String,
    pub currency_symbol: String,
    pub currency_code: String,
    pub currency_decimal_places: u32,
    pub sum: Decimal,
}

impl CurrencySum {
    fn new(journal: &JournalRow) -> Self {
        Self {
            currency_id: journal.currency.id,
            currency_name: journal.currency.name.clone(),
            currency_symbol: journal.currency.symbol.clone(),
            currency_code: journal.currency.code.clone(),
            currency_decimal_places: journal.currency.decimal_places,
            sum: Decimal::ZERO,
        }
    }
}

/// A journal listed in a per-customer report, with only the fields the report
/// views need.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalDetail {
    pub amount: Decimal,
    pub date: Date,
    pub source_account_id: DatabaseId,
    pub source_account_name: String,
    pub destination_account_id: DatabaseId,
    pub destination_account_name: String,
    pub description: String,
    pub transaction_group_id: DatabaseId,
}

impl JournalDetail {
    fn new(journal: &JournalRow, amount: Decimal) -> Self {
        Self {
            amount,
            date: journal.date,
            source_account_id: journal.source_account_id,
            source_account_name: journal.source_account_name.clone(),
            destination_account_id: journal.destination_account_id,
            destination_account_name: journal.destination_account_name.clone(),
            description: journal.description.clone(),
            transaction_group_id: journal.transaction_group_id,
        }
    }
}

/// One customer's journals within a currency group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CustomerJournals {
    pub id: CustomerId,
    pub name: String,
    /// Keyed by journal ID.
    pub transaction_journals: HashMap<DatabaseId, JournalDetail>,
}

/// One currency's customers and their journals.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyListing {
    pub currency_id: DatabaseId,
    pub currency_name: String,
    pub currency_symbol: String,
    pub currency_code: String,
    pub currency_decimal_places: u32,
    /// Keyed by customer ID; 0 holds the journals without a customer.
    pub customers: HashMap<CustomerId, CustomerJournals>,
}

impl CurrencyListing {
    fn new(journal: &JournalRow) -> Self {
        Self {
            currency_id: journal.currency.id,
            currency_name: journal.currency.name.clone(),
            currency_symbol: journal.currency.symbol.clone(),
            currency_code: journal.currency.code.clone(),
            currency_decimal_places: journal.currency.decimal_places,
            customers: HashMap::new(),
        }
    }
}

/// A journal listed in the no-customer report. Only the amount and date are
/// kept.
#[derive(Debug, Clone, PartialEq)]
pub struct NoCustomerJournalDetail {
    pub amount: Decimal,
    pub date: Date,
}

/// Per-currency sums, keyed by currency ID.
pub type CurrencySums = HashMap<DatabaseId, CurrencySum>;

/// Per-currency listings, keyed by currency ID.
pub type CurrencyListings = HashMap<DatabaseId, CurrencyListing>;
