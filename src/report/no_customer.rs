//! Sums and listings for journals that have no customer tagged on them.

use std::collections::HashMap;

use rusqlite::Connection;
use time::Date;

use crate::{
    Error, UserId,
    amount::{forced_negative, forced_positive},
    database_id::DatabaseId,
    journal::{JournalQuery, JournalRow, TransactionType, collect_journals},
    report::{CurrencySum, CurrencySums, NO_CUSTOMER_NAME, NoCustomerJournalDetail},
};

/// One currency's journals without a customer.
///
/// The single bucket mirrors the per-customer listings: it has ID 0 and the
/// placeholder display name.
#[derive(Debug, Clone, PartialEq)]
pub struct NoCustomerListing {
    pub currency_id: DatabaseId,
    pub currency_name: String,
    pub currency_symbol: String,
    pub currency_code: String,
    pub currency_decimal_places: u32,
    pub name: &'static str,
    /// Keyed by journal ID.
    pub transaction_journals: HashMap<DatabaseId, NoCustomerJournalDetail>,
}

impl NoCustomerListing {
    fn new(journal: &JournalRow) -> Self {
        Self {
            currency_id: journal.currency.id,
            currency_name: journal.currency.name.clone(),
            currency_symbol: journal.currency.symbol.clone(),
            currency_code: journal.currency.code.clone(),
            currency_decimal_places: journal.currency.decimal_places,
            name: NO_CUSTOMER_NAME,
            transaction_journals: HashMap::new(),
        }
    }
}

/// Per-currency no-customer listings, keyed by currency ID.
pub type NoCustomerListings = HashMap<DatabaseId, NoCustomerListing>;

fn no_customer_query(
    user_id: UserId,
    start: Date,
    end: Date,
    transaction_type: TransactionType,
    accounts: &[DatabaseId],
) -> JournalQuery {
    JournalQuery {
        date_range: Some(start..=end),
        transaction_types: vec![transaction_type],
        account_ids: accounts.to_vec(),
        without_customer: true,
        ..JournalQuery::new(user_id)
    }
}

fn sum_journals(
    journals: &[JournalRow],
    normalize: impl Fn(rust_decimal::Decimal) -> rust_decimal::Decimal,
) -> CurrencySums {
    let mut sums = CurrencySums::new();

    for journal in journals {
        let entry = sums
            .entry(journal.currency.id)
            .or_insert_with(|| CurrencySum::new(journal));
        entry.sum += normalize(journal.amount);
    }

    sums
}

fn list_journals(
    journals: &[JournalRow],
    normalize: impl Fn(rust_decimal::Decimal) -> rust_decimal::Decimal,
) -> NoCustomerListings {
    let mut listings = NoCustomerListings::new();

    for journal in journals {
        let listing = listings
            .entry(journal.currency.id)
            .or_insert_with(|| NoCustomerListing::new(journal));

        listing.transaction_journals.insert(
            journal.journal_id,
            NoCustomerJournalDetail {
                amount: normalize(journal.amount),
                date: journal.date,
            },
        );
    }

    listings
}

/// Sum of withdrawal journals without a customer in the period, grouped per
/// currency. Amounts are always negative.
pub fn no_customer_sum_expenses(
    user_id: UserId,
    start: Date,
    end: Date,
    accounts: &[DatabaseId],
    connection: &Connection,
) -> Result<CurrencySums, Error> {
    let query = no_customer_query(user_id, start, end, TransactionType::Withdrawal, accounts);
    let journals = collect_journals(&query, connection)?;

    Ok(sum_journals(&journals, forced_negative))
}

/// Sum of deposit journals without a customer in the period, grouped per
/// currency. Amounts are always positive.
pub fn no_customer_sum_income(
    user_id: UserId,
    start: Date,
    end: Date,
    accounts: &[DatabaseId],
    connection: &Connection,
) -> Result<CurrencySums, Error> {
    let query = no_customer_query(user_id, start, end, TransactionType::Deposit, accounts);
    let journals = collect_journals(&query, connection)?;

    Ok(sum_journals(&journals, forced_positive))
}

/// Sum of transfer journals without a customer in the period, grouped per
/// currency. Amounts are always positive.
pub fn no_customer_sum_transfers(
    user_id: UserId,
    start: Date,
    end: Date,
    accounts: &[DatabaseId],
    connection: &Connection,
) -> Result<CurrencySums, Error> {
    let query = no_customer_query(user_id, start, end, TransactionType::Transfer, accounts);
    let journals = collect_journals(&query, connection)?;

    Ok(sum_journals(&journals, forced_positive))
}

/// List the withdrawal journals without a customer in the period, grouped per
/// currency. Amounts are always negative; only the amount and date are kept.
pub fn no_customer_list_expenses(
    user_id: UserId,
    start: Date,
    end: Date,
    accounts: &[DatabaseId],
    connection: &Connection,
) -> Result<NoCustomerListings, Error> {
    let query = no_customer_query(user_id, start, end, TransactionType::Withdrawal, accounts);
    let journals = collect_journals(&query, connection)?;

    Ok(list_journals(&journals, forced_negative))
}

/// List the deposit journals without a customer in the period, grouped per
/// currency. Amounts are always positive; only the amount and date are kept.
pub fn no_customer_list_income(
    user_id: UserId,
    start: Date,
    end: Date,
    accounts: &[DatabaseId],
    connection: &Connection,
) -> Result<NoCustomerListings, Error> {
    let query = no_customer_query(user_id, start, end, TransactionType::Deposit, accounts);
    let journals = collect_journals(&query, connection)?;

    Ok(list_journals(&journals, forced_positive))
}
