//! Table creation and insert helpers for the ledger.

use rusqlite::Connection;
use rust_decimal::Decimal;
use time::Date;

use crate::{
    Error, UserId,
    database_id::DatabaseId,
    journal::{Currency, TransactionType},
};

/// Initialize the ledger tables: currencies, accounts, transaction journals
/// and their signed legs.
pub fn create_ledger_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS currency (
            id INTEGER PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            symbol TEXT NOT NULL,
            decimal_places INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS transaction_journal (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            currency_id INTEGER NOT NULL REFERENCES currency(id),
            transaction_type TEXT NOT NULL,
            description TEXT NOT NULL,
            date TEXT NOT NULL,
            transaction_group_id INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_journal_user_date
            ON transaction_journal(user_id, date);

        CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            transaction_journal_id INTEGER NOT NULL
                REFERENCES transaction_journal(id) ON DELETE CASCADE,
            account_id INTEGER NOT NULL REFERENCES account(id) ON DELETE CASCADE,
            amount TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_journal_id
            ON \"transaction\"(transaction_journal_id);",
    )?;

    Ok(())
}

/// Create a currency and return it with its generated ID.
pub fn create_currency(
    code: &str,
    name: &str,
    symbol: &str,
    decimal_places: u32,
    connection: &Connection,
) -> Result<Currency, Error> {
    connection.execute(
        "INSERT INTO currency (code, name, symbol, decimal_places) VALUES (?1, ?2, ?3, ?4)",
        (code, name, symbol, decimal_places),
    )?;

    Ok(Currency {
        id: connection.last_insert_rowid(),
        code: code.to_string(),
        name: name.to_string(),
        symbol: symbol.to_string(),
        decimal_places,
    })
}

/// Create an account for `user_id` and return its generated ID.
pub fn create_account(
    user_id: UserId,
    name: &str,
    connection: &Connection,
) -> Result<DatabaseId, Error> {
    connection.execute(
        "INSERT INTO account (user_id, name) VALUES (?1, ?2)",
        (user_id.as_i64(), name),
    )?;

    Ok(connection.last_insert_rowid())
}

/// Create a transaction journal with its two signed legs and return the
/// journal's generated ID.
///
/// The source account gets the negative leg and the destination account the
/// positive leg. `amount` must be positive.
#[allow(clippy::too_many_arguments)]
pub fn create_transaction_journal(
    user_id: UserId,
    currency_id: DatabaseId,
    transaction_type: TransactionType,
    description: &str,
    date: Date,
    transaction_group_id: DatabaseId,
    source_account_id: DatabaseId,
    destination_account_id: DatabaseId,
    amount: &Decimal,
    connection: &Connection,
) -> Result<DatabaseId, Error> {
    connection.execute(
        "INSERT INTO transaction_journal
            (user_id, currency_id, transaction_type, description, date, transaction_group_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            user_id.as_i64(),
            currency_id,
            transaction_type.as_str(),
            description,
            date,
            transaction_group_id,
        ),
    )?;

    let journal_id = connection.last_insert_rowid();

    connection.execute(
        "INSERT INTO \"transaction\" (transaction_journal_id, account_id, amount)
            VALUES (?1, ?2, ?3)",
        (journal_id, source_account_id, (-amount).to_string()),
    )?;
    connection.execute(
        "INSERT INTO \"transaction\" (transaction_journal_id, account_id, amount)
            VALUES (?1, ?2, ?3)",
        (journal_id, destination_account_id, amount.to_string()),
    )?;

    Ok(journal_id)
}
