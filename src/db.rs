//! Database initialization for the application.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error, attachment::create_attachment_table, customer::create_customer_tables,
    journal::create_ledger_tables, note::create_note_table, user::create_user_table,
};

/// Create the tables for all of the application's domain models.
///
/// The tables are created in a single exclusive transaction so that a
/// half-initialized database is never left behind.
///
/// # Errors
/// Returns an error if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_ledger_tables(&transaction)?;
    create_customer_tables(&transaction)?;
    create_note_table(&transaction)?;
    create_attachment_table(&transaction)?;
    create_automation_tables(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Create the tables owned by the rule and recurrence automation features.
///
/// Customer deletion scrubs rows from these tables, so they are part of the
/// base schema even though no page manages them directly yet.
fn create_automation_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS rule_action (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            action_type TEXT NOT NULL,
            action_value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS recurrence_meta (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            value TEXT NOT NULL
        );",
    )?;

    Ok(())
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn sql_is_valid() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        assert_eq!(Ok(()), initialize(&connection));
    }

    #[test]
    fn initialize_twice_succeeds() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        initialize(&connection).expect("first initialization failed");

        assert_eq!(Ok(()), initialize(&connection));
    }
}
