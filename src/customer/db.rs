//! Database operations for customers.

use rusqlite::{Connection, Row, params_from_iter};
use time::Date;

use crate::{
    Error, UserId,
    customer::{Customer, CustomerData, CustomerId, CustomerName},
    database_id::DatabaseId,
    note::{Noteable, get_note_text, remove_note, set_note_text},
};

/// Initialize the customer table and the join tables that tag transactions
/// and transaction journals with a customer.
///
/// The profile columns (email, address and so on) are part of the schema but
/// are not editable through the web forms yet.
pub fn create_customer_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS customer (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            email TEXT,
            birth_date TEXT,
            gender TEXT,
            document TEXT,
            telephone TEXT,
            cellphone TEXT,
            address TEXT,
            address_number TEXT,
            address_complement TEXT,
            zip_code TEXT,
            state TEXT,
            city TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            deleted_at TEXT
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_customer_user_name
            ON customer(user_id, name) WHERE deleted_at IS NULL;

        CREATE TABLE IF NOT EXISTS customer_transaction (
            id INTEGER PRIMARY KEY,
            customer_id INTEGER NOT NULL REFERENCES customer(id) ON DELETE CASCADE,
            transaction_id INTEGER NOT NULL
                REFERENCES \"transaction\"(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS customer_transaction_journal (
            id INTEGER PRIMARY KEY,
            customer_id INTEGER NOT NULL REFERENCES customer(id) ON DELETE CASCADE,
            transaction_journal_id INTEGER NOT NULL
                REFERENCES transaction_journal(id) ON DELETE CASCADE
        );",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Customer, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_user_id: i64 = row.get(1)?;
    let raw_name: String = row.get(2)?;

    Ok(Customer {
        id,
        user_id: UserId::new(raw_user_id),
        name: CustomerName::new_unchecked(&raw_name),
    })
}

const CUSTOMER_COLUMNS: &str = "id, user_id, name";

/// Find a customer by ID within the user's scope.
pub fn find_customer(
    user_id: UserId,
    customer_id: CustomerId,
    connection: &Connection,
) -> Result<Option<Customer>, Error> {
    let result = connection
        .prepare(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customer
                WHERE user_id = ?1 AND id = ?2 AND deleted_at IS NULL"
        ))?
        .query_row((user_id.as_i64(), customer_id), map_row);

    match result {
        Ok(customer) => Ok(Some(customer)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(error) => Err(error.into()),
    }
}

/// Find a customer by exact name within the user's scope.
pub fn find_customer_by_name(
    user_id: UserId,
    name: &str,
    connection: &Connection,
) -> Result<Option<Customer>, Error> {
    let result = connection
        .prepare(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customer
                WHERE user_id = ?1 AND name = ?2 AND deleted_at IS NULL"
        ))?
        .query_row((user_id.as_i64(), name), map_row);

    match result {
        Ok(customer) => Ok(Some(customer)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(error) => Err(error.into()),
    }
}

/// Find a customer by ID or name, creating it when only an unknown name was
/// given.
///
/// Returns `Ok(None)` when both the ID and the name are empty. Looks up by ID
/// first, then by exact name; when neither matches and the name is non-empty,
/// a new customer with that name is inserted.
///
/// # Errors
///
/// Returns an [Error::CouldNotStoreCustomer] if the insert violates the
/// unique name constraint, which can happen when another request stores the
/// same name at the same time.
pub fn find_or_create_customer(
    user_id: UserId,
    customer_id: Option<CustomerId>,
    customer_name: &str,
    connection: &Connection,
) -> Result<Option<Customer>, Error> {
    let customer_id = customer_id.unwrap_or(0);
    let customer_name = customer_name.trim();

    tracing::debug!(
        "Going to find customer with ID {customer_id} and name \"{customer_name}\""
    );

    if customer_name.is_empty() && customer_id == 0 {
        return Ok(None);
    }

    if customer_id > 0
        && let Some(customer) = find_customer(user_id, customer_id, connection)?
    {
        return Ok(Some(customer));
    }

    if customer_name.is_empty() {
        return Ok(None);
    }

    if let Some(customer) = find_customer_by_name(user_id, customer_name, connection)? {
        return Ok(Some(customer));
    }

    let insert_result = connection.execute(
        "INSERT INTO customer (user_id, name) VALUES (?1, ?2)",
        (user_id.as_i64(), customer_name),
    );

    match insert_result {
        Ok(_) => Ok(Some(Customer {
            id: connection.last_insert_rowid(),
            user_id,
            name: CustomerName::new_unchecked(customer_name),
        })),
        // Code 2067 occurs when a UNIQUE constraint failed.
        Err(rusqlite::Error::SqliteFailure(sql_error, Some(ref desc)))
            if sql_error.extended_code == 2067 =>
        {
            tracing::error!("could not store new customer: {desc}");
            Err(Error::CouldNotStoreCustomer)
        }
        Err(error) => Err(error.into()),
    }
}

/// Find a customer by ID, falling back to a name lookup and finally to
/// creating the customer by name.
///
/// This is the lookup used when tagging journals: the caller may know the
/// customer's ID, only its name, or neither.
pub fn find_customer_with_fallback(
    user_id: UserId,
    customer_id: Option<CustomerId>,
    customer_name: &str,
    connection: &Connection,
) -> Result<Option<Customer>, Error> {
    let result = find_or_create_customer(user_id, customer_id, customer_name, connection)?;

    match &result {
        Some(customer) => {
            tracing::debug!("Found customer #{}: {}", customer.id, customer.name)
        }
        None => tracing::debug!("Found no customer for ID {customer_id:?}"),
    }

    Ok(result)
}

/// Get all of a user's customers, ordered alphabetically by name.
pub fn get_customers(user_id: UserId, connection: &Connection) -> Result<Vec<Customer>, Error> {
    connection
        .prepare(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customer
                WHERE user_id = ?1 AND deleted_at IS NULL ORDER BY name ASC"
        ))?
        .query_map([user_id.as_i64()], map_row)?
        .map(|maybe_customer| maybe_customer.map_err(|error| error.into()))
        .collect()
}

/// Get the user's customers with the given IDs.
pub fn get_customers_by_ids(
    user_id: UserId,
    customer_ids: &[CustomerId],
    connection: &Connection,
) -> Result<Vec<Customer>, Error> {
    if customer_ids.is_empty() {
        return Ok(Vec::new());
    }

    let id_list = vec!["?"; customer_ids.len()].join(", ");
    let sql = format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customer
            WHERE user_id = ? AND deleted_at IS NULL AND id IN ({id_list})"
    );

    let mut params: Vec<i64> = vec![user_id.as_i64()];
    params.extend_from_slice(customer_ids);

    connection
        .prepare(&sql)?
        .query_map(params_from_iter(params), map_row)?
        .map(|maybe_customer| maybe_customer.map_err(|error| error.into()))
        .collect()
}

/// Search the user's customers by case-insensitive substring match on name.
///
/// An empty query matches every customer. At most `limit` rows are returned.
pub fn search_customers(
    user_id: UserId,
    query: &str,
    limit: u64,
    connection: &Connection,
) -> Result<Vec<Customer>, Error> {
    let pattern = format!("%{query}%");

    connection
        .prepare(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customer
                WHERE user_id = ?1 AND deleted_at IS NULL AND name LIKE ?2
                ORDER BY name ASC LIMIT ?3"
        ))?
        .query_map((user_id.as_i64(), pattern, limit as i64), map_row)?
        .map(|maybe_customer| maybe_customer.map_err(|error| error.into()))
        .collect()
}

/// Store a customer: find-or-create it by name, then attach or remove its
/// note.
///
/// A note of `Some("")` removes any existing note, `Some(text)` sets it, and
/// `None` leaves it untouched.
pub fn store_customer(
    user_id: UserId,
    data: &CustomerData,
    connection: &Connection,
) -> Result<Customer, Error> {
    let customer = find_or_create_customer(user_id, None, data.name.as_ref(), connection)?
        .ok_or(Error::CouldNotStoreCustomer)?;

    match data.notes.as_deref() {
        Some("") => remove_note(Noteable::Customer, customer.id, connection)?,
        Some(notes) => set_note_text(Noteable::Customer, customer.id, notes, connection)?,
        None => {}
    }

    Ok(customer)
}

/// Update a customer's name and note.
///
/// # Errors
///
/// Returns an [Error::UpdateMissingCustomer] if the customer does not exist,
/// or an [Error::DuplicateCustomerName] if the new name is already taken by
/// another of the user's customers.
pub fn update_customer(
    customer: &Customer,
    data: &CustomerData,
    connection: &Connection,
) -> Result<Customer, Error> {
    let rows_affected = connection
        .execute(
            "UPDATE customer SET name = ?1, updated_at = CURRENT_TIMESTAMP
                WHERE id = ?2 AND user_id = ?3 AND deleted_at IS NULL",
            (data.name.as_ref(), customer.id, customer.user_id.as_i64()),
        )
        .map_err(|error| match error {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_))
                if sql_error.extended_code == 2067 =>
            {
                Error::DuplicateCustomerName(data.name.to_string())
            }
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCustomer);
    }

    match data.notes.as_deref() {
        Some("") => remove_note(Noteable::Customer, customer.id, connection)?,
        Some(notes) => set_note_text(Noteable::Customer, customer.id, notes, connection)?,
        None => {}
    }

    Ok(Customer {
        id: customer.id,
        user_id: customer.user_id,
        name: data.name.clone(),
    })
}

/// Get the text of a customer's note, if there is one.
pub fn get_customer_note(
    customer_id: CustomerId,
    connection: &Connection,
) -> Result<Option<String>, Error> {
    get_note_text(Noteable::Customer, customer_id, connection)
}

/// Soft-delete a customer and scrub the rows that reference it.
///
/// Removes the customer's rows from both join tables, its note, recurrence
/// metadata that stores the customer's ID, and rule actions that set this
/// customer by name. Other customers' rows are left untouched.
///
/// # Errors
///
/// Returns an [Error::DeleteMissingCustomer] if the customer does not exist
/// or was already deleted.
pub fn destroy_customer(customer: &Customer, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE customer SET deleted_at = CURRENT_TIMESTAMP
            WHERE id = ?1 AND user_id = ?2 AND deleted_at IS NULL",
        (customer.id, customer.user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCustomer);
    }

    connection.execute(
        "DELETE FROM customer_transaction WHERE customer_id = ?1",
        [customer.id],
    )?;
    connection.execute(
        "DELETE FROM customer_transaction_journal WHERE customer_id = ?1",
        [customer.id],
    )?;
    connection.execute(
        "DELETE FROM recurrence_meta
            WHERE user_id = ?1 AND name = 'customer_id' AND value = ?2",
        (customer.user_id.as_i64(), customer.id.to_string()),
    )?;
    connection.execute(
        "DELETE FROM rule_action
            WHERE user_id = ?1 AND action_type = 'set_customer' AND action_value = ?2",
        (customer.user_id.as_i64(), customer.name.as_ref()),
    )?;
    remove_note(Noteable::Customer, customer.id, connection)?;

    Ok(())
}

/// Delete every customer belonging to the user, scrubbing related rows the
/// same way [destroy_customer] does.
pub fn destroy_all_customers(user_id: UserId, connection: &Connection) -> Result<(), Error> {
    for customer in get_customers(user_id, connection)? {
        destroy_customer(&customer, connection)?;
    }

    Ok(())
}

/// Link a customer to a transaction journal.
pub fn link_customer_to_journal(
    customer_id: CustomerId,
    journal_id: DatabaseId,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO customer_transaction_journal (customer_id, transaction_journal_id)
            VALUES (?1, ?2)",
        (customer_id, journal_id),
    )?;

    Ok(())
}

/// Link a customer to an individual transaction leg.
pub fn link_customer_to_transaction(
    customer_id: CustomerId,
    transaction_id: DatabaseId,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO customer_transaction (customer_id, transaction_id) VALUES (?1, ?2)",
        (customer_id, transaction_id),
    )?;

    Ok(())
}

/// The date of the oldest journal associated with the customer, via either
/// the journal join table or the transaction join table.
///
/// Returns `None` when the customer has no activity at all.
pub fn first_use_date(
    customer_id: CustomerId,
    connection: &Connection,
) -> Result<Option<Date>, Error> {
    let journal_date = first_journal_date(customer_id, connection)?;
    let transaction_date = first_transaction_date(customer_id, connection)?;

    Ok(match (journal_date, transaction_date) {
        (None, None) => None,
        (Some(date), None) | (None, Some(date)) => Some(date),
        (Some(journal_date), Some(transaction_date)) => {
            Some(journal_date.min(transaction_date))
        }
    })
}

/// The date of the newest journal associated with the customer, via either
/// the journal join table or the transaction join table.
///
/// When `account_ids` is non-empty, only journals that touch one of those
/// accounts are considered. Returns `None` when the customer has no matching
/// activity.
pub fn last_use_date(
    customer_id: CustomerId,
    account_ids: &[DatabaseId],
    connection: &Connection,
) -> Result<Option<Date>, Error> {
    let journal_date = last_journal_date(customer_id, account_ids, connection)?;
    let transaction_date = last_transaction_date(customer_id, account_ids, connection)?;

    Ok(match (journal_date, transaction_date) {
        (None, None) => None,
        (Some(date), None) | (None, Some(date)) => Some(date),
        (Some(journal_date), Some(transaction_date)) => {
            Some(journal_date.max(transaction_date))
        }
    })
}

fn first_journal_date(
    customer_id: CustomerId,
    connection: &Connection,
) -> Result<Option<Date>, Error> {
    connection
        .prepare(
            "SELECT MIN(j.date) FROM transaction_journal j
                INNER JOIN customer_transaction_journal ctj
                    ON ctj.transaction_journal_id = j.id
                WHERE ctj.customer_id = ?1",
        )?
        .query_row([customer_id], |row| row.get(0))
        .map_err(|error| error.into())
}

fn first_transaction_date(
    customer_id: CustomerId,
    connection: &Connection,
) -> Result<Option<Date>, Error> {
    connection
        .prepare(
            "SELECT MIN(j.date) FROM transaction_journal j
                INNER JOIN \"transaction\" t ON t.transaction_journal_id = j.id
                INNER JOIN customer_transaction ct ON ct.transaction_id = t.id
                WHERE ct.customer_id = ?1",
        )?
        .query_row([customer_id], |row| row.get(0))
        .map_err(|error| error.into())
}

fn last_journal_date(
    customer_id: CustomerId,
    account_ids: &[DatabaseId],
    connection: &Connection,
) -> Result<Option<Date>, Error> {
    let mut sql = String::from(
        "SELECT MAX(j.date) FROM transaction_journal j
            INNER JOIN customer_transaction_journal ctj
                ON ctj.transaction_journal_id = j.id
            WHERE ctj.customer_id = ?",
    );
    let mut params: Vec<i64> = vec![customer_id];

    if !account_ids.is_empty() {
        let id_list = vec!["?"; account_ids.len()].join(", ");
        sql.push_str(&format!(
            " AND EXISTS (SELECT 1 FROM \"transaction\" t
                WHERE t.transaction_journal_id = j.id AND t.account_id IN ({id_list}))"
        ));
        params.extend_from_slice(account_ids);
    }

    connection
        .prepare(&sql)?
        .query_row(params_from_iter(params), |row| row.get(0))
        .map_err(|error| error.into())
}

fn last_transaction_date(
    customer_id: CustomerId,
    account_ids: &[DatabaseId],
    connection: &Connection,
) -> Result<Option<Date>, Error> {
    let mut sql = String::from(
        "SELECT MAX(j.date) FROM transaction_journal j
            INNER JOIN \"transaction\" t ON t.transaction_journal_id = j.id
            INNER JOIN customer_transaction ct ON ct.transaction_id = t.id
            WHERE ct.customer_id = ?",
    );
    let mut params: Vec<i64> = vec![customer_id];

    if !account_ids.is_empty() {
        let id_list = vec!["?"; account_ids.len()].join(", ");
        sql.push_str(&format!(" AND t.account_id IN ({id_list})"));
        params.extend_from_slice(account_ids);
    }

    connection
        .prepare(&sql)?
        .query_row(params_from_iter(params), |row| row.get(0))
        .map_err(|error| error.into())
}


#[cfg(test)]
mod customer_activity_tests {
    use std::str::FromStr;

    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        PasswordHash, UserId,
        database_id::DatabaseId,
        db::initialize,
        journal::{
            TransactionType, create_account, create_currency, create_transaction_journal,
        },
        user::create_user,
    };

    use super::{
        destroy_customer, find_or_create_customer, first_use_date, last_use_date,
        link_customer_to_journal, link_customer_to_transaction,
    };

    struct Fixture {
        connection: Connection,
        user_id: UserId,
        currency_id: DatabaseId,
        checking: DatabaseId,
        shop: DatabaseId,
    }

    fn get_fixture() -> Fixture {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            "foo@bar.baz",
            PasswordHash::new_unchecked("hash"),
            false,
            &connection,
        )
        .unwrap();
        let currency = create_currency("EUR", "Euro", "€", 2, &connection).unwrap();
        let checking = create_account(user.id, "Checking", &connection).unwrap();
        let shop = create_account(user.id, "Corner Shop", &connection).unwrap();

        Fixture {
            connection,
            user_id: user.id,
            currency_id: currency.id,
            checking,
            shop,
        }
    }

    fn insert_journal(fixture: &Fixture, date: time::Date) -> DatabaseId {
        create_transaction_journal(
            fixture.user_id,
            fixture.currency_id,
            TransactionType::Withdrawal,
            "Shopping",
            date,
            1,
            fixture.checking,
            fixture.shop,
            &Decimal::from_str("10").unwrap(),
            &fixture.connection,
        )
        .unwrap()
    }

    fn positive_leg_id(fixture: &Fixture, journal_id: DatabaseId) -> DatabaseId {
        fixture
            .connection
            .query_row(
                "SELECT id FROM \"transaction\"
                    WHERE transaction_journal_id = ?1 AND CAST(amount AS REAL) > 0",
                [journal_id],
                |row| row.get(0),
            )
            .unwrap()
    }

    #[test]
    fn use_dates_are_none_without_activity() {
        let fixture = get_fixture();
        let acme = find_or_create_customer(fixture.user_id, None, "Acme", &fixture.connection)
            .unwrap()
            .unwrap();

        assert_eq!(first_use_date(acme.id, &fixture.connection).unwrap(), None);
        assert_eq!(
            last_use_date(acme.id, &[], &fixture.connection).unwrap(),
            None
        );
    }

    #[test]
    fn use_dates_combine_both_join_tables() {
        let fixture = get_fixture();
        let acme = find_or_create_customer(fixture.user_id, None, "Acme", &fixture.connection)
            .unwrap()
            .unwrap();

        // The journal link is the older source, the transaction link the newer.
        let old_journal = insert_journal(&fixture, date!(2024 - 01 - 05));
        link_customer_to_journal(acme.id, old_journal, &fixture.connection).unwrap();

        let new_journal = insert_journal(&fixture, date!(2024 - 06 - 20));
        let leg = positive_leg_id(&fixture, new_journal);
        link_customer_to_transaction(acme.id, leg, &fixture.connection).unwrap();

        assert_eq!(
            first_use_date(acme.id, &fixture.connection).unwrap(),
            Some(date!(2024 - 01 - 05))
        );
        assert_eq!(
            last_use_date(acme.id, &[], &fixture.connection).unwrap(),
            Some(date!(2024 - 06 - 20))
        );
    }

    #[test]
    fn last_use_date_filters_by_account() {
        let fixture = get_fixture();
        let acme = find_or_create_customer(fixture.user_id, None, "Acme", &fixture.connection)
            .unwrap()
            .unwrap();
        let journal = insert_journal(&fixture, date!(2024 - 01 - 05));
        link_customer_to_journal(acme.id, journal, &fixture.connection).unwrap();

        let other_account = create_account(fixture.user_id, "Savings", &fixture.connection)
            .unwrap();

        assert_eq!(
            last_use_date(acme.id, &[fixture.checking], &fixture.connection).unwrap(),
            Some(date!(2024 - 01 - 05))
        );
        assert_eq!(
            last_use_date(acme.id, &[other_account], &fixture.connection).unwrap(),
            None
        );
    }

    #[test]
    fn destroy_customer_removes_only_its_join_rows() {
        let fixture = get_fixture();
        let acme = find_or_create_customer(fixture.user_id, None, "Acme", &fixture.connection)
            .unwrap()
            .unwrap();
        let globex = find_or_create_customer(fixture.user_id, None, "Globex", &fixture.connection)
            .unwrap()
            .unwrap();

        let journal = insert_journal(&fixture, date!(2024 - 01 - 05));
        let leg = positive_leg_id(&fixture, journal);
        link_customer_to_journal(acme.id, journal, &fixture.connection).unwrap();
        link_customer_to_transaction(acme.id, leg, &fixture.connection).unwrap();

        let other_journal = insert_journal(&fixture, date!(2024 - 02 - 05));
        let other_leg = positive_leg_id(&fixture, other_journal);
        link_customer_to_journal(globex.id, other_journal, &fixture.connection).unwrap();
        link_customer_to_transaction(globex.id, other_leg, &fixture.connection).unwrap();

        destroy_customer(&acme, &fixture.connection).unwrap();

        let count_rows = |table: &str, customer_id: DatabaseId| -> i64 {
            fixture
                .connection
                .query_row(
                    &format!("SELECT COUNT(1) FROM {table} WHERE customer_id = ?1"),
                    [customer_id],
                    |row| row.get(0),
                )
                .unwrap()
        };

        assert_eq!(count_rows("customer_transaction", acme.id), 0);
        assert_eq!(count_rows("customer_transaction_journal", acme.id), 0);
        assert_eq!(count_rows("customer_transaction", globex.id), 1);
        assert_eq!(count_rows("customer_transaction_journal", globex.id), 1);
    }

    #[test]
    fn destroy_customer_scrubs_automation_rows() {
        let fixture = get_fixture();
        let acme = find_or_create_customer(fixture.user_id, None, "Acme", &fixture.connection)
            .unwrap()
            .unwrap();

        fixture
            .connection
            .execute(
                "INSERT INTO rule_action (user_id, action_type, action_value)
                    VALUES (?1, 'set_customer', ?2)",
                (fixture.user_id.as_i64(), "Acme"),
            )
            .unwrap();
        fixture
            .connection
            .execute(
                "INSERT INTO recurrence_meta (user_id, name, value)
                    VALUES (?1, 'customer_id', ?2)",
                (fixture.user_id.as_i64(), acme.id.to_string()),
            )
            .unwrap();

        destroy_customer(&acme, &fixture.connection).unwrap();

        let rule_actions: i64 = fixture
            .connection
            .query_row("SELECT COUNT(1) FROM rule_action", [], |row| row.get(0))
            .unwrap();
        let recurrence_rows: i64 = fixture
            .connection
            .query_row("SELECT COUNT(1) FROM recurrence_meta", [], |row| row.get(0))
            .unwrap();

        assert_eq!(rule_actions, 0);
        assert_eq!(recurrence_rows, 0);
    }
}
