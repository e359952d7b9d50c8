//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(i64);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
///
/// Every customer, account and transaction journal belongs to exactly one
/// user, and all queries are scoped to the user taken from the auth cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserId,
    /// The user's email address.
    pub email: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// Whether this is a demo account. Demo accounts cannot upload files.
    pub is_demo: bool,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                is_demo INTEGER NOT NULL DEFAULT 0
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns an [Error::DuplicateEmail] if the email address is already
/// registered, or an [Error::SqlError] if another SQL error occurred.
pub fn create_user(
    email: &str,
    password_hash: PasswordHash,
    is_demo: bool,
    connection: &Connection,
) -> Result<User, Error> {
    connection
        .execute(
            "INSERT INTO user (email, password, is_demo) VALUES (?1, ?2, ?3)",
            (email, password_hash.as_ref(), is_demo),
        )
        .map_err(|error| match error {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("user.email") =>
            {
                Error::DuplicateEmail
            }
            error => error.into(),
        })?;

    let id = UserId::new(connection.last_insert_rowid());

    Ok(User {
        id,
        email: email.to_string(),
        password_hash,
        is_demo,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the database.
pub fn get_user_by_id(user_id: UserId, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, email, password, is_demo FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_row)
        .map_err(|error| error.into())
}

/// Get the user from the database with an email address equal to `email`.
///
/// # Errors
///
/// This function will return an error if:
/// - `email` does not belong to a registered user.
/// - there was an error trying to access the database.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, email, password, is_demo FROM user WHERE email = :email")?
        .query_row(&[(":email", &email)], map_row)
        .map_err(|error| error.into())
}

fn map_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_id = row.get(0)?;
    let email = row.get(1)?;
    let raw_password_hash: String = row.get(2)?;
    let is_demo = row.get(3)?;

    Ok(User {
        id: UserId::new(raw_id),
        email,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        is_demo,
    })
}

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;

    use crate::{Error, PasswordHash};

    use super::{create_user, create_user_table, get_user_by_email, get_user_by_id};

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_user_table(&connection).expect("Could not create user table");
        connection
    }

    #[test]
    fn create_and_get_user() {
        let connection = get_test_connection();
        let hash = PasswordHash::new_unchecked("hunter2hash");

        let inserted = create_user("foo@bar.baz", hash, false, &connection)
            .expect("Could not create test user");

        assert_eq!(Ok(inserted.clone()), get_user_by_id(inserted.id, &connection));
        assert_eq!(Ok(inserted), get_user_by_email("foo@bar.baz", &connection));
    }

    #[test]
    fn create_user_with_duplicate_email_fails() {
        let connection = get_test_connection();
        let hash = PasswordHash::new_unchecked("hunter2hash");
        create_user("foo@bar.baz", hash.clone(), false, &connection)
            .expect("Could not create test user");

        let result = create_user("foo@bar.baz", hash, false, &connection);

        assert_eq!(result, Err(Error::DuplicateEmail));
    }

    #[test]
    fn get_missing_user_returns_not_found() {
        let connection = get_test_connection();

        let result = get_user_by_email("nobody@example.com", &connection);

        assert_eq!(result, Err(Error::NotFound));
    }
}
