//! Free-text notes that can be attached to other entities.
//!
//! A note belongs to exactly one "noteable" entity, identified by a type tag
//! and the entity's row ID. Each entity has at most one note.

use rusqlite::Connection;

use crate::{Error, database_id::DatabaseId};

/// The kinds of entity a note can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Noteable {
    /// A note on a customer.
    Customer,
    /// A note on an attachment.
    Attachment,
}

impl Noteable {
    fn as_str(&self) -> &'static str {
        match self {
            Noteable::Customer => "customer",
            Noteable::Attachment => "attachment",
        }
    }
}

/// Create the note table.
pub fn create_note_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS note (
            id INTEGER PRIMARY KEY,
            noteable_type TEXT NOT NULL,
            noteable_id INTEGER NOT NULL,
            text TEXT NOT NULL,
            UNIQUE(noteable_type, noteable_id)
        );",
    )?;

    Ok(())
}

/// Get the text of the note attached to an entity, if there is one.
pub fn get_note_text(
    noteable: Noteable,
    noteable_id: DatabaseId,
    connection: &Connection,
) -> Result<Option<String>, Error> {
    let result = connection
        .prepare("SELECT text FROM note WHERE noteable_type = ?1 AND noteable_id = ?2")?
        .query_row((noteable.as_str(), noteable_id), |row| row.get(0));

    match result {
        Ok(text) => Ok(Some(text)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(error) => Err(error.into()),
    }
}

/// Set the text of the note attached to an entity, creating the note if it
/// does not exist yet. The text is trimmed before it is stored.
pub fn set_note_text(
    noteable: Noteable,
    noteable_id: DatabaseId,
    text: &str,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO note (noteable_type, noteable_id, text) VALUES (?1, ?2, ?3)
            ON CONFLICT(noteable_type, noteable_id) DO UPDATE SET text = excluded.text",
        (noteable.as_str(), noteable_id, text.trim()),
    )?;

    Ok(())
}

/// Remove the note attached to an entity. Does nothing if there is none.
pub fn remove_note(
    noteable: Noteable,
    noteable_id: DatabaseId,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "DELETE FROM note WHERE noteable_type = ?1 AND noteable_id = ?2",
        (noteable.as_str(), noteable_id),
    )?;

    Ok(())
}
