//! File attachments for customers.
//!
//! Attachment metadata lives in the database; the file contents are stored
//! in the upload directory. Listing attachments reports whether the backing
//! file still exists on disk, since the two can drift apart when files are
//! moved or the database is restored from a backup.

use std::{fs, path::PathBuf};

use rusqlite::{Connection, Row};

use crate::{
    Error, UserId,
    database_id::DatabaseId,
    note::{Noteable, get_note_text},
};

/// The kinds of entity an attachment can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachable {
    /// An attachment on a customer.
    Customer,
}

impl Attachable {
    fn as_str(&self) -> &'static str {
        match self {
            Attachable::Customer => "customer",
        }
    }
}

/// Metadata for an uploaded file.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub id: DatabaseId,
    pub filename: String,
}

/// An attachment as shown on a customer's page.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentInfo {
    pub id: DatabaseId,
    pub filename: String,
    /// Whether the backing file still exists in the upload directory.
    pub file_exists: bool,
    /// The text of the attachment's note, or "" when there is none.
    pub notes: String,
}

/// Create the attachment table.
pub fn create_attachment_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS attachment (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            attachable_type TEXT NOT NULL,
            attachable_id INTEGER NOT NULL,
            filename TEXT NOT NULL,
            uploaded_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Attachment, rusqlite::Error> {
    Ok(Attachment {
        id: row.get(0)?,
        filename: row.get(1)?,
    })
}

/// The path an attachment's contents are stored at.
fn attachment_path(upload_directory: &str, attachment_id: DatabaseId) -> PathBuf {
    PathBuf::from(upload_directory).join(format!("at-{attachment_id}.data"))
}

/// Save an uploaded file as an attachment on an entity.
///
/// The metadata row is written first so the file name on disk can use the
/// generated ID; uploads with the same filename therefore never collide.
pub fn save_attachment(
    user_id: UserId,
    attachable: Attachable,
    attachable_id: DatabaseId,
    filename: &str,
    contents: &[u8],
    upload_directory: &str,
    connection: &Connection,
) -> Result<Attachment, Error> {
    connection.execute(
        "INSERT INTO attachment (user_id, attachable_type, attachable_id, filename)
            VALUES (?1, ?2, ?3, ?4)",
        (
            user_id.as_i64(),
            attachable.as_str(),
            attachable_id,
            filename,
        ),
    )?;

    let id = connection.last_insert_rowid();
    let path = attachment_path(upload_directory, id);

    fs::create_dir_all(upload_directory)
        .and_then(|_| fs::write(&path, contents))
        .map_err(|error| Error::AttachmentWriteError(error.to_string()))?;

    Ok(Attachment {
        id,
        filename: filename.to_string(),
    })
}

/// List the attachments on an entity, newest first, with their note text and
/// whether the backing file still exists on disk.
pub fn list_attachments(
    attachable: Attachable,
    attachable_id: DatabaseId,
    upload_directory: &str,
    connection: &Connection,
) -> Result<Vec<AttachmentInfo>, Error> {
    let attachments: Vec<Attachment> = connection
        .prepare(
            "SELECT id, filename FROM attachment
                WHERE attachable_type = ?1 AND attachable_id = ?2
                ORDER BY id DESC",
        )?
        .query_map((attachable.as_str(), attachable_id), map_row)?
        .collect::<Result<_, _>>()?;

    attachments
        .into_iter()
        .map(|attachment| {
            let file_exists = attachment_path(upload_directory, attachment.id).exists();
            let notes = get_note_text(Noteable::Attachment, attachment.id, connection)?
                .unwrap_or_default();

            Ok(AttachmentInfo {
                id: attachment.id,
                filename: attachment.filename,
                file_exists,
                notes,
            })
        })
        .collect()
}
