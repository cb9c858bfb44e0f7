//! A key-value store backed by a single SQLite table.
//!
//! Values are opaque text blobs. Writing a key replaces its whole value in one
//! statement, so a reader never sees a partially written value.

use rusqlite::{Connection, OptionalExtension};

use crate::Error;

/// Create the tables the application needs.
///
/// # Errors
/// Returns an error if a table cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    create_kv_table(connection)?;

    Ok(())
}

pub fn create_kv_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Get the value stored under `key`, or `None` if nothing has been stored.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_value(key: &str, connection: &Connection) -> Result<Option<String>, Error> {
    let value = connection
        .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()?;

    Ok(value)
}

/// Store `value` under `key`, replacing any existing value.
///
/// # Errors
/// Returns [Error::SqlError] if the write fails.
pub fn set_value(key: &str, value: &str, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        (key, value),
    )?;

    Ok(())
}
