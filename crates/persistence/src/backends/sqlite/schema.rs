//! SQLite schema definition and versioning.

use rusqlite::Connection;

use crate::error::{BackendError, BackendResult};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema.
pub fn initialize_schema(conn: &Connection) -> BackendResult<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        create_schema_v1(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version > SCHEMA_VERSION {
        return Err(BackendError::MigrationError {
            message: format!(
                "database schema version {} is newer than supported version {}",
                current_version, SCHEMA_VERSION
            ),
        });
    }

    Ok(())
}

fn migration_error(step: &str, e: rusqlite::Error) -> BackendError {
    BackendError::MigrationError {
        message: format!("{}: {}", step, e),
    }
}

/// Get the current schema version.
fn get_schema_version(conn: &Connection) -> BackendResult<i32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL
        )",
        [],
    )
    .map_err(|e| migration_error("failed to create schema_version table", e))?;

    let version: Option<i32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .ok();

    Ok(version.unwrap_or(0))
}

/// Set the schema version.
fn set_schema_version(conn: &Connection, version: i32) -> BackendResult<()> {
    conn.execute("DELETE FROM schema_version", [])
        .map_err(|e| migration_error("failed to clear schema_version", e))?;

    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )
    .map_err(|e| migration_error("failed to set schema_version", e))?;

    Ok(())
}

/// Create the initial schema (version 1).
///
/// `data` holds the document's fields as JSON text, timestamps included.
/// `created_at` / `updated_at` mirror the timestamps for inspection; they are
/// never read back into documents.
fn create_schema_v1(conn: &Connection) -> BackendResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS documents (
            project_id TEXT NOT NULL,
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT,
            updated_at TEXT,
            PRIMARY KEY (project_id, collection, id)
        )",
        [],
    )
    .map_err(|e| migration_error("failed to create documents table", e))?;

    Ok(())
}
