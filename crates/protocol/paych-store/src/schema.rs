//! SQL schema initialization.

use rusqlite::{Connection, OptionalExtension};

use crate::error::{Result, StoreError};

/// Schema version for migration tracking.
pub const SCHEMA_VERSION: u32 = 1;

/// Initialize the database schema.
///
/// Creates all tables and indexes if they don't exist. Idempotent.
/// A database written by a newer schema is refused.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    // WAL is not available for in-memory databases; SQLite ignores it there.
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        [],
    )?;

    let current_version: Option<u32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .optional()?;

    match current_version {
        Some(version) if version > SCHEMA_VERSION => {
            return Err(StoreError::schema(format!(
                "database schema version {} is newer than supported version {}",
                version, SCHEMA_VERSION
            )));
        }
        Some(_) => create_tables(conn)?,
        None => {
            create_tables(conn)?;
            conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                [SCHEMA_VERSION],
            )?;
        }
    }

    Ok(())
}

/// Create all database tables.
fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS channels (
            address BLOB PRIMARY KEY,
            from_addr BLOB NOT NULL,
            to_addr BLOB NOT NULL,
            direction INTEGER NOT NULL,
            amount INTEGER NOT NULL,
            create_message BLOB,
            created_at INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_channels_created ON channels(created_at)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS vouchers (
            channel BLOB NOT NULL,
            lane INTEGER NOT NULL,
            nonce INTEGER NOT NULL,
            amount INTEGER NOT NULL,
            time_lock_min INTEGER NOT NULL DEFAULT 0,
            signature BLOB,
            encoded TEXT NOT NULL,
            submitted INTEGER NOT NULL DEFAULT 0,
            submit_message BLOB,
            added_at INTEGER NOT NULL,
            PRIMARY KEY (channel, lane, nonce)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_vouchers_channel ON vouchers(channel)",
        [],
    )?;

    Ok(())
}
