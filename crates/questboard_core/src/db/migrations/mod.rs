//! Schema history of the board store.
//!
//! # Invariants
//! - `version` values start at 1 and increase by one per entry.
//! - Pending steps run in a single transaction; the applied version is
//!   mirrored to `PRAGMA user_version` inside it.

use crate::db::{DbError, DbResult, STORE_TABLE};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "create_kv_entries",
    sql: include_str!("0001_init.sql"),
}];

/// Returns the schema version this build writes.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings the store schema up to `latest_version` and checks the result.
///
/// # Errors
/// - `UnsupportedSchemaVersion` for files from a newer build.
/// - `Migration` when a step fails; nothing is applied in that case.
/// - `MissingStoreTable` when the schema version is current but the store
///   table does not exist.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let db_version = schema_version(conn)?;
    let latest = latest_version();
    if db_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported: latest,
        });
    }

    // Versions are contiguous from 1, so the pending steps are a suffix.
    let pending = &MIGRATIONS[db_version as usize..];
    if !pending.is_empty() {
        let tx = conn.transaction().map_err(DbError::Configure)?;
        for migration in pending {
            tx.execute_batch(migration.sql)
                .and_then(|()| {
                    tx.pragma_update(None, "user_version", migration.version)
                })
                .map_err(|source| DbError::Migration {
                    version: migration.version,
                    name: migration.name,
                    source,
                })?;
        }
        tx.commit().map_err(DbError::Configure)?;
    }

    if !store_table_exists(conn)? {
        return Err(DbError::MissingStoreTable {
            db_version: latest,
        });
    }
    Ok(())
}

fn schema_version(conn: &Connection) -> DbResult<u32> {
    conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))
        .map_err(DbError::Configure)
}

fn store_table_exists(conn: &Connection) -> DbResult<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
        [STORE_TABLE],
        |row| row.get::<_, bool>(0),
    )
    .map_err(DbError::Configure)
}
