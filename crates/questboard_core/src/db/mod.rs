//! SQLite bootstrap for the local key-value store.
//!
//! # Responsibility
//! - Open the board database and bring `kv_entries` up to date.
//! - Refuse databases this build cannot safely read or write.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - A returned connection always has a `kv_entries` table.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

/// Table holding every stored board entry.
pub const STORE_TABLE: &str = "kv_entries";

pub type DbResult<T> = Result<T, DbError>;

/// Failure to produce a usable board store connection.
#[derive(Debug)]
pub enum DbError {
    /// SQLite could not open `target` (a file path or `:memory:`).
    Open {
        target: String,
        source: rusqlite::Error,
    },
    /// Connection pragmas or schema inspection failed.
    Configure(rusqlite::Error),
    /// A migration step failed and was rolled back.
    Migration {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
    /// The file was written by a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Schema version claims to be current but the store table is absent,
    /// so the file belongs to some other application.
    MissingStoreTable { db_version: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { target, source } => {
                write!(f, "cannot open board store `{target}`: {source}")
            }
            Self::Configure(err) => write!(f, "cannot configure board store: {err}"),
            Self::Migration {
                version,
                name,
                source,
            } => write!(f, "board store migration {version} ({name}) failed: {source}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "board store schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::MissingStoreTable { db_version } => write!(
                f,
                "database at schema version {db_version} has no `{STORE_TABLE}` table"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Migration { source, .. } => Some(source),
            Self::Configure(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::MissingStoreTable { .. } => None,
        }
    }
}
