use questboard_core::db::migrations::latest_version;
use questboard_core::db::{open_db, open_db_in_memory, DbError, STORE_TABLE};
use questboard_core::{RepoError, SqliteStorageRepository, StorageRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(schema_version(&conn), latest_version());

    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
            );",
            [STORE_TABLE],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1);
}

#[test]
fn opening_same_database_twice_is_idempotent_and_keeps_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.db");

    let repo = SqliteStorageRepository::new(open_db(&path).unwrap());
    repo.set_item("focusquest-quests", "[]").unwrap();
    drop(repo);

    let repo = SqliteStorageRepository::new(open_db(&path).unwrap());
    assert_eq!(schema_version(repo.connection()), latest_version());
    assert_eq!(
        repo.get_item("focusquest-quests").unwrap().as_deref(),
        Some("[]")
    );
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn current_schema_without_store_table_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("foreign.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(&format!(
        "CREATE TABLE notes (id INTEGER PRIMARY KEY); PRAGMA user_version = {};",
        latest_version()
    ))
    .unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert!(matches!(err, DbError::MissingStoreTable { .. }));
    assert!(err.to_string().contains(STORE_TABLE));
}

#[test]
fn unopenable_path_reports_its_target() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("board.db");

    match open_db(&path).unwrap_err() {
        DbError::Open { target, .. } => assert!(target.ends_with("board.db")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn set_get_overwrite_and_remove() {
    let repo = SqliteStorageRepository::new(open_db_in_memory().unwrap());

    assert_eq!(repo.get_item("missing").unwrap(), None);

    repo.set_item("k", "first").unwrap();
    repo.set_item("k", "second").unwrap();
    assert_eq!(repo.get_item("k").unwrap().as_deref(), Some("second"));

    repo.remove_item("k").unwrap();
    repo.remove_item("k").unwrap();
    assert_eq!(repo.get_item("k").unwrap(), None);
}

#[test]
fn blank_keys_are_rejected() {
    let repo = SqliteStorageRepository::new(open_db_in_memory().unwrap());
    assert!(matches!(
        repo.set_item("  ", "value").unwrap_err(),
        RepoError::InvalidKey(_)
    ));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}
