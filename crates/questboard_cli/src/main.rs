//! CLI entry point for local board maintenance.
//!
//! # Responsibility
//! - Smoke-check `questboard_core` linkage (`ping`, `version`).
//! - Export and import quest backups against a board database file.

use questboard_core::db::open_db;
use questboard_core::{BoardConfig, BoardSession, SqliteStorageRepository};
use std::process::ExitCode;

const USAGE: &str = "usage: questboard_cli <ping|version|export <db>|import <db> <file>>";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let result = match args.as_slice() {
        [] | ["ping"] => {
            println!("questboard_core ping={}", questboard_core::ping());
            Ok(())
        }
        ["version"] => {
            println!("questboard_core version={}", questboard_core::core_version());
            Ok(())
        }
        ["export", db] => export(db),
        ["import", db, file] => import(db, file),
        _ => Err(USAGE.to_string()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn open_session(db: &str) -> Result<BoardSession<SqliteStorageRepository>, String> {
    let conn = open_db(db).map_err(|err| format!("failed to open `{db}`: {err}"))?;
    Ok(BoardSession::open(
        SqliteStorageRepository::new(conn),
        BoardConfig::default(),
    ))
}

fn export(db: &str) -> Result<(), String> {
    let session = open_session(db)?;
    let json = session.export_quests_json().map_err(|err| err.to_string())?;
    println!("{json}");
    Ok(())
}

fn import(db: &str, file: &str) -> Result<(), String> {
    let text =
        std::fs::read_to_string(file).map_err(|err| format!("failed to read `{file}`: {err}"))?;

    let mut session = open_session(db)?;
    let report = session
        .import_quests_json(&text)
        .map_err(|err| err.to_string())?;
    if !report.committed {
        return Err(format!("no valid quests in `{file}`; board unchanged"));
    }
    if !session.flush() {
        return Err(format!("failed to save imported quests to `{db}`"));
    }

    println!(
        "imported={} skipped={}",
        report.accepted, report.dropped
    );
    Ok(())
}
