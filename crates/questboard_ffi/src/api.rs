//! FFI use-case API for the board UI shell.
//!
//! # Responsibility
//! - Expose the board mutators and observed state as sync calls.
//! - Own the single process-wide board session.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - The session is loaded before the first mutation reaches it.
//! - Saves are debounced; the shell drives them with `poll_save` and
//!   calls `flush_board` before exit.

use log::warn;
use questboard_core::db::{open_db, open_db_in_memory};
use questboard_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    ActionOutcome, BoardConfig, BoardSession, Difficulty, PlayerStats, Quest, QuestPatch,
    QuestStatus, SessionResult, SqliteStorageRepository, EXPORT_FILE_NAME,
};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

const BOARD_DB_FILE_NAME: &str = "questboard.sqlite3";
static BOARD_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static BOARD_SESSION: Mutex<Option<BoardSession<SqliteStorageRepository>>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Exposes core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory for rolling logs.
/// - Returns empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One quest card as rendered by the board.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// `Backlog|Doing|Done`.
    pub status: String,
    /// `Easy|Normal|Hard|Epic`.
    pub difficulty: String,
    pub xp_reward: f64,
}

/// Player progression as rendered by the stats bar.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStatsView {
    pub level: u32,
    pub current_xp: f64,
    pub xp_to_next_level: f64,
    /// `0..=100`.
    pub progress_percent: f64,
}

/// Full observed state of the board.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    /// `false` only when the board could not be opened at all.
    pub mounted: bool,
    /// Newest first.
    pub quests: Vec<QuestItem>,
    pub stats: PlayerStatsView,
    pub backlog_count: u32,
    pub doing_count: u32,
    pub done_count: u32,
    pub all_complete: bool,
    pub message: String,
}

/// Envelope returned by every mutator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardActionResponse {
    pub ok: bool,
    /// Id of the created quest, for `add_quest`.
    pub quest_id: Option<String>,
    /// State changed and a save was scheduled.
    pub changed: bool,
    /// Cosmetic signal for the celebration effect.
    pub leveled_up: bool,
    pub message: String,
}

impl BoardActionResponse {
    fn from_outcome(message: impl Into<String>, outcome: ActionOutcome) -> Self {
        Self {
            ok: true,
            quest_id: None,
            changed: outcome.changed,
            leveled_up: outcome.leveled_up,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            quest_id: None,
            changed: false,
            leveled_up: false,
            message: message.into(),
        }
    }
}

/// Export payload for the backup file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardExportResponse {
    pub ok: bool,
    /// Pretty-printed JSON array; empty on failure.
    pub json: String,
    pub file_name: String,
    pub message: String,
}

/// Returns the current board state.
#[flutter_rust_bridge::frb(sync)]
pub fn board_snapshot() -> BoardSnapshot {
    match with_session(|session| Ok(to_snapshot(session))) {
        Ok(snapshot) => snapshot,
        Err(err) => BoardSnapshot {
            mounted: false,
            quests: Vec::new(),
            stats: to_stats_view(&PlayerStats::default()),
            backlog_count: 0,
            doing_count: 0,
            done_count: 0,
            all_complete: false,
            message: format!("board_snapshot failed: {err}"),
        },
    }
}

/// Creates a quest in `Backlog`.
///
/// # FFI contract
/// - `difficulty` must be `Easy|Normal|Hard|Epic`.
/// - Blank title is rejected; blank description is dropped.
#[flutter_rust_bridge::frb(sync)]
pub fn add_quest(
    title: String,
    description: Option<String>,
    difficulty: String,
) -> BoardActionResponse {
    let Some(difficulty) = Difficulty::parse(difficulty.trim()) else {
        return BoardActionResponse::failure(format!(
            "add_quest failed: unknown difficulty `{difficulty}`"
        ));
    };
    let quest = match Quest::new(&title, description.as_deref(), difficulty) {
        Ok(quest) => quest,
        Err(err) => return BoardActionResponse::failure(format!("add_quest failed: {err}")),
    };

    let quest_id = quest.id.clone();
    match with_session(|session| session.add_quest(quest)) {
        Ok(outcome) => {
            let mut response = BoardActionResponse::from_outcome("Quest added.", outcome);
            response.quest_id = Some(quest_id);
            response
        }
        Err(err) => BoardActionResponse::failure(format!("add_quest failed: {err}")),
    }
}

/// Moves a quest to another column. Unknown ids succeed with `changed=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn update_quest_status(id: String, status: String) -> BoardActionResponse {
    let Some(status) = QuestStatus::parse(status.trim()) else {
        return BoardActionResponse::failure(format!(
            "update_quest_status failed: unknown status `{status}`"
        ));
    };
    match with_session(|session| session.update_quest_status(id, status)) {
        Ok(outcome) => BoardActionResponse::from_outcome("Quest moved.", outcome),
        Err(err) => BoardActionResponse::failure(format!("update_quest_status failed: {err}")),
    }
}

/// Edits title, description and/or difficulty.
///
/// # FFI contract
/// - `None` leaves a field unchanged.
/// - `description = Some("")` clears the description.
/// - The quest's XP reward never changes.
#[flutter_rust_bridge::frb(sync)]
pub fn update_quest_details(
    id: String,
    title: Option<String>,
    description: Option<String>,
    difficulty: Option<String>,
) -> BoardActionResponse {
    let difficulty = match difficulty.as_deref().map(str::trim) {
        Some(label) => match Difficulty::parse(label) {
            Some(difficulty) => Some(difficulty),
            None => {
                return BoardActionResponse::failure(format!(
                    "update_quest_details failed: unknown difficulty `{label}`"
                ));
            }
        },
        None => None,
    };
    let patch = QuestPatch {
        title,
        description: description.map(Some),
        difficulty,
    };

    match with_session(|session| session.update_quest_details(id, patch)) {
        Ok(outcome) => BoardActionResponse::from_outcome("Quest updated.", outcome),
        Err(err) => BoardActionResponse::failure(format!("update_quest_details failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn delete_quest(id: String) -> BoardActionResponse {
    match with_session(|session| session.delete_quest(id)) {
        Ok(outcome) => BoardActionResponse::from_outcome("Quest deleted.", outcome),
        Err(err) => BoardActionResponse::failure(format!("delete_quest failed: {err}")),
    }
}

/// Removes every quest. The shell must confirm with the user first.
#[flutter_rust_bridge::frb(sync)]
pub fn clear_all_quests() -> BoardActionResponse {
    match with_session(|session| session.clear_all_quests()) {
        Ok(outcome) => BoardActionResponse::from_outcome("Quest log cleared.", outcome),
        Err(err) => BoardActionResponse::failure(format!("clear_all_quests failed: {err}")),
    }
}

/// Replaces the board with the quests in an import file.
///
/// Files with no usable quest leave the board untouched and report
/// `changed=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn import_quests(json: String) -> BoardActionResponse {
    match with_session(|session| session.import_quests_json(&json)) {
        Ok(report) if report.committed => BoardActionResponse {
            ok: true,
            quest_id: None,
            changed: true,
            leveled_up: false,
            message: format!(
                "Imported {} quest(s), skipped {}.",
                report.accepted, report.dropped
            ),
        },
        Ok(_) => BoardActionResponse {
            ok: true,
            quest_id: None,
            changed: false,
            leveled_up: false,
            message: "No valid quests found; board unchanged.".to_string(),
        },
        Err(err) => BoardActionResponse::failure(format!("import_quests failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn export_quests() -> BoardExportResponse {
    match with_session(|session| session.export_quests_json()) {
        Ok(json) => BoardExportResponse {
            ok: true,
            json,
            file_name: EXPORT_FILE_NAME.to_string(),
            message: "Export ready.".to_string(),
        },
        Err(err) => BoardExportResponse {
            ok: false,
            json: String::new(),
            file_name: EXPORT_FILE_NAME.to_string(),
            message: format!("export_quests failed: {err}"),
        },
    }
}

/// Writes the board when the debounce window has elapsed.
///
/// Returns `true` when a write was attempted. Intended for a UI timer.
#[flutter_rust_bridge::frb(sync)]
pub fn poll_save() -> bool {
    with_session(|session| Ok(session.poll_save())).unwrap_or(false)
}

/// Writes any pending change immediately. Call before the app exits.
#[flutter_rust_bridge::frb(sync)]
pub fn flush_board() -> bool {
    with_session(|session| Ok(session.flush())).unwrap_or(false)
}

fn resolve_board_db_path() -> PathBuf {
    BOARD_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("QUESTBOARD_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(BOARD_DB_FILE_NAME)
        })
        .clone()
}

/// Opens the on-disk board, or an in-memory one when the file is unusable.
fn open_session() -> Result<BoardSession<SqliteStorageRepository>, String> {
    let conn = match open_db(resolve_board_db_path()) {
        Ok(conn) => conn,
        Err(err) => {
            warn!("event=board_open module=ffi status=error fallback=memory error={err}");
            open_db_in_memory().map_err(|err| format!("board DB open failed: {err}"))?
        }
    };
    Ok(BoardSession::open(
        SqliteStorageRepository::new(conn),
        BoardConfig::default(),
    ))
}

fn with_session<T>(
    f: impl FnOnce(&mut BoardSession<SqliteStorageRepository>) -> SessionResult<T>,
) -> Result<T, String> {
    let mut guard = BOARD_SESSION
        .lock()
        .map_err(|_| "board session lock poisoned".to_string())?;
    if guard.is_none() {
        *guard = Some(open_session()?);
    }
    match guard.as_mut() {
        Some(session) => f(session).map_err(|err| err.to_string()),
        None => Err("board session unavailable".to_string()),
    }
}

fn to_snapshot(session: &BoardSession<SqliteStorageRepository>) -> BoardSnapshot {
    let summary = session.summary();
    BoardSnapshot {
        mounted: session.is_mounted(),
        quests: session.quests().iter().map(to_quest_item).collect(),
        stats: to_stats_view(session.player_stats()),
        backlog_count: count_u32(summary.backlog),
        doing_count: count_u32(summary.doing),
        done_count: count_u32(summary.done),
        all_complete: summary.all_complete,
        message: if summary.total == 0 {
            "The quest log is empty.".to_string()
        } else {
            format!("{} quest(s) on the board.", summary.total)
        },
    }
}

fn to_quest_item(quest: &Quest) -> QuestItem {
    QuestItem {
        id: quest.id.clone(),
        title: quest.title.clone(),
        description: quest.description.clone(),
        status: quest.status.as_str().to_string(),
        difficulty: quest.difficulty.as_str().to_string(),
        xp_reward: quest.xp_reward,
    }
}

fn to_stats_view(stats: &PlayerStats) -> PlayerStatsView {
    PlayerStatsView {
        level: stats.level,
        current_xp: stats.current_xp,
        xp_to_next_level: stats.xp_to_next_level,
        progress_percent: stats.progress_percent(),
    }
}

fn count_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
