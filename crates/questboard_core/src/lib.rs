//! Core domain logic for QuestBoard.
//! This crate is the single source of truth for quest and progression invariants.

pub mod board;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use board::state::{
    transition_reward, ActionOutcome, BoardAction, BoardError, BoardState, BoardSummary,
    ReplaceMode, START_QUEST_XP,
};
pub use config::{BoardConfig, EXPORT_FILE_NAME, QUESTS_STORAGE_KEY, STATS_STORAGE_KEY};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::player::{
    threshold_for_level, PlayerStats, ProgressionError, BASE_XP_TO_LEVEL, MAX_XP_AMOUNT,
    XP_INCREMENT_PER_LEVEL,
};
pub use model::quest::{
    Difficulty, Quest, QuestId, QuestPatch, QuestStatus, QuestValidationError, DEFAULT_XP_REWARD,
};
pub use model::sanitize::{
    parse_quest_list, sanitize_player_stats, sanitize_quest, sanitize_quest_list,
    QuestListParseError,
};
pub use repo::storage_repo::{RepoError, RepoResult, SqliteStorageRepository, StorageRepository};
pub use service::board_session::{
    BoardSession, ImportReport, LoadReport, SessionError, SessionResult,
};
pub use service::save_scheduler::SaveScheduler;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
