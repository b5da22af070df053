//! Board session controller.
//!
//! # Responsibility
//! - Load the board from storage once, then accept mutations.
//! - Schedule debounced saves after every state change.
//! - Expose import/export of the quest list as JSON files.
//!
//! # Invariants
//! - No mutation is accepted and no save fires before `load` completes.
//! - Storage failures are logged and never roll back in-memory state.
//! - Logs carry counts and keys only, never quest titles or descriptions.

use crate::board::state::{
    ActionOutcome, BoardAction, BoardError, BoardState, BoardSummary, ReplaceMode,
};
use crate::config::BoardConfig;
use crate::model::player::PlayerStats;
use crate::model::quest::{Quest, QuestId, QuestPatch, QuestStatus};
use crate::model::sanitize::{parse_quest_list, sanitize_player_stats};
use crate::repo::storage_repo::StorageRepository;
use crate::service::save_scheduler::SaveScheduler;
use log::{debug, error, info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug)]
pub enum SessionError {
    /// Mutation attempted before the initial load.
    NotMounted,
    Board(BoardError),
    Serialize(serde_json::Error),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotMounted => write!(f, "board session is not loaded yet"),
            Self::Board(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "failed to encode board data: {err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotMounted => None,
            Self::Board(err) => Some(err),
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<BoardError> for SessionError {
    fn from(value: BoardError) -> Self {
        Self::Board(value)
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Result of the initial storage read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub quests_loaded: usize,
    /// Stored stats were found and parsed (after sanitization).
    pub stats_restored: bool,
}

/// Result of a file import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Quests that survived sanitization.
    pub accepted: usize,
    /// Elements dropped by sanitization.
    pub dropped: usize,
    /// Board contents were replaced.
    pub committed: bool,
}

type LevelUpHook = Box<dyn FnMut(&PlayerStats) + Send>;

/// Owns the live board and mirrors it into a `StorageRepository`.
pub struct BoardSession<R: StorageRepository> {
    repo: R,
    config: BoardConfig,
    state: BoardState,
    mounted: bool,
    scheduler: SaveScheduler,
    level_up_hook: Option<LevelUpHook>,
}

impl<R: StorageRepository> BoardSession<R> {
    /// Creates an unmounted session with default state.
    pub fn new(repo: R, config: BoardConfig) -> Self {
        let scheduler = SaveScheduler::new(config.save_debounce);
        Self {
            repo,
            config,
            state: BoardState::default(),
            mounted: false,
            scheduler,
            level_up_hook: None,
        }
    }

    /// Creates a session and loads it immediately.
    pub fn open(repo: R, config: BoardConfig) -> Self {
        let mut session = Self::new(repo, config);
        session.load();
        session
    }

    /// Reads quests and stats from storage and mounts the session.
    ///
    /// Unreadable or malformed entries fall back to the empty board and
    /// default stats. Calling this on a mounted session is a no-op.
    pub fn load(&mut self) -> LoadReport {
        if self.mounted {
            return LoadReport {
                quests_loaded: self.state.quests().len(),
                stats_restored: false,
            };
        }

        let started_at = Instant::now();
        info!("event=board_load module=service status=start");

        let quests_raw = self
            .read_entry(&self.config.quests_key)
            .and_then(|text| match parse_quest_list(&text) {
                Ok(raw) => Some(raw),
                Err(err) => {
                    warn!(
                        "event=board_load module=service status=error key={} error_code=quests_unparseable error={}",
                        self.config.quests_key, err
                    );
                    None
                }
            });

        let stats = self
            .read_entry(&self.config.stats_key)
            .and_then(|text| match serde_json::from_str::<Value>(&text) {
                Ok(raw) => Some(sanitize_player_stats(&raw)),
                Err(err) => {
                    warn!(
                        "event=board_load module=service status=error key={} error_code=stats_unparseable error={}",
                        self.config.stats_key, err
                    );
                    None
                }
            });
        let stats_restored = stats.is_some();

        let mut state = BoardState::new(Vec::new(), stats.unwrap_or_default());
        if let Some(raw) = quests_raw {
            state.replace_all(&raw, ReplaceMode::Restore);
        }
        let report = LoadReport {
            quests_loaded: state.quests().len(),
            stats_restored,
        };
        self.state = state;
        self.mounted = true;

        info!(
            "event=board_load module=service status=ok duration_ms={} quests={} stats_restored={}",
            started_at.elapsed().as_millis(),
            report.quests_loaded,
            report.stats_restored
        );
        report
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn quests(&self) -> &[Quest] {
        self.state.quests()
    }

    pub fn player_stats(&self) -> &PlayerStats {
        self.state.stats()
    }

    pub fn summary(&self) -> BoardSummary {
        self.state.summary()
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Registers a callback fired after any action that gains a level.
    ///
    /// Receives the stats after rollover. Replaces any earlier hook.
    pub fn set_level_up_hook(&mut self, hook: impl FnMut(&PlayerStats) + Send + 'static) {
        self.level_up_hook = Some(Box::new(hook));
    }

    /// Applies an action, scheduling a save when the state changed.
    ///
    /// # Errors
    /// - `NotMounted` before `load`.
    /// - `Board` when the reducer rejects the action.
    pub fn dispatch(&mut self, action: BoardAction) -> SessionResult<ActionOutcome> {
        if !self.mounted {
            return Err(SessionError::NotMounted);
        }

        let outcome = self.state.apply(action)?;
        if outcome.changed {
            self.scheduler.schedule_at(Instant::now());
        }
        if outcome.leveled_up {
            let stats = self.state.stats();
            info!(
                "event=level_up module=service status=ok level={}",
                stats.level
            );
            if let Some(hook) = self.level_up_hook.as_mut() {
                hook(stats);
            }
        }
        Ok(outcome)
    }

    pub fn add_quest(&mut self, quest: Quest) -> SessionResult<ActionOutcome> {
        self.dispatch(BoardAction::Add(quest))
    }

    pub fn update_quest_status(
        &mut self,
        id: impl Into<QuestId>,
        status: QuestStatus,
    ) -> SessionResult<ActionOutcome> {
        self.dispatch(BoardAction::UpdateStatus {
            id: id.into(),
            status,
        })
    }

    pub fn update_quest_details(
        &mut self,
        id: impl Into<QuestId>,
        patch: QuestPatch,
    ) -> SessionResult<ActionOutcome> {
        self.dispatch(BoardAction::UpdateDetails {
            id: id.into(),
            patch,
        })
    }

    pub fn delete_quest(&mut self, id: impl Into<QuestId>) -> SessionResult<ActionOutcome> {
        self.dispatch(BoardAction::Delete { id: id.into() })
    }

    /// Empties the board. Confirmation is the caller's job.
    pub fn clear_all_quests(&mut self) -> SessionResult<ActionOutcome> {
        self.dispatch(BoardAction::ClearAll)
    }

    pub fn replace_quests(&mut self, raw: Value, mode: ReplaceMode) -> SessionResult<ActionOutcome> {
        self.dispatch(BoardAction::ReplaceAll { raw, mode })
    }

    /// Imports a quest file.
    ///
    /// Unparseable text or a file with no usable quest is logged and leaves
    /// the board untouched.
    ///
    /// # Errors
    /// - `NotMounted` before `load`.
    pub fn import_quests_json(&mut self, text: &str) -> SessionResult<ImportReport> {
        if !self.mounted {
            return Err(SessionError::NotMounted);
        }

        let raw = match parse_quest_list(text) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("event=board_import module=service status=error error_code=unparseable error={err}");
                return Ok(ImportReport::default());
            }
        };

        let total = raw.as_array().map_or(0, Vec::len);
        let outcome = self.replace_quests(raw, ReplaceMode::Import)?;
        let accepted = if outcome.changed {
            self.state.quests().len()
        } else {
            0
        };
        let report = ImportReport {
            accepted,
            dropped: total - accepted,
            committed: outcome.changed,
        };

        info!(
            "event=board_import module=service status=ok accepted={} dropped={} committed={}",
            report.accepted, report.dropped, report.committed
        );
        Ok(report)
    }

    /// Pretty-printed JSON array of the current quests.
    pub fn export_quests_json(&self) -> SessionResult<String> {
        Ok(serde_json::to_string_pretty(self.state.quests())?)
    }

    pub fn has_pending_save(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Writes the board if the debounce window has elapsed.
    ///
    /// Returns `true` when a write was attempted.
    pub fn poll_save(&mut self) -> bool {
        self.poll_save_at(Instant::now())
    }

    pub fn poll_save_at(&mut self, now: Instant) -> bool {
        if !self.mounted || !self.scheduler.take_due(now) {
            return false;
        }
        self.persist();
        true
    }

    /// Writes a pending save immediately.
    ///
    /// Returns `true` when the write succeeded, `false` when nothing was
    /// pending or storage failed.
    pub fn flush(&mut self) -> bool {
        if !self.mounted || !self.scheduler.is_pending() {
            return false;
        }
        self.scheduler.cancel();
        self.persist()
    }

    fn persist(&mut self) -> bool {
        let started_at = Instant::now();
        let quests = match serde_json::to_string(self.state.quests()) {
            Ok(text) => text,
            Err(err) => {
                error!("event=board_save module=service status=error error_code=encode_failed error={err}");
                return false;
            }
        };
        let stats = match serde_json::to_string(self.state.stats()) {
            Ok(text) => text,
            Err(err) => {
                error!("event=board_save module=service status=error error_code=encode_failed error={err}");
                return false;
            }
        };

        let mut ok = true;
        for (key, value) in [
            (self.config.quests_key.as_str(), quests.as_str()),
            (self.config.stats_key.as_str(), stats.as_str()),
        ] {
            if let Err(err) = self.repo.set_item(key, value) {
                error!(
                    "event=board_save module=service status=error key={key} error_code=write_failed error={err}"
                );
                ok = false;
            }
        }

        if ok {
            debug!(
                "event=board_save module=service status=ok duration_ms={} quests={}",
                started_at.elapsed().as_millis(),
                self.state.quests().len()
            );
        }
        ok
    }

    fn read_entry(&self, key: &str) -> Option<String> {
        match self.repo.get_item(key) {
            Ok(value) => value,
            Err(err) => {
                error!(
                    "event=board_load module=service status=error key={key} error_code=read_failed error={err}"
                );
                None
            }
        }
    }
}
