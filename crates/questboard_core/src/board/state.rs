//! Board reducer: quest store operations plus the transition reward rule.
//!
//! # Responsibility
//! - Maintain newest-first quest ordering.
//! - Translate status transitions into XP awards.
//! - Route untrusted bulk replacements through sanitization.
//!
//! # Invariants
//! - Failed actions leave the state untouched.
//! - Unknown ids are no-ops, not errors.
//! - Rewards key only on the `(old, new)` status pair. No per-quest
//!   "already rewarded" flag exists, so cycling a quest re-grants XP.

use crate::model::player::{PlayerStats, ProgressionError};
use crate::model::quest::{Quest, QuestId, QuestPatch, QuestStatus, QuestValidationError};
use crate::model::sanitize::sanitize_quest_list;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed XP granted for starting a quest (`Backlog -> Doing`).
pub const START_QUEST_XP: f64 = 10.0;

/// XP granted for moving a quest from `from` to `to`.
///
/// `quest_reward` is the quest's own `xp_reward`, used for completion.
pub fn transition_reward(from: QuestStatus, to: QuestStatus, quest_reward: f64) -> Option<f64> {
    match (from, to) {
        (QuestStatus::Backlog, QuestStatus::Doing) => Some(START_QUEST_XP),
        (QuestStatus::Doing, QuestStatus::Done) => Some(quest_reward),
        _ => None,
    }
}

/// How a bulk replacement treats an empty sanitized result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceMode {
    /// Storage load: always commit, an empty list is the "no quests yet" state.
    Restore,
    /// File import: only commit when at least one quest survived.
    Import,
}

/// Every mutation the board accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardAction {
    Add(Quest),
    UpdateStatus { id: QuestId, status: QuestStatus },
    UpdateDetails { id: QuestId, patch: QuestPatch },
    Delete { id: QuestId },
    ClearAll,
    ReplaceAll { raw: Value, mode: ReplaceMode },
}

/// What an applied action did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionOutcome {
    /// State differs from before the action.
    pub changed: bool,
    /// At least one level was gained.
    pub leveled_up: bool,
}

impl ActionOutcome {
    fn unchanged() -> Self {
        Self::default()
    }

    fn changed() -> Self {
        Self {
            changed: true,
            leveled_up: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoardError {
    Validation(QuestValidationError),
    Progression(ProgressionError),
    DuplicateQuestId(QuestId),
    /// New quests must enter the board in `Backlog`.
    NotBacklog(QuestStatus),
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Progression(err) => write!(f, "{err}"),
            Self::DuplicateQuestId(id) => write!(f, "quest id already exists: {id}"),
            Self::NotBacklog(status) => {
                write!(f, "new quests must start in Backlog, got {status}")
            }
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Progression(err) => Some(err),
            Self::DuplicateQuestId(_) | Self::NotBacklog(_) => None,
        }
    }
}

impl From<QuestValidationError> for BoardError {
    fn from(value: QuestValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ProgressionError> for BoardError {
    fn from(value: ProgressionError) -> Self {
        Self::Progression(value)
    }
}

/// Per-column counts shown in the board header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardSummary {
    pub backlog: usize,
    pub doing: usize,
    pub done: usize,
    pub total: usize,
    /// Non-empty board where every quest is done.
    pub all_complete: bool,
}

/// Whole session state: ordered quests plus player progression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardState {
    quests: Vec<Quest>,
    stats: PlayerStats,
}

impl BoardState {
    pub fn new(quests: Vec<Quest>, stats: PlayerStats) -> Self {
        Self { quests, stats }
    }

    /// Quests in display order, newest first.
    pub fn quests(&self) -> &[Quest] {
        &self.quests
    }

    pub fn stats(&self) -> &PlayerStats {
        &self.stats
    }

    pub fn quest(&self, id: &str) -> Option<&Quest> {
        self.quests.iter().find(|quest| quest.id == id)
    }

    pub fn summary(&self) -> BoardSummary {
        let mut summary = BoardSummary {
            total: self.quests.len(),
            ..BoardSummary::default()
        };
        for quest in &self.quests {
            match quest.status {
                QuestStatus::Backlog => summary.backlog += 1,
                QuestStatus::Doing => summary.doing += 1,
                QuestStatus::Done => summary.done += 1,
            }
        }
        summary.all_complete = summary.total > 0 && summary.done == summary.total;
        summary
    }

    /// Applies one action.
    ///
    /// # Errors
    /// - `Add` rejects invalid quests, non-`Backlog` quests and duplicate ids.
    /// - `UpdateDetails` rejects a title patch that is blank after trimming.
    pub fn apply(&mut self, action: BoardAction) -> Result<ActionOutcome, BoardError> {
        match action {
            BoardAction::Add(quest) => self.add(quest),
            BoardAction::UpdateStatus { id, status } => self.update_status(&id, status),
            BoardAction::UpdateDetails { id, patch } => self.update_details(&id, &patch),
            BoardAction::Delete { id } => Ok(self.delete(&id)),
            BoardAction::ClearAll => Ok(self.clear_all()),
            BoardAction::ReplaceAll { raw, mode } => Ok(self.replace_all(&raw, mode)),
        }
    }

    fn add(&mut self, quest: Quest) -> Result<ActionOutcome, BoardError> {
        quest.validate()?;
        if quest.status != QuestStatus::Backlog {
            return Err(BoardError::NotBacklog(quest.status));
        }
        if self.quest(&quest.id).is_some() {
            return Err(BoardError::DuplicateQuestId(quest.id));
        }

        self.quests.insert(0, quest);
        Ok(ActionOutcome::changed())
    }

    fn update_status(
        &mut self,
        id: &str,
        status: QuestStatus,
    ) -> Result<ActionOutcome, BoardError> {
        let Some(quest) = self.quests.iter_mut().find(|quest| quest.id == id) else {
            return Ok(ActionOutcome::unchanged());
        };

        let mut leveled_up = false;
        if let Some(reward) = transition_reward(quest.status, status, quest.xp_reward) {
            leveled_up = self.stats.award_xp(reward)?;
        }

        let changed = quest.status != status || leveled_up;
        quest.status = status;
        Ok(ActionOutcome {
            changed,
            leveled_up,
        })
    }

    fn update_details(
        &mut self,
        id: &str,
        patch: &QuestPatch,
    ) -> Result<ActionOutcome, BoardError> {
        let Some(quest) = self.quests.iter_mut().find(|quest| quest.id == id) else {
            return Ok(ActionOutcome::unchanged());
        };
        if patch.is_empty() {
            return Ok(ActionOutcome::unchanged());
        }

        patch.apply_to(quest)?;
        Ok(ActionOutcome::changed())
    }

    fn delete(&mut self, id: &str) -> ActionOutcome {
        let before = self.quests.len();
        self.quests.retain(|quest| quest.id != id);
        if self.quests.len() == before {
            ActionOutcome::unchanged()
        } else {
            ActionOutcome::changed()
        }
    }

    fn clear_all(&mut self) -> ActionOutcome {
        if self.quests.is_empty() {
            return ActionOutcome::unchanged();
        }
        self.quests.clear();
        ActionOutcome::changed()
    }

    /// Sanitizes `raw` and swaps it in according to `mode`.
    pub fn replace_all(&mut self, raw: &Value, mode: ReplaceMode) -> ActionOutcome {
        let sanitized = sanitize_quest_list(raw);
        if mode == ReplaceMode::Import && sanitized.is_empty() {
            return ActionOutcome::unchanged();
        }

        self.quests = sanitized;
        ActionOutcome::changed()
    }
}
