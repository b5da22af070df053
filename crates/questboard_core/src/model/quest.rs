//! Quest domain model.
//!
//! # Responsibility
//! - Define the task record moved across the board columns.
//! - Derive the fixed XP reward from difficulty at creation time.
//!
//! # Invariants
//! - `id` is assigned once and never reused for another quest.
//! - `title` is non-empty after trimming.
//! - `xp_reward` is finite, within `0..=MAX_XP_AMOUNT`, and never
//!   recomputed after creation.

use crate::model::player::{is_valid_xp_amount, MAX_XP_AMOUNT};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque quest identifier.
///
/// New quests get a UUID v4 string, but imported data may carry any
/// non-empty text, so the type stays a plain string.
pub type QuestId = String;

/// XP granted when a quest is completed and no valid reward is known.
pub const DEFAULT_XP_REWARD: f64 = 50.0;

/// Board column / workflow stage of a quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QuestStatus {
    /// Queued, not started.
    #[default]
    Backlog,
    /// In progress.
    Doing,
    /// Completed. May still be reopened.
    Done,
}

impl QuestStatus {
    pub const ALL: [QuestStatus; 3] = [Self::Backlog, Self::Doing, Self::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Backlog => "Backlog",
            Self::Doing => "Doing",
            Self::Done => "Done",
        }
    }

    /// Parses the exact wire label. Anything else is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }
}

impl Display for QuestStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Difficulty chosen at creation. Drives the completion reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Epic,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [Self::Easy, Self::Normal, Self::Hard, Self::Epic];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Normal => "Normal",
            Self::Hard => "Hard",
            Self::Epic => "Epic",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.as_str() == value)
    }

    /// XP granted on `Doing -> Done` for a quest created at this difficulty.
    pub fn xp_reward(self) -> f64 {
        match self {
            Self::Easy => 25.0,
            Self::Normal => 50.0,
            Self::Hard => 75.0,
            Self::Epic => 120.0,
        }
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures for quest construction and edits.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestValidationError {
    EmptyId,
    EmptyTitle,
    InvalidXpReward(f64),
}

impl Display for QuestValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "quest id cannot be empty"),
            Self::EmptyTitle => write!(f, "quest title cannot be empty"),
            Self::InvalidXpReward(value) => {
                write!(
                    f,
                    "xp reward must be finite and within 0..={MAX_XP_AMOUNT}, got {value}"
                )
            }
        }
    }
}

impl Error for QuestValidationError {}

/// Canonical quest record, serialized with the camelCase wire names used by
/// storage and export files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: QuestId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: QuestStatus,
    pub difficulty: Difficulty,
    pub xp_reward: f64,
}

impl Quest {
    /// Creates a `Backlog` quest with a generated id.
    ///
    /// # Invariants
    /// - Title and description are trimmed; a blank description becomes `None`.
    /// - `xp_reward` is derived from `difficulty` and fixed from here on.
    ///
    /// # Errors
    /// - Returns `EmptyTitle` when the trimmed title is empty.
    pub fn new(
        title: &str,
        description: Option<&str>,
        difficulty: Difficulty,
    ) -> Result<Self, QuestValidationError> {
        let title = normalize_title(title)?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            title,
            description: normalize_description(description),
            status: QuestStatus::Backlog,
            difficulty,
            xp_reward: difficulty.xp_reward(),
        })
    }

    /// Checks the record-level invariants.
    pub fn validate(&self) -> Result<(), QuestValidationError> {
        if self.id.is_empty() {
            return Err(QuestValidationError::EmptyId);
        }
        if self.title.trim().is_empty() {
            return Err(QuestValidationError::EmptyTitle);
        }
        if !is_valid_xp_amount(self.xp_reward) {
            return Err(QuestValidationError::InvalidXpReward(self.xp_reward));
        }
        Ok(())
    }
}

/// Partial edit accepted by the details update path.
///
/// Only title, description and difficulty are editable; `id`, `status` and
/// `xp_reward` cannot be reached through a patch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestPatch {
    pub title: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub difficulty: Option<Difficulty>,
}

impl QuestPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.difficulty.is_none()
    }

    /// Merges this patch into `quest`. The quest is untouched on error.
    pub(crate) fn apply_to(&self, quest: &mut Quest) -> Result<(), QuestValidationError> {
        let title = match self.title.as_deref() {
            Some(raw) => Some(normalize_title(raw)?),
            None => None,
        };

        if let Some(title) = title {
            quest.title = title;
        }
        if let Some(description) = &self.description {
            quest.description = normalize_description(description.as_deref());
        }
        if let Some(difficulty) = self.difficulty {
            quest.difficulty = difficulty;
        }
        Ok(())
    }
}

pub(crate) fn normalize_title(raw: &str) -> Result<String, QuestValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(QuestValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_description(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
