//! Board session configuration.
//!
//! # Invariants
//! - Storage keys are stable across releases; renaming them orphans saved boards.

use std::time::Duration;

/// Storage key holding the quest list JSON array.
pub const QUESTS_STORAGE_KEY: &str = "focusquest-quests";
/// Storage key holding the player stats JSON object.
pub const STATS_STORAGE_KEY: &str = "focusquest-stats";
/// Quiet period between the last change and the write.
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(300);
/// Suggested file name for quest exports.
pub const EXPORT_FILE_NAME: &str = "focusquest-backup.json";

/// Runtime knobs for a `BoardSession`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub quests_key: String,
    pub stats_key: String,
    pub save_debounce: Duration,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            quests_key: QUESTS_STORAGE_KEY.to_string(),
            stats_key: STATS_STORAGE_KEY.to_string(),
            save_debounce: SAVE_DEBOUNCE,
        }
    }
}

impl BoardConfig {
    /// Same keys, different quiet period.
    pub fn with_save_debounce(mut self, save_debounce: Duration) -> Self {
        self.save_debounce = save_debounce;
        self
    }
}
