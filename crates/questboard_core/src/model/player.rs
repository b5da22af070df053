//! Player progression model.
//!
//! # Responsibility
//! - Track level and XP for the single local player.
//! - Apply level-up rollover deterministically.
//!
//! # Invariants
//! - `level >= 1`.
//! - `xp_to_next_level == threshold_for_level(level)`.
//! - `0 <= current_xp < xp_to_next_level` after every award.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// XP required to leave level 1.
pub const BASE_XP_TO_LEVEL: f64 = 100.0;
/// Extra XP required per level above 1.
pub const XP_INCREMENT_PER_LEVEL: f64 = 50.0;
/// Largest XP amount accepted in one award, as a quest reward or as stored
/// current XP.
pub const MAX_XP_AMOUNT: f64 = 1_000_000.0;

/// XP needed to advance from `level` to `level + 1`.
///
/// Monotonically non-decreasing; never below `BASE_XP_TO_LEVEL`, which keeps
/// the rollover loop in `award_xp` terminating.
pub fn threshold_for_level(level: u32) -> f64 {
    let steps = f64::from(level.saturating_sub(1));
    BASE_XP_TO_LEVEL.max(BASE_XP_TO_LEVEL + steps * XP_INCREMENT_PER_LEVEL)
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressionError {
    /// Award amounts must be finite and within `0..=MAX_XP_AMOUNT`.
    InvalidAmount(f64),
}

impl Display for ProgressionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAmount(amount) => {
                write!(
                    f,
                    "xp award must be finite and within 0..={MAX_XP_AMOUNT}, got {amount}"
                )
            }
        }
    }
}

impl Error for ProgressionError {}

/// Singleton progression record, persisted as
/// `{"level","currentXp","xpToNextLevel"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub level: u32,
    pub current_xp: f64,
    pub xp_to_next_level: f64,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            level: 1,
            current_xp: 0.0,
            xp_to_next_level: BASE_XP_TO_LEVEL,
        }
    }
}

impl PlayerStats {
    /// Adds `amount` XP and rolls over into as many levels as it covers.
    ///
    /// Returns `true` when at least one level was gained.
    ///
    /// # Errors
    /// - `InvalidAmount` for negative, oversized or non-finite input; stats
    ///   are untouched.
    pub fn award_xp(&mut self, amount: f64) -> Result<bool, ProgressionError> {
        if !is_valid_xp_amount(amount) {
            return Err(ProgressionError::InvalidAmount(amount));
        }

        self.current_xp += amount;
        Ok(self.roll_over())
    }

    /// Share of the current level already earned, as a `0..=100` percentage.
    pub fn progress_percent(&self) -> f64 {
        if self.xp_to_next_level <= 0.0 {
            return 0.0;
        }
        (self.current_xp / self.xp_to_next_level * 100.0).clamp(0.0, 100.0)
    }

    /// Converts overflowed XP into levels.
    ///
    /// XP that can no longer be converted (level cap reached, or a value so
    /// large that subtracting the threshold leaves it unchanged) is discarded.
    pub(crate) fn roll_over(&mut self) -> bool {
        let mut leveled_up = false;
        while self.current_xp >= self.xp_to_next_level {
            let remaining = self.current_xp - self.xp_to_next_level;
            if self.level == u32::MAX || remaining >= self.current_xp {
                self.current_xp = 0.0;
                break;
            }
            self.current_xp = remaining;
            self.level += 1;
            self.xp_to_next_level = threshold_for_level(self.level);
            leveled_up = true;
        }
        leveled_up
    }
}

pub(crate) fn is_valid_xp_amount(value: f64) -> bool {
    value.is_finite() && (0.0..=MAX_XP_AMOUNT).contains(&value)
}
