//! Trust boundary for quest and stats data coming from storage or files.
//!
//! # Responsibility
//! - Coerce untrusted JSON into records satisfying the model invariants.
//! - Drop records that cannot be recovered instead of failing the batch.
//!
//! # Invariants
//! - The same rules apply regardless of where the data came from.
//! - Sanitizing never fails; only the JSON text parse step can.
//! - Sanitizing already-sanitized output yields the same records.

use crate::model::player::{is_valid_xp_amount, threshold_for_level, PlayerStats};
use crate::model::quest::{
    normalize_description, normalize_title, Difficulty, Quest, QuestStatus, DEFAULT_XP_REWARD,
};
use serde_json::Value;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure to turn raw text into a quest list candidate.
#[derive(Debug)]
pub enum QuestListParseError {
    InvalidJson(serde_json::Error),
    /// Top-level JSON value is not an array.
    NotAList,
}

impl Display for QuestListParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidJson(err) => write!(f, "invalid quest list json: {err}"),
            Self::NotAList => write!(f, "quest list json must be an array"),
        }
    }
}

impl Error for QuestListParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidJson(err) => Some(err),
            Self::NotAList => None,
        }
    }
}

impl From<serde_json::Error> for QuestListParseError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidJson(value)
    }
}

/// Coerces one untrusted element into a quest.
///
/// Returns `None` when the element is not an object or lacks a usable
/// `id`/`title`; every other field falls back to its default.
pub fn sanitize_quest(raw: &Value) -> Option<Quest> {
    let object = raw.as_object()?;

    let id = object
        .get("id")
        .filter(|value| is_truthy(value))
        .and_then(coerce_text)?;
    let title = object
        .get("title")
        .filter(|value| is_truthy(value))
        .and_then(coerce_text)
        .and_then(|text| normalize_title(&text).ok())?;

    let description = object
        .get("description")
        .filter(|value| is_truthy(value))
        .and_then(coerce_text);

    let status = object
        .get("status")
        .and_then(Value::as_str)
        .and_then(QuestStatus::parse)
        .unwrap_or_default();
    let difficulty = object
        .get("difficulty")
        .and_then(Value::as_str)
        .and_then(Difficulty::parse)
        .unwrap_or_default();
    let xp_reward = object
        .get("xpReward")
        .and_then(Value::as_f64)
        .filter(|value| is_valid_xp_amount(*value))
        .unwrap_or(DEFAULT_XP_REWARD);

    Some(Quest {
        id,
        title,
        description: normalize_description(description.as_deref()),
        status,
        difficulty,
        xp_reward,
    })
}

/// Sanitizes every element of an untrusted list independently.
///
/// Non-array input yields an empty list. When ids repeat, the first
/// occurrence wins so the store keeps its unique-id invariant.
pub fn sanitize_quest_list(raw: &Value) -> Vec<Quest> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    items
        .iter()
        .filter_map(sanitize_quest)
        .filter(|quest| seen.insert(quest.id.clone()))
        .collect()
}

/// Parses JSON text that is expected to hold a quest array.
///
/// # Errors
/// - `InvalidJson` when the text is not JSON.
/// - `NotAList` when the top-level value is not an array.
pub fn parse_quest_list(text: &str) -> Result<Value, QuestListParseError> {
    let value: Value = serde_json::from_str(text)?;
    if !value.is_array() {
        return Err(QuestListParseError::NotAList);
    }
    Ok(value)
}

/// Coerces stored stats into a consistent record.
///
/// `xp_to_next_level` is always recomputed from `level`, and an overflowed
/// `current_xp` is rolled over before the record is returned.
pub fn sanitize_player_stats(raw: &Value) -> PlayerStats {
    let Some(object) = raw.as_object() else {
        return PlayerStats::default();
    };

    let level = object
        .get("level")
        .and_then(Value::as_f64)
        .filter(|value| value.fract() == 0.0 && *value >= 1.0 && *value <= f64::from(u32::MAX))
        .map_or(1, |value| value as u32);
    let current_xp = object
        .get("currentXp")
        .and_then(Value::as_f64)
        .filter(|value| is_valid_xp_amount(*value))
        .unwrap_or(0.0);

    let mut stats = PlayerStats {
        level,
        current_xp,
        xp_to_next_level: threshold_for_level(level),
    };
    stats.roll_over();
    stats
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Scalar-to-text coercion. Arrays and objects have no meaningful text form
/// and are rejected.
fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                Some(int.to_string())
            } else if let Some(uint) = number.as_u64() {
                Some(uint.to_string())
            } else {
                number.as_f64().map(format_float)
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
