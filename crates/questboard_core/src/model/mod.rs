//! Domain model for the quest board.
//!
//! # Responsibility
//! - Define canonical quest and player progression records.
//! - Own the trust boundary for untrusted stored/imported data.
//!
//! # Invariants
//! - Every quest is identified by a stable, non-empty `QuestId`.
//! - `PlayerStats` is never held in an overflowed state at rest.

pub mod player;
pub mod quest;
pub mod sanitize;
