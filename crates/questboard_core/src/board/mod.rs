//! In-memory board state and its transition rules.
//!
//! # Responsibility
//! - Own the ordered quest list and player progression as one value.
//! - Apply every mutation through a single reducer entry point.
//!
//! # Invariants
//! - Quest ids are unique within a board.
//! - XP is only granted on `Backlog -> Doing` and `Doing -> Done`.

pub mod state;
