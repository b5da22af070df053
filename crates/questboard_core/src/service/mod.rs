//! Session orchestration.
//!
//! # Responsibility
//! - Bridge the in-memory board reducer with keyed storage.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod board_session;
pub mod save_scheduler;
