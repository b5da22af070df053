//! Repository layer over the local key-value store.
//!
//! # Responsibility
//! - Define the storage contract the session persists through.
//! - Keep SQL details out of session orchestration.
//!
//! # Invariants
//! - Values are opaque text; encoding and sanitization belong to callers.

pub mod storage_repo;
