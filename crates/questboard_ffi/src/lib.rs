//! Flutter-facing bindings for the quest board core.

pub mod api;
