//! Domain model for Eisenhower task tracking.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep value validation next to the types it protects.
//!
//! # Invariants
//! - Every task is identified by a store-assigned, never reused `TaskId`.
//! - Deletion is a hard delete; there is no tombstone state.

pub mod task;
