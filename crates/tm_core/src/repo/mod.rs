//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes only accept already-validated value types.
//! - Missing ids are normal outcomes (`None` / `false`), not errors.

pub mod task_repo;
