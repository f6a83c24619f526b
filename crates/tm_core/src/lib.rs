//! Core domain logic for `tm`, an Eisenhower-quadrant task manager.
//! This crate is the single source of truth for task invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::AppPaths;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{
    Priority, Quadrant, QuadrantPatch, Task, TaskId, TaskPatch, TaskStats, TaskStatus,
    TaskValidationError, DEFAULT_PRIORITY,
};
pub use repo::task_repo::{NewTask, RepoError, RepoResult, SqliteTaskRepository, TaskRepository};
pub use service::task_service::TaskService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
