//! Task use-case service.
//!
//! # Responsibility
//! - Provide the store operations collaborators call: create, lookup,
//!   listing, partial update, quadrant assignment, completion, deletion
//!   and aggregate stats.
//! - Validate raw caller input before any repository access.
//!
//! # Invariants
//! - Out-of-range priority/quadrant input is rejected, never clamped.
//! - Storage errors are returned unchanged; this layer does not retry.

use crate::model::task::{
    Priority, Quadrant, QuadrantPatch, Task, TaskId, TaskPatch, TaskStats, TaskStatus,
};
use crate::repo::task_repo::{NewTask, RepoResult, TaskRepository};
use log::debug;

/// Store facade handed to CLI and interactive collaborators.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a pending, unassigned task.
    ///
    /// # Errors
    /// - `Validation` when `priority` is outside `1..=10`; nothing is written.
    pub fn create(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        priority: i64,
    ) -> RepoResult<Task> {
        let task = NewTask {
            title: title.into(),
            description: description.into(),
            priority: Priority::new(priority)?,
        };
        let created = self.repo.create_task(&task)?;
        debug!(
            "event=task_create module=service status=ok task_id={} priority={}",
            created.id, created.priority
        );
        Ok(created)
    }

    pub fn get_by_id(&self, id: TaskId) -> RepoResult<Option<Task>> {
        self.repo.get_task(id)
    }

    /// Lists tasks, optionally filtered by status.
    pub fn list(&self, status: Option<TaskStatus>) -> RepoResult<Vec<Task>> {
        self.repo.list_tasks(status)
    }

    /// Lists tasks in one quadrant.
    ///
    /// # Errors
    /// - `Validation` when `quadrant` is outside `1..=4`.
    pub fn list_by_quadrant(&self, quadrant: i64) -> RepoResult<Vec<Task>> {
        let quadrant = Quadrant::try_from(quadrant)?;
        self.repo.list_tasks_by_quadrant(quadrant)
    }

    /// Applies a sparse patch. Returns `false` for an empty patch or an
    /// unknown id.
    pub fn update(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<bool> {
        if patch.is_empty() {
            return Ok(false);
        }
        let changed = self.repo.update_task(id, patch)?;
        debug!(
            "event=task_update module=service status=ok task_id={} changed={}",
            id, changed
        );
        Ok(changed)
    }

    /// Assigns a quadrant.
    ///
    /// # Errors
    /// - `Validation` when `quadrant` is outside `1..=4`, checked before the
    ///   id is looked up.
    pub fn assign_quadrant(&self, id: TaskId, quadrant: i64) -> RepoResult<bool> {
        let quadrant = Quadrant::try_from(quadrant)?;
        self.update(
            id,
            &TaskPatch {
                quadrant: QuadrantPatch::Set(quadrant),
                ..TaskPatch::default()
            },
        )
    }

    pub fn unassign_quadrant(&self, id: TaskId) -> RepoResult<bool> {
        self.update(
            id,
            &TaskPatch {
                quadrant: QuadrantPatch::Clear,
                ..TaskPatch::default()
            },
        )
    }

    /// Marks a task completed. Repeating it is a real update and refreshes
    /// `updated_at`.
    pub fn complete(&self, id: TaskId) -> RepoResult<bool> {
        self.update(
            id,
            &TaskPatch {
                status: Some(TaskStatus::Completed),
                ..TaskPatch::default()
            },
        )
    }

    pub fn delete(&self, id: TaskId) -> RepoResult<bool> {
        let deleted = self.repo.delete_task(id)?;
        debug!(
            "event=task_delete module=service status=ok task_id={} deleted={}",
            id, deleted
        );
        Ok(deleted)
    }

    /// Deletes every task with `status`. Returns the number removed.
    pub fn delete_by_status(&self, status: TaskStatus) -> RepoResult<usize> {
        let count = self.repo.delete_tasks_by_status(status)?;
        debug!(
            "event=task_delete_bulk module=service status=ok filter={} count={}",
            status, count
        );
        Ok(count)
    }

    pub fn delete_all(&self) -> RepoResult<usize> {
        let count = self.repo.delete_all_tasks()?;
        debug!(
            "event=task_delete_bulk module=service status=ok filter=all count={}",
            count
        );
        Ok(count)
    }

    pub fn stats(&self) -> RepoResult<TaskStats> {
        self.repo.task_stats()
    }
}

#[cfg(test)]
mod tests {
    use super::TaskService;
    use crate::model::task::{
        Quadrant, Task, TaskId, TaskPatch, TaskStats, TaskStatus, TaskValidationError,
    };
    use crate::repo::task_repo::{NewTask, RepoError, RepoResult, TaskRepository};
    use std::cell::Cell;

    /// Repository double that counts calls and stores nothing.
    #[derive(Default)]
    struct CountingRepo {
        calls: Cell<u32>,
    }

    impl CountingRepo {
        fn touch(&self) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    impl TaskRepository for CountingRepo {
        fn create_task(&self, _task: &NewTask) -> RepoResult<Task> {
            self.touch();
            Err(RepoError::InvalidData("not supported".to_string()))
        }
        fn get_task(&self, _id: TaskId) -> RepoResult<Option<Task>> {
            self.touch();
            Ok(None)
        }
        fn list_tasks(&self, _status: Option<TaskStatus>) -> RepoResult<Vec<Task>> {
            self.touch();
            Ok(Vec::new())
        }
        fn list_tasks_by_quadrant(&self, _quadrant: Quadrant) -> RepoResult<Vec<Task>> {
            self.touch();
            Ok(Vec::new())
        }
        fn update_task(&self, _id: TaskId, _patch: &TaskPatch) -> RepoResult<bool> {
            self.touch();
            Ok(false)
        }
        fn delete_task(&self, _id: TaskId) -> RepoResult<bool> {
            self.touch();
            Ok(false)
        }
        fn delete_tasks_by_status(&self, _status: TaskStatus) -> RepoResult<usize> {
            self.touch();
            Ok(0)
        }
        fn delete_all_tasks(&self) -> RepoResult<usize> {
            self.touch();
            Ok(0)
        }
        fn task_stats(&self) -> RepoResult<TaskStats> {
            self.touch();
            Ok(TaskStats::default())
        }
    }

    #[test]
    fn invalid_input_never_reaches_repository() {
        let service = TaskService::new(CountingRepo::default());

        assert!(matches!(
            service.create("t", "", 0),
            Err(RepoError::Validation(TaskValidationError::PriorityOutOfRange(0)))
        ));
        assert!(matches!(
            service.assign_quadrant(1, 5),
            Err(RepoError::Validation(TaskValidationError::QuadrantOutOfRange(5)))
        ));
        assert!(matches!(
            service.list_by_quadrant(0),
            Err(RepoError::Validation(_))
        ));

        assert_eq!(service.repo.calls.get(), 0);
    }

    #[test]
    fn empty_patch_short_circuits() {
        let service = TaskService::new(CountingRepo::default());

        assert!(!service.update(1, &TaskPatch::default()).unwrap());
        assert_eq!(service.repo.calls.get(), 0);
    }
}
