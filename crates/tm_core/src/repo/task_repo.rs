//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD, query and aggregate APIs over the `tasks` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Every mutation runs inside one immediate transaction.
//! - Listing order is `priority ASC, created_at DESC, id DESC`.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `updated_at` is refreshed on every row a mutation touches and never
//!   drops below `created_at`.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::task::{
    Priority, Quadrant, QuadrantPatch, Task, TaskId, TaskPatch, TaskStats, TaskStatus,
    TaskValidationError,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    priority,
    status,
    quadrant,
    created_at,
    updated_at
FROM tasks";

const TASK_ORDER_SQL: &str = " ORDER BY priority ASC, created_at DESC, id DESC";

const REQUIRED_TASK_COLUMNS: [&str; 8] = [
    "id",
    "title",
    "description",
    "priority",
    "status",
    "quadrant",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task persistence and query operations.
///
/// Missing ids are not errors; lookups return `None` and mutations `false`.
#[derive(Debug)]
pub enum RepoError {
    /// Caller input was rejected before any write.
    Validation(TaskValidationError),
    /// The persistence layer itself failed.
    Storage(DbError),
    /// A stored row violates task invariants.
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "storage error: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it through db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Storage(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(DbError::Sqlite(value))
    }
}

/// Input for creating one task. Status and quadrant always start at their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

/// Repository interface for task operations.
pub trait TaskRepository {
    fn create_task(&self, task: &NewTask) -> RepoResult<Task>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, status: Option<TaskStatus>) -> RepoResult<Vec<Task>>;
    fn list_tasks_by_quadrant(&self, quadrant: Quadrant) -> RepoResult<Vec<Task>>;
    /// Returns `false` for an empty patch or a missing id.
    fn update_task(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<bool>;
    fn delete_task(&self, id: TaskId) -> RepoResult<bool>;
    fn delete_tasks_by_status(&self, status: TaskStatus) -> RepoResult<usize>;
    fn delete_all_tasks(&self) -> RepoResult<usize>;
    fn task_stats(&self) -> RepoResult<TaskStats>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` on schema drift.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_task_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &NewTask) -> RepoResult<Task> {
        let now = now_epoch_ms();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO tasks (
                title,
                description,
                priority,
                status,
                quadrant,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?5);",
            params![
                task.title.as_str(),
                task.description.as_str(),
                task.priority.get(),
                TaskStatus::Pending.as_str(),
                now,
            ],
        )?;
        let id = tx.last_insert_rowid();
        let created = load_task(&tx, id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("inserted task {id} not found in read-back"))
        })?;
        tx.commit()?;

        Ok(created)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        load_task(self.conn, id)
    }

    fn list_tasks(&self, status: Option<TaskStatus>) -> RepoResult<Vec<Task>> {
        let mut sql = String::from(TASK_SELECT_SQL);
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = status {
            sql.push_str(" WHERE status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        sql.push_str(TASK_ORDER_SQL);

        query_tasks(self.conn, &sql, bind_values)
    }

    fn list_tasks_by_quadrant(&self, quadrant: Quadrant) -> RepoResult<Vec<Task>> {
        let sql = format!("{TASK_SELECT_SQL} WHERE quadrant = ?{TASK_ORDER_SQL}");
        query_tasks(self.conn, &sql, vec![Value::Integer(quadrant.number())])
    }

    fn update_task(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<bool> {
        if patch.is_empty() {
            return Ok(false);
        }

        let mut assignments: Vec<&'static str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(title) = patch.title.as_ref() {
            assignments.push("title = ?");
            bind_values.push(Value::Text(title.clone()));
        }
        if let Some(description) = patch.description.as_ref() {
            assignments.push("description = ?");
            bind_values.push(Value::Text(description.clone()));
        }
        if let Some(priority) = patch.priority {
            assignments.push("priority = ?");
            bind_values.push(Value::Integer(priority.get()));
        }
        if let Some(status) = patch.status {
            assignments.push("status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        match patch.quadrant {
            QuadrantPatch::Keep => {}
            QuadrantPatch::Set(quadrant) => {
                assignments.push("quadrant = ?");
                bind_values.push(Value::Integer(quadrant.number()));
            }
            QuadrantPatch::Clear => assignments.push("quadrant = NULL"),
        }

        assignments.push("updated_at = MAX(created_at, ?)");
        bind_values.push(Value::Integer(now_epoch_ms()));
        bind_values.push(Value::Integer(id));

        let sql = format!("UPDATE tasks SET {} WHERE id = ?;", assignments.join(", "));
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(&sql, params_from_iter(bind_values))?;
        tx.commit()?;

        Ok(changed > 0)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<bool> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute("DELETE FROM tasks WHERE id = ?1;", [id])?;
        tx.commit()?;
        Ok(changed > 0)
    }

    fn delete_tasks_by_status(&self, status: TaskStatus) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute("DELETE FROM tasks WHERE status = ?1;", [status.as_str()])?;
        tx.commit()?;
        Ok(changed)
    }

    fn delete_all_tasks(&self) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute("DELETE FROM tasks;", [])?;
        tx.commit()?;
        Ok(changed)
    }

    fn task_stats(&self) -> RepoResult<TaskStats> {
        // One deferred transaction keeps the four reads on the same snapshot.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Deferred)?;
        let (total, pending, completed): (i64, i64, i64) = tx.query_row(
            "SELECT
                COUNT(*),
                COALESCE(SUM(status = ?1), 0),
                COALESCE(SUM(status = ?2), 0)
             FROM tasks;",
            params![TaskStatus::Pending.as_str(), TaskStatus::Completed.as_str()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        let mut stats = TaskStats {
            total: count_to_u64(total)?,
            pending: count_to_u64(pending)?,
            completed: count_to_u64(completed)?,
            ..TaskStats::default()
        };

        {
            let mut stmt = tx.prepare(
                "SELECT quadrant, COUNT(*)
                 FROM tasks
                 WHERE quadrant IS NOT NULL
                 GROUP BY quadrant;",
            )?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let raw: i64 = row.get(0)?;
                let quadrant = Quadrant::try_from(raw).map_err(|_| {
                    RepoError::InvalidData(format!("invalid quadrant `{raw}` in tasks.quadrant"))
                })?;
                stats
                    .by_quadrant
                    .insert(quadrant, count_to_u64(row.get(1)?)?);
            }
        }
        tx.commit()?;

        Ok(stats)
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

fn load_task(conn: &Connection, id: TaskId) -> RepoResult<Option<Task>> {
    let mut stmt = conn.prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_task_row(row)?));
    }

    Ok(None)
}

fn query_tasks(conn: &Connection, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<Task>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut tasks = Vec::new();

    while let Some(row) = rows.next()? {
        tasks.push(parse_task_row(row)?);
    }

    Ok(tasks)
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id: TaskId = row.get("id")?;

    let raw_priority: i64 = row.get("priority")?;
    let priority = Priority::new(raw_priority).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid priority `{raw_priority}` in tasks.priority for task {id}"
        ))
    })?;

    let status_text: String = row.get("status")?;
    let status = TaskStatus::parse(&status_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in tasks.status for task {id}"
        ))
    })?;

    let quadrant = match row.get::<_, Option<i64>>("quadrant")? {
        Some(raw) => Some(Quadrant::try_from(raw).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid quadrant `{raw}` in tasks.quadrant for task {id}"
            ))
        })?),
        None => None,
    };

    let created_at: i64 = row.get("created_at")?;
    let updated_at: i64 = row.get("updated_at")?;
    if updated_at < created_at {
        return Err(RepoError::InvalidData(format!(
            "task {id} has updated_at {updated_at} earlier than created_at {created_at}"
        )));
    }

    Ok(Task {
        id,
        title: row.get("title")?,
        description: row.get::<_, Option<String>>("description")?.unwrap_or_default(),
        priority,
        status,
        quadrant,
        created_at,
        updated_at,
    })
}

fn count_to_u64(value: i64) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative row count `{value}`")))
}

fn ensure_task_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "tasks")? {
        return Err(RepoError::MissingRequiredTable("tasks"));
    }

    for column in REQUIRED_TASK_COLUMNS {
        if !table_has_column(conn, "tasks", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "tasks",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
