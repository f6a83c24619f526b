//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record and its closed value types.
//! - Own range validation for priority and quadrant values.
//!
//! # Invariants
//! - `Priority` always holds a value in `1..=10`.
//! - `Quadrant` always holds a value in `1..=4`.
//! - `updated_at` is never earlier than `created_at`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned task identifier. Monotonic and never reused.
pub type TaskId = i64;

pub const PRIORITY_MIN: i64 = 1;
pub const PRIORITY_MAX: i64 = 10;
pub const DEFAULT_PRIORITY: i64 = 5;

/// Validation failures for task input and persisted task values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    PriorityOutOfRange(i64),
    QuadrantOutOfRange(i64),
    UnknownStatus(String),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PriorityOutOfRange(value) => write!(
                f,
                "priority must be between {PRIORITY_MIN} and {PRIORITY_MAX}, got {value}"
            ),
            Self::QuadrantOutOfRange(value) => {
                write!(f, "quadrant must be between 1 and 4, got {value}")
            }
            Self::UnknownStatus(value) => {
                write!(f, "unknown task status `{value}`; expected pending|completed")
            }
        }
    }
}

impl Error for TaskValidationError {}

/// Task priority rank. `1` is the most important, `10` the least.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Priority(u8);

impl Priority {
    /// Validates a raw rank. Out-of-range values are rejected, never clamped.
    pub fn new(value: i64) -> Result<Self, TaskValidationError> {
        if (PRIORITY_MIN..=PRIORITY_MAX).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(TaskValidationError::PriorityOutOfRange(value))
        }
    }

    pub fn get(self) -> i64 {
        i64::from(self.0)
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self(DEFAULT_PRIORITY as u8)
    }
}

impl TryFrom<i64> for Priority {
    type Error = TaskValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Priority> for i64 {
    fn from(value: Priority) -> Self {
        value.get()
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the four Eisenhower buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Quadrant {
    /// Important and urgent: do it now.
    ImportantUrgent = 1,
    /// Important, not urgent: schedule it.
    ImportantNotUrgent = 2,
    /// Not important, urgent: delegate it.
    NotImportantUrgent = 3,
    /// Neither: drop it.
    NotImportantNotUrgent = 4,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::ImportantUrgent,
        Quadrant::ImportantNotUrgent,
        Quadrant::NotImportantUrgent,
        Quadrant::NotImportantNotUrgent,
    ];

    pub fn number(self) -> i64 {
        self as i64
    }

    /// Short English label.
    pub fn label(self) -> &'static str {
        match self {
            Self::ImportantUrgent => "Important & Urgent",
            Self::ImportantNotUrgent => "Important & Not Urgent",
            Self::NotImportantUrgent => "Not Important & Urgent",
            Self::NotImportantNotUrgent => "Not Important & Not Urgent",
        }
    }

    /// What to do with tasks in this bucket.
    pub fn guidance(self) -> &'static str {
        match self {
            Self::ImportantUrgent => {
                "Handle immediately: crises, pressing problems, deadline-driven work."
            }
            Self::ImportantNotUrgent => {
                "Schedule it: long-term planning, skill building, preventive work."
            }
            Self::NotImportantUrgent => {
                "Delegate where possible: interruptions, some meetings, small chores."
            }
            Self::NotImportantNotUrgent => {
                "Reduce or eliminate: time sinks and low-value distractions."
            }
        }
    }
}

impl TryFrom<i64> for Quadrant {
    type Error = TaskValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::ImportantUrgent),
            2 => Ok(Self::ImportantNotUrgent),
            3 => Ok(Self::NotImportantUrgent),
            4 => Ok(Self::NotImportantNotUrgent),
            other => Err(TaskValidationError::QuadrantOutOfRange(other)),
        }
    }
}

impl From<Quadrant> for i64 {
    fn from(value: Quadrant) -> Self {
        value.number()
    }
}

impl Display for Quadrant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Q{}", self.number())
    }
}

/// Task lifecycle state. `Pending -> Completed` is the only transition the
/// store exposes directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    /// Parses the persisted/textual form. Unknown values are rejected.
    pub fn parse(value: &str) -> Result<Self, TaskValidationError> {
        match value {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(TaskValidationError::UnknownStatus(other.to_string())),
        }
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = TaskValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.trim().to_ascii_lowercase().as_str())
    }
}

/// Canonical persisted task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: TaskStatus,
    /// `None` means unassigned.
    pub quadrant: Option<Quadrant>,
    /// Unix epoch milliseconds, immutable after creation.
    pub created_at: i64,
    /// Unix epoch milliseconds, refreshed on every mutation.
    pub updated_at: i64,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// Tri-state quadrant change used by partial updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuadrantPatch {
    /// Leave the stored quadrant untouched.
    #[default]
    Keep,
    /// Assign the given quadrant.
    Set(Quadrant),
    /// Reset to unassigned.
    Clear,
}

/// Sparse set of field changes for `update`.
///
/// Values are already validated by their types; raw integers enter through
/// `with_raw_priority` / `with_raw_quadrant`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub quadrant: QuadrantPatch,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.quadrant == QuadrantPatch::Keep
    }

    pub fn with_raw_priority(mut self, value: i64) -> Result<Self, TaskValidationError> {
        self.priority = Some(Priority::new(value)?);
        Ok(self)
    }

    /// `None` clears the quadrant, `Some(q)` assigns it after validation.
    pub fn with_raw_quadrant(mut self, value: Option<i64>) -> Result<Self, TaskValidationError> {
        self.quadrant = match value {
            Some(raw) => QuadrantPatch::Set(Quadrant::try_from(raw)?),
            None => QuadrantPatch::Clear,
        };
        Ok(self)
    }
}

/// Aggregate counts over all tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: u64,
    pub pending: u64,
    pub completed: u64,
    /// Only quadrants with at least one task are present.
    pub by_quadrant: BTreeMap<Quadrant, u64>,
}

impl TaskStats {
    /// Count for `quadrant`, defaulting to zero when absent.
    pub fn quadrant_count(&self, quadrant: Quadrant) -> u64 {
        self.by_quadrant.get(&quadrant).copied().unwrap_or(0)
    }

    /// Tasks without a quadrant.
    pub fn unassigned(&self) -> u64 {
        self.total
            .saturating_sub(self.by_quadrant.values().copied().sum::<u64>())
    }
}
