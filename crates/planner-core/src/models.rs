use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::recurrence::RecurrenceSpec;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaskList {
    pub id: Uuid,
    pub name: String,
    /// The Inbox; tasks created without a list land here.
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Label {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum TaskPriority {
    None,
    Low,
    Medium,
    High,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid task priority: {0}")]
pub struct ParseTaskPriorityError(String);

impl FromStr for TaskPriority {
    type Err = ParseTaskPriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(TaskPriority::None),
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            _ => Err(ParseTaskPriorityError(s.to_string())),
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskPriority::None => write!(f, "none"),
            TaskPriority::Low => write!(f, "low"),
            TaskPriority::Medium => write!(f, "medium"),
            TaskPriority::High => write!(f, "high"),
        }
    }
}

/// The fixed recurrence menu offered next to free-form rule strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum RecurrencePreset {
    Daily,
    Weekly,
    Weekdays,
    Monthly,
    Yearly,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid recurrence preset: {0}")]
pub struct ParseRecurrencePresetError(String);

impl FromStr for RecurrencePreset {
    type Err = ParseRecurrencePresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(RecurrencePreset::Daily),
            "weekly" => Ok(RecurrencePreset::Weekly),
            "weekdays" => Ok(RecurrencePreset::Weekdays),
            "monthly" => Ok(RecurrencePreset::Monthly),
            "yearly" => Ok(RecurrencePreset::Yearly),
            _ => Err(ParseRecurrencePresetError(s.to_string())),
        }
    }
}

impl fmt::Display for RecurrencePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecurrencePreset::Daily => write!(f, "DAILY"),
            RecurrencePreset::Weekly => write!(f, "WEEKLY"),
            RecurrencePreset::Weekdays => write!(f, "WEEKDAYS"),
            RecurrencePreset::Monthly => write!(f, "MONTHLY"),
            RecurrencePreset::Yearly => write!(f, "YEARLY"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub list_id: Uuid,
    /// Set for sub-tasks.
    pub parent_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    /// The scheduled date; the anchor for the next occurrence of a recurring task.
    pub due_at: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub recurrence: Option<RecurrencePreset>,
    /// Supersedes `recurrence` when both are set.
    pub recurrence_rule: Option<String>,
    pub estimated_minutes: Option<i64>,
    pub actual_minutes: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// The active recurrence of this task, if any.
    pub fn recurrence_spec(&self) -> Option<RecurrenceSpec> {
        RecurrenceSpec::from_fields(self.recurrence_rule.as_deref(), self.recurrence)
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence_spec().is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewTaskData {
    pub title: String,
    pub description: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
    pub priority: Option<TaskPriority>,
    pub list_name: Option<String>, // Kept for CLI convenience
    pub list_id: Option<Uuid>,     // Used internally for transactions
    pub parent_id: Option<Uuid>,
    pub labels: Vec<String>,
    pub recurrence: Option<RecurrencePreset>,
    pub recurrence_rule: Option<String>,
    pub estimated_minutes: Option<i64>,
}

/// Represents a filter for listing tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub list_id: Option<Uuid>,
    pub label: Option<String>,
    pub include_completed: bool,
    pub due_before: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub enum CompletionResult {
    Single(Task),
    /// A recurring task was completed and its successor was scheduled.
    Recurring { completed: Task, next: Task },
}

impl CompletionResult {
    pub fn completed(&self) -> &Task {
        match self {
            CompletionResult::Single(task) => task,
            CompletionResult::Recurring { completed, .. } => completed,
        }
    }
}
