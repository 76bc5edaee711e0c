use crate::db::DbPool;
use crate::error::CoreError;
use crate::models::{
    CompletionResult, Label, NewTaskData, RecurrencePreset, Task, TaskFilter, TaskList,
};
use crate::recurrence::RecurrenceEngine;
use async_trait::async_trait;
use chrono_tz::Tz;
use uuid::Uuid;

pub mod lists;
pub mod tasks;

/// Name of the list that receives tasks created without an explicit list.
pub const DEFAULT_LIST_NAME: &str = "Inbox";

/// Domain-specific trait for task operations
#[async_trait]
pub trait TaskRepository {
    async fn add_task(&self, data: NewTaskData) -> Result<Task, CoreError>;
    async fn find_task_by_id(&self, id: Uuid) -> Result<Option<Task>, CoreError>;
    async fn find_tasks_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Task>, CoreError>;
    async fn find_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, CoreError>;
    async fn find_subtasks(&self, parent_id: Uuid) -> Result<Vec<Task>, CoreError>;
    async fn find_labels_for_task(&self, id: Uuid) -> Result<Vec<Label>, CoreError>;
    async fn delete_task(&self, id: Uuid) -> Result<(), CoreError>;
    /// Marks a task completed and, for recurring tasks, schedules its successor.
    async fn complete_task(&self, id: Uuid) -> Result<CompletionResult, CoreError>;
    async fn reopen_task(&self, id: Uuid) -> Result<Task, CoreError>;
    /// Adds `minutes` to the effort logged against a task.
    async fn log_time(&self, id: Uuid, minutes: i64) -> Result<Task, CoreError>;
    /// Replaces the recurrence of a task. Passing `None` for both clears it.
    async fn set_recurrence(
        &self,
        id: Uuid,
        preset: Option<RecurrencePreset>,
        rule: Option<String>,
    ) -> Result<Task, CoreError>;
}

/// Domain-specific trait for list operations
#[async_trait]
pub trait ListRepository {
    async fn add_list(&self, name: String) -> Result<TaskList, CoreError>;
    async fn find_lists(&self) -> Result<Vec<TaskList>, CoreError>;
    async fn find_list_by_name(&self, name: &str) -> Result<Option<TaskList>, CoreError>;
    /// Returns the default list, creating it on first use.
    async fn default_list(&self) -> Result<TaskList, CoreError>;
    async fn delete_list(&self, name: String) -> Result<(), CoreError>;
}

/// SQLite-backed store for lists, labels and tasks.
///
/// Timestamps are stored in UTC. Recurrences are stepped in `timezone`, so a
/// daily 09:00 task keeps its local time across DST changes.
pub struct SqliteRepository {
    pool: DbPool,
    engine: RecurrenceEngine,
    timezone: Tz,
}

impl SqliteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            engine: RecurrenceEngine::new(),
            timezone: Tz::UTC,
        }
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn engine(&self) -> &RecurrenceEngine {
        &self.engine
    }
}
