use crate::error::CoreError;
use crate::models::{
    CompletionResult, Label, NewTaskData, RecurrencePreset, Task, TaskFilter, TaskPriority,
};
use crate::recurrence::RecurrenceSpec;
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{QueryBuilder, Sqlite, Transaction};
use uuid::Uuid;

impl SqliteRepository {
    async fn find_task_by_id_in_transaction<'a>(
        tx: &mut Transaction<'a, Sqlite>,
        id: Uuid,
    ) -> Result<Option<Task>, CoreError> {
        let task = sqlx::query_as("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(task)
    }

    /// Checks a custom rule string before it is stored. Blank strings count as
    /// "no rule" and come back as `None`.
    fn validate_rule(&self, rule: Option<String>) -> Result<Option<String>, CoreError> {
        let Some(rule) = rule.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()) else {
            return Ok(None);
        };
        self.engine()
            .normalize(&RecurrenceSpec::Custom(rule.clone()))?;
        Ok(Some(rule))
    }

    async fn add_task_in_transaction<'a>(
        &self,
        tx: &mut Transaction<'a, Sqlite>,
        mut data: NewTaskData,
    ) -> Result<Task, CoreError> {
        let title = data.title.trim().to_string();
        if title.is_empty() {
            return Err(CoreError::InvalidInput(
                "Task title cannot be empty.".to_string(),
            ));
        }
        if matches!(data.estimated_minutes, Some(m) if m < 0) {
            return Err(CoreError::InvalidInput(
                "Estimated minutes cannot be negative.".to_string(),
            ));
        }
        let recurrence_rule = self.validate_rule(data.recurrence_rule.take())?;

        // Sub-tasks live in their parent's list.
        if let Some(parent_id) = data.parent_id {
            let parent = Self::find_task_by_id_in_transaction(tx, parent_id)
                .await?
                .ok_or_else(|| CoreError::NotFound(format!("Parent task '{}'", parent_id)))?;
            data.list_id = Some(parent.list_id);
        }

        if data.list_id.is_none() {
            if let Some(list_name) = &data.list_name {
                let list_id: Option<Uuid> =
                    sqlx::query_scalar("SELECT id FROM lists WHERE name = $1")
                        .bind(list_name)
                        .fetch_optional(&mut **tx)
                        .await?;
                data.list_id = Some(
                    list_id.ok_or_else(|| CoreError::NotFound(format!("List '{}'", list_name)))?,
                );
            }
        }

        let list_id = match data.list_id {
            Some(id) => id,
            None => Self::default_list_in_transaction(tx).await?.id,
        };

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            list_id,
            parent_id: data.parent_id,
            title,
            description: data.description,
            priority: data.priority.unwrap_or(TaskPriority::None),
            due_at: data.due_at,
            is_completed: false,
            completed_at: None,
            recurrence: data.recurrence,
            recurrence_rule,
            estimated_minutes: data.estimated_minutes,
            actual_minutes: None,
            created_at: now,
            updated_at: now,
        };

        Self::insert_task(tx, &task).await?;
        Self::attach_labels(tx, task.id, &data.labels).await?;

        Ok(task)
    }

    async fn insert_task<'a>(tx: &mut Transaction<'a, Sqlite>, task: &Task) -> Result<(), CoreError> {
        sqlx::query(
            r#"INSERT INTO tasks (id, list_id, parent_id, title, description, priority, due_at, is_completed, completed_at, recurrence, recurrence_rule, estimated_minutes, actual_minutes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(task.id)
        .bind(task.list_id)
        .bind(task.parent_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.priority)
        .bind(task.due_at)
        .bind(task.is_completed)
        .bind(task.completed_at)
        .bind(&task.recurrence)
        .bind(&task.recurrence_rule)
        .bind(task.estimated_minutes)
        .bind(task.actual_minutes)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Attaches labels by name, creating any that do not exist yet.
    async fn attach_labels<'a>(
        tx: &mut Transaction<'a, Sqlite>,
        task_id: Uuid,
        labels: &[String],
    ) -> Result<(), CoreError> {
        for name in labels.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
            let existing: Option<Uuid> = sqlx::query_scalar("SELECT id FROM labels WHERE name = $1")
                .bind(name)
                .fetch_optional(&mut **tx)
                .await?;

            let label_id = match existing {
                Some(id) => id,
                None => {
                    let id = Uuid::now_v7();
                    sqlx::query("INSERT INTO labels (id, name) VALUES ($1, $2)")
                        .bind(id)
                        .bind(name)
                        .execute(&mut **tx)
                        .await?;
                    id
                }
            };

            sqlx::query("INSERT OR IGNORE INTO task_labels (task_id, label_id) VALUES ($1, $2)")
                .bind(task_id)
                .bind(label_id)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }

    async fn copy_labels<'a>(
        tx: &mut Transaction<'a, Sqlite>,
        from: Uuid,
        to: Uuid,
    ) -> Result<(), CoreError> {
        sqlx::query(
            "INSERT INTO task_labels (task_id, label_id) SELECT $1, label_id FROM task_labels WHERE task_id = $2",
        )
        .bind(to)
        .bind(from)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Creates the open successor of a completed recurring task, together with
    /// fresh copies of its sub-tasks.
    ///
    /// The whole sub-task tree is copied and due dates move by the same distance
    /// as the parent's. Completed recurring sub-tasks are left behind: their open
    /// successor is already in the tree and gets copied instead.
    async fn spawn_successor<'a>(
        &self,
        tx: &mut Transaction<'a, Sqlite>,
        completed: &Task,
        spec: &RecurrenceSpec,
        anchor: DateTime<Utc>,
        next_due: DateTime<Utc>,
    ) -> Result<Task, CoreError> {
        let now = Utc::now();
        let recurrence_rule = match self.engine().carry_forward(spec) {
            RecurrenceSpec::Custom(rule) => Some(rule),
            RecurrenceSpec::Preset(_) => completed.recurrence_rule.clone(),
        };

        let next = Task {
            id: Uuid::new_v4(),
            due_at: Some(next_due),
            is_completed: false,
            completed_at: None,
            recurrence_rule,
            actual_minutes: None,
            created_at: now,
            updated_at: now,
            ..completed.clone()
        };
        Self::insert_task(tx, &next).await?;
        Self::copy_labels(tx, completed.id, next.id).await?;

        let shift: Duration = next_due - anchor;
        let mut pending = vec![(completed.id, next.id)];
        while let Some((from_parent, to_parent)) = pending.pop() {
            let children: Vec<Task> =
                sqlx::query_as("SELECT * FROM tasks WHERE parent_id = $1 ORDER BY created_at ASC")
                    .bind(from_parent)
                    .fetch_all(&mut **tx)
                    .await?;

            for child in children {
                if child.is_completed && child.is_recurring() {
                    continue;
                }
                let copy = Task {
                    id: Uuid::new_v4(),
                    parent_id: Some(to_parent),
                    due_at: child.due_at.map(|due| due + shift),
                    is_completed: false,
                    completed_at: None,
                    actual_minutes: None,
                    created_at: now,
                    updated_at: now,
                    ..child.clone()
                };
                Self::insert_task(tx, &copy).await?;
                Self::copy_labels(tx, child.id, copy.id).await?;
                pending.push((child.id, copy.id));
            }
        }

        Ok(next)
    }
}

#[async_trait]
impl super::TaskRepository for SqliteRepository {
    async fn add_task(&self, data: NewTaskData) -> Result<Task, CoreError> {
        let mut tx = self.pool().begin().await?;
        let task = self.add_task_in_transaction(&mut tx, data).await?;
        tx.commit().await?;
        Ok(task)
    }

    async fn find_task_by_id(&self, id: Uuid) -> Result<Option<Task>, CoreError> {
        let task = sqlx::query_as("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(task)
    }

    async fn find_tasks_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Task>, CoreError> {
        // Ids are stored as 16-byte blobs, so match on their hex rendering.
        let prefix: String = short_id
            .chars()
            .filter(|c| *c != '-')
            .collect::<String>()
            .to_lowercase();
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Ok(Vec::new());
        }

        let tasks: Vec<Task> = sqlx::query_as("SELECT * FROM tasks WHERE lower(hex(id)) LIKE $1")
            .bind(format!("{}%", prefix))
            .fetch_all(self.pool())
            .await?;
        Ok(tasks)
    }

    async fn find_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, CoreError> {
        let mut query_builder: QueryBuilder<sqlx::Sqlite> =
            QueryBuilder::new("SELECT t.* FROM tasks t WHERE 1 = 1");

        if let Some(list_id) = filter.list_id {
            query_builder.push(" AND t.list_id = ");
            query_builder.push_bind(list_id);
        }
        if let Some(label) = &filter.label {
            query_builder.push(
                " AND t.id IN (SELECT tl.task_id FROM task_labels tl JOIN labels l ON l.id = tl.label_id WHERE l.name = ",
            );
            query_builder.push_bind(label.clone());
            query_builder.push(")");
        }
        if !filter.include_completed {
            query_builder.push(" AND t.is_completed = FALSE");
        }
        if let Some(before) = filter.due_before {
            query_builder.push(" AND t.due_at IS NOT NULL AND t.due_at < ");
            query_builder.push_bind(before);
        }

        // Open tasks first, then by date with undated tasks last, newest first on ties.
        query_builder.push(
            " ORDER BY t.is_completed ASC, t.due_at IS NULL ASC, t.due_at ASC, t.created_at DESC",
        );

        let tasks = query_builder.build_query_as().fetch_all(self.pool()).await?;
        Ok(tasks)
    }

    async fn find_subtasks(&self, parent_id: Uuid) -> Result<Vec<Task>, CoreError> {
        let tasks = sqlx::query_as("SELECT * FROM tasks WHERE parent_id = $1 ORDER BY created_at ASC")
            .bind(parent_id)
            .fetch_all(self.pool())
            .await?;
        Ok(tasks)
    }

    async fn find_labels_for_task(&self, id: Uuid) -> Result<Vec<Label>, CoreError> {
        let labels = sqlx::query_as(
            r#"SELECT l.id, l.name FROM labels l
            JOIN task_labels tl ON tl.label_id = l.id
            WHERE tl.task_id = $1
            ORDER BY l.name ASC
            "#,
        )
        .bind(id)
        .fetch_all(self.pool())
        .await?;
        Ok(labels)
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), CoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Task '{}'", id)));
        }
        Ok(())
    }

    async fn complete_task(&self, id: Uuid) -> Result<CompletionResult, CoreError> {
        let mut tx = self.pool().begin().await?;

        let task = Self::find_task_by_id_in_transaction(&mut tx, id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Task '{}'", id)))?;
        if task.is_completed {
            return Err(CoreError::AlreadyCompleted(task.title));
        }

        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE tasks SET is_completed = TRUE, completed_at = $1, updated_at = $2 WHERE id = $3 AND is_completed = FALSE",
        )
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::AlreadyCompleted(task.title));
        }

        let completed = Task {
            is_completed: true,
            completed_at: Some(now),
            updated_at: now,
            ..task
        };

        let Some(spec) = completed.recurrence_spec() else {
            tx.commit().await?;
            return Ok(CompletionResult::Single(completed));
        };

        let anchor = completed.due_at.unwrap_or(now);
        let next_due = self
            .engine()
            .next_occurrence_or_none(&spec, &anchor.with_timezone(&self.timezone()))
            .map(|next| next.with_timezone(&Utc));

        let Some(next_due) = next_due else {
            tracing::info!(task = %completed.id, recurrence = %spec, "recurrence has no further occurrences");
            tx.commit().await?;
            return Ok(CompletionResult::Single(completed));
        };

        let next = self
            .spawn_successor(&mut tx, &completed, &spec, anchor, next_due)
            .await?;
        tx.commit().await?;

        tracing::info!(task = %completed.id, next = %next.id, due = %next_due, "scheduled next occurrence");
        Ok(CompletionResult::Recurring { completed, next })
    }

    async fn reopen_task(&self, id: Uuid) -> Result<Task, CoreError> {
        let task = self
            .find_task_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Task '{}'", id)))?;
        if !task.is_completed {
            return Err(CoreError::InvalidInput(format!(
                "Task '{}' is not completed.",
                task.title
            )));
        }

        let now = Utc::now();
        sqlx::query(
            "UPDATE tasks SET is_completed = FALSE, completed_at = NULL, updated_at = $1 WHERE id = $2",
        )
        .bind(now)
        .bind(id)
        .execute(self.pool())
        .await?;

        Ok(Task {
            is_completed: false,
            completed_at: None,
            updated_at: now,
            ..task
        })
    }

    async fn log_time(&self, id: Uuid, minutes: i64) -> Result<Task, CoreError> {
        if minutes <= 0 {
            return Err(CoreError::InvalidInput(
                "Logged time must be a positive number of minutes.".to_string(),
            ));
        }

        let task: Option<Task> = sqlx::query_as(
            r#"UPDATE tasks
            SET actual_minutes = COALESCE(actual_minutes, 0) + $1, updated_at = $2
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(minutes)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        task.ok_or_else(|| CoreError::NotFound(format!("Task '{}'", id)))
    }

    async fn set_recurrence(
        &self,
        id: Uuid,
        preset: Option<RecurrencePreset>,
        rule: Option<String>,
    ) -> Result<Task, CoreError> {
        let rule = self.validate_rule(rule)?;

        let task: Option<Task> = sqlx::query_as(
            r#"UPDATE tasks
            SET recurrence = $1, recurrence_rule = $2, updated_at = $3
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(preset)
        .bind(rule)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        task.ok_or_else(|| CoreError::NotFound(format!("Task '{}'", id)))
    }
}
