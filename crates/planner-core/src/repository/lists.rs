use crate::error::CoreError;
use crate::models::TaskList;
use crate::repository::{SqliteRepository, DEFAULT_LIST_NAME};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Sqlite, Transaction};
use uuid::Uuid;

impl SqliteRepository {
    /// Resolves the default list inside an open transaction, creating it if needed.
    ///
    /// A user-created list that happens to be called "Inbox" is promoted rather
    /// than duplicated.
    pub(crate) async fn default_list_in_transaction<'a>(
        tx: &mut Transaction<'a, Sqlite>,
    ) -> Result<TaskList, CoreError> {
        let existing: Option<TaskList> = sqlx::query_as(
            "SELECT * FROM lists WHERE is_default = TRUE OR name = $1 ORDER BY is_default DESC LIMIT 1",
        )
        .bind(DEFAULT_LIST_NAME)
        .fetch_optional(&mut **tx)
        .await?;

        match existing {
            Some(list) if list.is_default => Ok(list),
            Some(list) => {
                sqlx::query("UPDATE lists SET is_default = TRUE WHERE id = $1")
                    .bind(list.id)
                    .execute(&mut **tx)
                    .await?;
                Ok(TaskList {
                    is_default: true,
                    ..list
                })
            }
            None => {
                let list = TaskList {
                    id: Uuid::now_v7(),
                    name: DEFAULT_LIST_NAME.to_string(),
                    is_default: true,
                    created_at: Utc::now(),
                };
                sqlx::query(
                    "INSERT INTO lists (id, name, is_default, created_at) VALUES ($1, $2, $3, $4)",
                )
                .bind(list.id)
                .bind(&list.name)
                .bind(list.is_default)
                .bind(list.created_at)
                .execute(&mut **tx)
                .await?;
                tracing::debug!(list = %list.id, "created default list");
                Ok(list)
            }
        }
    }
}

#[async_trait]
impl super::ListRepository for SqliteRepository {
    async fn add_list(&self, name: String) -> Result<TaskList, CoreError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(CoreError::InvalidInput(
                "List name cannot be empty.".to_string(),
            ));
        }
        if self.find_list_by_name(&name).await?.is_some() {
            return Err(CoreError::InvalidInput(format!(
                "A list named '{}' already exists.",
                name
            )));
        }

        let list = sqlx::query_as(
            r#"INSERT INTO lists (id, name, is_default, created_at)
            VALUES ($1, $2, FALSE, $3)
            RETURNING id, name, is_default, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(name)
        .bind(Utc::now())
        .fetch_one(self.pool())
        .await?;

        Ok(list)
    }

    async fn find_lists(&self) -> Result<Vec<TaskList>, CoreError> {
        let lists = sqlx::query_as(
            "SELECT id, name, is_default, created_at FROM lists ORDER BY is_default DESC, name ASC",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(lists)
    }

    async fn find_list_by_name(&self, name: &str) -> Result<Option<TaskList>, CoreError> {
        let list = sqlx::query_as("SELECT * FROM lists WHERE name = $1")
            .bind(name)
            .fetch_optional(self.pool())
            .await?;
        Ok(list)
    }

    async fn default_list(&self) -> Result<TaskList, CoreError> {
        let mut tx = self.pool().begin().await?;
        let list = Self::default_list_in_transaction(&mut tx).await?;
        tx.commit().await?;
        Ok(list)
    }

    async fn delete_list(&self, name: String) -> Result<(), CoreError> {
        let list = self
            .find_list_by_name(&name)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("List '{}'", name)))?;

        if list.is_default {
            return Err(CoreError::InvalidInput(format!(
                "Cannot delete the default list '{}'.",
                name
            )));
        }

        // Tasks go with their list (ON DELETE CASCADE).
        sqlx::query("DELETE FROM lists WHERE id = $1")
            .bind(list.id)
            .execute(self.pool())
            .await?;

        Ok(())
    }
}
