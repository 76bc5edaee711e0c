use anyhow::{anyhow, Result};
use planner_core::error::CoreError;
use planner_core::repository::TaskRepository;
use uuid::Uuid;

/// Number of leading id characters shown to the user.
pub const SHORT_ID_LEN: usize = 8;

/// How due dates are printed outside of tables.
pub const DATE_FORMAT: &str = "%a %Y-%m-%d %H:%M %Z";

pub fn short_id(id: &Uuid) -> String {
    id.to_string()[..SHORT_ID_LEN].to_string()
}

pub async fn resolve_task_id(repo: &impl TaskRepository, short_id: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(short_id) {
        return Ok(id);
    }
    if short_id.len() < 2 {
        return Err(anyhow!(CoreError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }
    let tasks = repo.find_tasks_by_short_id_prefix(short_id).await?;
    if tasks.len() == 1 {
        Ok(tasks[0].id)
    } else if tasks.is_empty() {
        Err(anyhow!(CoreError::NotFound(format!(
            "No task found with ID prefix '{}'",
            short_id
        ))))
    } else {
        let task_info: Vec<(String, String)> = tasks
            .into_iter()
            .map(|t| (t.id.to_string(), t.title))
            .collect();
        Err(anyhow!(CoreError::AmbiguousId(task_info)))
    }
}
