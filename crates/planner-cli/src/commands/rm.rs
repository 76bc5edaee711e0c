use anyhow::Result;
use dialoguer::Confirm;
use planner_core::error::CoreError;
use planner_core::repository::TaskRepository;

use crate::cli::RmCommand;
use crate::util::resolve_task_id;

pub async fn delete_task(repo: &impl TaskRepository, command: RmCommand) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id).await?;
    let task = repo
        .find_task_by_id(task_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Task '{}'", task_id)))?;

    if !command.force {
        let subtasks = repo.find_subtasks(task_id).await?.len();
        let prompt = if subtasks > 0 {
            format!("Delete task '{}' and its {} sub-task(s)?", task.title, subtasks)
        } else {
            format!("Delete task '{}'?", task.title)
        };
        let confirmation = Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirmation {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    repo.delete_task(task_id).await?;
    println!("Deleted task: '{}'", task.title);
    Ok(())
}
