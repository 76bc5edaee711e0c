use anyhow::Result;
use planner_core::repository::TaskRepository;

use crate::cli::LogCommand;
use crate::util::resolve_task_id;
use crate::views::table::format_effort;

pub async fn log_time(repo: &impl TaskRepository, command: LogCommand) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id).await?;
    let task = repo.log_time(task_id, command.minutes).await?;
    println!(
        "Logged {}m on '{}' ({})",
        command.minutes,
        task.title,
        format_effort(task.actual_minutes, task.estimated_minutes)
    );
    Ok(())
}
