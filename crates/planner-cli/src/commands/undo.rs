use anyhow::Result;
use planner_core::repository::TaskRepository;

use crate::cli::UndoCommand;
use crate::util::resolve_task_id;

pub async fn undo_task(repo: &impl TaskRepository, command: UndoCommand) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id).await?;
    let task = repo.reopen_task(task_id).await?;
    println!("Reopened task: '{}'", task.title);
    if task.is_recurring() {
        println!("  Any occurrence already scheduled from it is kept.");
    }
    Ok(())
}
