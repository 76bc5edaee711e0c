use anyhow::Result;
use planner_core::repository::TaskRepository;

use crate::cli::RecurCommand;
use crate::util::resolve_task_id;

pub async fn set_recurrence(repo: &impl TaskRepository, command: RecurCommand) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id).await?;

    let (preset, rule) = if command.clear {
        (None, None)
    } else {
        (command.every, command.rule)
    };
    let task = repo.set_recurrence(task_id, preset, rule).await?;

    match task.recurrence_spec() {
        Some(spec) => println!("'{}' now repeats: {}", task.title, spec),
        None => println!("'{}' no longer repeats", task.title),
    }
    Ok(())
}
