use anyhow::Result;
use chrono_tz::Tz;
use planner_core::error::CoreError;
use planner_core::models::{Task, TaskFilter};
use planner_core::repository::{ListRepository, TaskRepository};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::cli::LsCommand;
use crate::parser::parse_due_date;
use crate::views::table::{display_tasks, ViewTask};

pub async fn list_tasks<R>(repo: &R, command: LsCommand, timezone: Tz) -> Result<()>
where
    R: TaskRepository + ListRepository,
{
    let list_id = match command.list.as_deref() {
        Some(name) => Some(
            repo.find_list_by_name(name)
                .await?
                .ok_or_else(|| CoreError::NotFound(format!("List '{}'", name)))?
                .id,
        ),
        None => None,
    };

    let due_before = command
        .due_before
        .as_deref()
        .map(|d| parse_due_date(d, timezone))
        .transpose()?;

    let tasks = repo
        .find_tasks(&TaskFilter {
            list_id,
            label: command.label,
            include_completed: command.all,
            due_before,
        })
        .await?;

    let list_names: HashMap<Uuid, String> = repo
        .find_lists()
        .await?
        .into_iter()
        .map(|l| (l.id, l.name))
        .collect();

    let mut view_tasks = Vec::with_capacity(tasks.len());
    for (task, depth) in nest_subtasks(tasks) {
        let labels = repo
            .find_labels_for_task(task.id)
            .await?
            .into_iter()
            .map(|l| l.name)
            .collect();
        let list_name = list_names.get(&task.list_id).cloned();
        view_tasks.push(ViewTask::new(task, list_name, labels, depth));
    }

    display_tasks(&view_tasks, timezone);
    Ok(())
}

/// Orders tasks so that sub-tasks follow their parent, paired with their depth.
/// A sub-task whose parent is not in `tasks` is shown at the top level.
fn nest_subtasks(tasks: Vec<Task>) -> Vec<(Task, usize)> {
    let ids: HashSet<Uuid> = tasks.iter().map(|t| t.id).collect();
    let mut roots = Vec::new();
    let mut children: HashMap<Uuid, Vec<Task>> = HashMap::new();
    for task in tasks {
        match task.parent_id {
            Some(parent) if ids.contains(&parent) => children.entry(parent).or_default().push(task),
            _ => roots.push(task),
        }
    }

    let mut ordered = Vec::new();
    let mut stack: Vec<(Task, usize)> = roots.into_iter().rev().map(|t| (t, 0)).collect();
    while let Some((task, depth)) = stack.pop() {
        if let Some(kids) = children.remove(&task.id) {
            stack.extend(kids.into_iter().rev().map(|k| (k, depth + 1)));
        }
        ordered.push((task, depth));
    }
    ordered
}
