use anyhow::Result;
use chrono_tz::Tz;
use owo_colors::{OwoColorize, Style};
use planner_core::models::NewTaskData;
use planner_core::repository::TaskRepository;
use planner_core::timezone::format_with_timezone;

use crate::cli::AddCommand;
use crate::parser::parse_due_date;
use crate::util::{resolve_task_id, short_id, DATE_FORMAT};

pub async fn add_task(repo: &impl TaskRepository, command: AddCommand, timezone: Tz) -> Result<()> {
    let due_at = command
        .due
        .as_deref()
        .map(|d| parse_due_date(d, timezone))
        .transpose()?;
    let parent_id = match command.parent.as_deref() {
        Some(parent) => Some(resolve_task_id(repo, parent).await?),
        None => None,
    };

    let new_task_data = NewTaskData {
        title: command.title,
        description: command.description,
        due_at,
        priority: command.priority,
        list_name: command.list,
        list_id: None,
        parent_id,
        labels: command.labels,
        recurrence: command.every,
        recurrence_rule: command.rule,
        estimated_minutes: command.estimate,
    };

    let added_task = repo.add_task(new_task_data).await?;

    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();

    let kind = if added_task.is_recurring() { "recurring task" } else { "task" };
    println!(
        "{} Created {}: {}",
        "✓".style(success_style),
        kind,
        added_task.title.bright_white().bold()
    );
    println!("  {} Task ID: {}", "→".style(info_style), short_id(&added_task.id));
    if let Some(due_at) = added_task.due_at {
        println!(
            "  {} Due: {}",
            "→".style(info_style),
            format_with_timezone(due_at, &timezone, DATE_FORMAT).cyan()
        );
    }
    if let Some(spec) = added_task.recurrence_spec() {
        println!("  {} Repeats: {}", "→".style(info_style), spec);
    }

    Ok(())
}
