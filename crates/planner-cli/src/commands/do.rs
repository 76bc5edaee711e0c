use anyhow::Result;
use chrono_tz::Tz;
use owo_colors::OwoColorize;
use planner_core::models::{CompletionResult, Task};
use planner_core::recurrence::RecurrenceEngine;
use planner_core::repository::TaskRepository;
use planner_core::timezone::format_with_timezone;

use crate::cli::DoCommand;
use crate::util::{resolve_task_id, short_id, DATE_FORMAT};

pub async fn do_task(repo: &impl TaskRepository, command: DoCommand, timezone: Tz) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id).await?;
    let result = repo.complete_task(task_id).await?;

    let completed = result.completed();
    println!("{} Completed task: '{}'", "✓".green().bold(), completed.title);

    match &result {
        CompletionResult::Recurring { next, .. } => match next.due_at {
            Some(due_at) => println!(
                "  Next occurrence {} due {}",
                short_id(&next.id),
                format_with_timezone(due_at, &timezone, DATE_FORMAT)
            ),
            None => println!("  Next occurrence {}", short_id(&next.id)),
        },
        CompletionResult::Single(task) => {
            if let Some(note) = series_end_note(task) {
                println!("  {}", note);
            }
        }
    }

    Ok(())
}

/// Explains why a recurring task got no successor.
fn series_end_note(task: &Task) -> Option<&'static str> {
    let spec = task.recurrence_spec()?;
    match RecurrenceEngine::new().normalize(&spec) {
        Ok(_) => Some("This was the last occurrence."),
        Err(_) => Some("Its recurrence rule could not be read, so no next occurrence was scheduled."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use planner_core::models::{RecurrencePreset, TaskPriority};
    use uuid::Uuid;

    fn task(recurrence: Option<RecurrencePreset>, rule: Option<&str>) -> Task {
        Task {
            id: Uuid::new_v4(),
            list_id: Uuid::nil(),
            parent_id: None,
            title: "Water plants".to_string(),
            description: None,
            priority: TaskPriority::None,
            due_at: None,
            is_completed: true,
            completed_at: Some(Utc::now()),
            recurrence,
            recurrence_rule: rule.map(str::to_string),
            estimated_minutes: None,
            actual_minutes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_plain_task_gets_no_note() {
        assert_eq!(series_end_note(&task(None, None)), None);
    }

    #[test]
    fn test_exhausted_series_is_the_last_occurrence() {
        let note = series_end_note(&task(None, Some("FREQ=DAILY;COUNT=1")));
        assert_eq!(note, Some("This was the last occurrence."));
    }

    #[test]
    fn test_unreadable_rule_is_not_reported_as_last_occurrence() {
        let note = series_end_note(&task(Some(RecurrencePreset::Daily), Some("FREQ=SOMETIMES"))).unwrap();
        assert!(note.contains("could not be read"));
    }
}
