use chrono::{DateTime, Utc};
use chrono_humanize::Humanize;
use chrono_tz::Tz;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use planner_core::models::{Task, TaskList, TaskPriority};
use uuid::Uuid;

use crate::util::short_id;

#[derive(Debug, Clone)]
pub struct ViewTask {
    pub id: Uuid,
    pub title: String,
    pub is_completed: bool,
    pub priority: TaskPriority,
    pub due_at: Option<DateTime<Utc>>,
    pub list_name: Option<String>,
    pub labels: Vec<String>,
    pub depth: usize,
    pub recurrence: Option<String>,
    pub estimated_minutes: Option<i64>,
    pub actual_minutes: Option<i64>,
}

impl ViewTask {
    pub fn new(task: Task, list_name: Option<String>, labels: Vec<String>, depth: usize) -> Self {
        let recurrence = task.recurrence_spec().map(|spec| spec.to_string());
        Self {
            id: task.id,
            title: task.title,
            is_completed: task.is_completed,
            priority: task.priority,
            due_at: task.due_at,
            list_name,
            labels,
            depth,
            recurrence,
            estimated_minutes: task.estimated_minutes,
            actual_minutes: task.actual_minutes,
        }
    }
}

/// "30m", "30/45m" or "-" depending on what has been recorded.
pub fn format_effort(actual: Option<i64>, estimated: Option<i64>) -> String {
    match (actual, estimated) {
        (Some(actual), Some(estimated)) => format!("{}/{}m", actual, estimated),
        (Some(actual), None) => format!("{}m", actual),
        (None, Some(estimated)) => format!("0/{}m", estimated),
        (None, None) => "-".to_string(),
    }
}

pub fn display_tasks(tasks: &[ViewTask], timezone: Tz) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Due", "List", "Labels", "Repeats", "Effort"]);

    let now = Utc::now();
    for task in tasks {
        let mut row = Row::new();
        row.add_cell(Cell::new(short_id(&task.id)));

        let mut display_title = "  ".repeat(task.depth);
        if task.recurrence.is_some() {
            display_title.push_str("↻ ");
        }
        display_title.push_str(&task.title);

        let mut title_cell = Cell::new(display_title);
        title_cell = if task.is_completed {
            title_cell
                .add_attribute(Attribute::CrossedOut)
                .fg(Color::DarkGrey)
        } else {
            match task.priority {
                TaskPriority::High => title_cell.fg(Color::Red).add_attribute(Attribute::Bold),
                TaskPriority::Medium => title_cell.fg(Color::Yellow),
                TaskPriority::Low => title_cell.fg(Color::Green),
                TaskPriority::None => title_cell,
            }
        };
        row.add_cell(title_cell);

        let due_cell = match task.due_at {
            Some(due_at) => {
                let local = due_at.with_timezone(&timezone);
                let text = format!("{} ({})", local.format("%a %Y-%m-%d %H:%M"), due_at.humanize());
                if task.is_completed {
                    Cell::new(text)
                } else if due_at < now {
                    Cell::new(text).fg(Color::Red)
                } else if local.date_naive() == now.with_timezone(&timezone).date_naive() {
                    Cell::new(text).fg(Color::Yellow)
                } else {
                    Cell::new(text)
                }
            }
            None => Cell::new("-"),
        };
        row.add_cell(due_cell);

        row.add_cell(Cell::new(task.list_name.as_deref().unwrap_or("-")));
        row.add_cell(Cell::new(if task.labels.is_empty() {
            "-".to_string()
        } else {
            task.labels.join(", ")
        }));
        row.add_cell(Cell::new(task.recurrence.as_deref().unwrap_or("-")));
        row.add_cell(Cell::new(format_effort(task.actual_minutes, task.estimated_minutes)));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_lists(lists: &[TaskList]) {
    if lists.is_empty() {
        println!("No lists found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Name", "Default", "Created"]);

    for list in lists {
        let mut row = Row::new();
        row.add_cell(Cell::new(&list.name));
        row.add_cell(Cell::new(if list.is_default { "yes" } else { "" }));
        row.add_cell(Cell::new(list.created_at.humanize()));
        table.add_row(row);
    }

    println!("{table}");
}
