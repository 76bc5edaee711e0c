use clap::{ArgGroup, Parser, Subcommand};
use planner_core::models::{RecurrencePreset, TaskPriority};

/// A task planner with lists, labels, effort tracking and recurring tasks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add a new task
    Add(AddCommand),
    /// Show open tasks
    Ls(LsCommand),
    /// Mark a task as completed, scheduling the next occurrence if it repeats
    Do(DoCommand),
    /// Reopen a completed task
    Undo(UndoCommand),
    /// Set or clear the recurrence of a task
    Recur(RecurCommand),
    /// Preview upcoming occurrences of a recurrence
    Next(NextCommand),
    /// Log time spent on a task
    Log(LogCommand),
    /// Delete a task and its sub-tasks
    Rm(RmCommand),
    /// Manage lists
    List(ListCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// The title of the task
    pub title: String,
    /// The description of the task
    #[arg(short, long)]
    pub description: Option<String>,
    /// The due date of the task (e.g. "tomorrow 9am", "2025-12-19 09:00")
    #[arg(long)]
    pub due: Option<String>,
    /// The list to add the task to (defaults to the Inbox)
    #[arg(short, long)]
    pub list: Option<String>,
    /// The priority of the task (none, low, medium, high)
    #[arg(short, long)]
    pub priority: Option<TaskPriority>,
    /// A label to attach; repeat for several
    #[arg(long = "label")]
    pub labels: Vec<String>,
    /// Repeat on a preset schedule (daily, weekly, weekdays, monthly, yearly)
    #[arg(long, conflicts_with = "rule")]
    pub every: Option<RecurrencePreset>,
    /// Repeat following an RFC 5545 rule, e.g. "FREQ=WEEKLY;BYDAY=MO,TH"
    #[arg(long)]
    pub rule: Option<String>,
    /// Estimated effort in minutes
    #[arg(long)]
    pub estimate: Option<i64>,
    /// The ID of the parent task, making this a sub-task
    #[arg(long)]
    pub parent: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct LsCommand {
    /// Only show tasks in this list
    #[arg(short, long)]
    pub list: Option<String>,
    /// Only show tasks with this label
    #[arg(long)]
    pub label: Option<String>,
    /// Include completed tasks
    #[arg(short, long)]
    pub all: bool,
    /// Only show tasks due before this date (e.g. "friday", "2025-12-19 09:00")
    #[arg(long)]
    pub due_before: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct DoCommand {
    /// The ID of the task to mark as completed
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct UndoCommand {
    /// The ID of the task to reopen
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
#[command(group(ArgGroup::new("recurrence").required(true).args(["every", "rule", "clear"])))]
pub struct RecurCommand {
    /// The ID of the task
    pub id: String,
    #[arg(long)]
    pub every: Option<RecurrencePreset>,
    #[arg(long)]
    pub rule: Option<String>,
    /// Make the task non-recurring
    #[arg(long)]
    pub clear: bool,
}

#[derive(Parser, Debug, Clone)]
#[command(group(ArgGroup::new("recurrence").required(true).args(["every", "rule"])))]
pub struct NextCommand {
    #[arg(long)]
    pub every: Option<RecurrencePreset>,
    #[arg(long)]
    pub rule: Option<String>,
    /// Start of the series (defaults to now)
    #[arg(long)]
    pub from: Option<String>,
    /// IANA timezone to step in (defaults to the configured timezone)
    #[arg(long)]
    pub tz: Option<String>,
    /// How many occurrences to show
    #[arg(short = 'n', long)]
    pub count: Option<usize>,
}

#[derive(Parser, Debug, Clone)]
pub struct LogCommand {
    /// The ID of the task
    pub id: String,
    /// Minutes spent
    pub minutes: i64,
}

#[derive(Parser, Debug, Clone)]
pub struct RmCommand {
    /// The ID of the task to delete
    pub id: String,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    #[command(subcommand)]
    pub action: ListAction,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ListAction {
    /// Create a list
    Add { name: String },
    /// Show all lists
    Ls,
    /// Delete a list together with its tasks
    Rm {
        name: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}
