//! # Planner Core Library
//!
//! Task lists, labels, sub-tasks and effort tracking on SQLite, with recurring
//! tasks driven by a small RRULE engine.
//!
//! ## Core Modules
//!
//! - [`db`]: Database connection and migration management
//! - [`models`]: Core data structures and transfer objects
//! - [`repository`]: Data access layer and the task-completion workflow
//! - [`recurrence`]: Next-occurrence computation for presets and RRULE strings
//! - [`timezone`]: Timezone validation
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use planner_core::{
//!     db, models::{NewTaskData, RecurrencePreset, CompletionResult},
//!     repository::{SqliteRepository, TaskRepository},
//! };
//! use chrono::Utc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = db::establish_connection("planner.db").await?;
//!     let repo = SqliteRepository::new(pool);
//!
//!     let task = repo.add_task(NewTaskData {
//!         title: "Daily standup".to_string(),
//!         due_at: Some(Utc::now()),
//!         recurrence: Some(RecurrencePreset::Weekdays),
//!         ..Default::default()
//!     }).await?;
//!
//!     if let CompletionResult::Recurring { next, .. } = repo.complete_task(task.id).await? {
//!         println!("next standup: {:?}", next.due_at);
//!     }
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
pub mod models;
pub mod recurrence;
pub mod repository;
pub mod timezone;
