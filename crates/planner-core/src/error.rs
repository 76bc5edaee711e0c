use thiserror::Error;

/// Failures raised while turning a recurrence rule string into a [`RecurrenceRule`].
///
/// Exhaustion (no further occurrences) is not an error; the engine reports it
/// as `Ok(None)`.
///
/// [`RecurrenceRule`]: crate::recurrence::RecurrenceRule
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("Invalid recurrence rule '{rule}': {reason}")]
    Parse { rule: String, reason: String },
}

impl RecurrenceError {
    pub(crate) fn parse(rule: &str, reason: impl Into<String>) -> Self {
        RecurrenceError::Parse {
            rule: rule.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Recurrence(#[from] RecurrenceError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Task '{0}' is already completed.")]
    AlreadyCompleted(String),

    #[error("Ambiguous short ID. Did you mean one of these?")]
    AmbiguousId(Vec<(String, String)>), // Vec of (ID, Title)
}
