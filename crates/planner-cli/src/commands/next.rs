use anyhow::Result;
use chrono::Utc;
use planner_core::recurrence::{RecurrenceEngine, RecurrenceSpec};
use planner_core::timezone::parse_timezone;

use crate::cli::NextCommand;
use crate::config::Config;
use crate::parser::parse_due_date;
use crate::util::DATE_FORMAT;

/// Prints the upcoming occurrences of a preset or rule without touching the database.
pub fn preview(command: &NextCommand, config: &Config) -> Result<()> {
    let timezone = parse_timezone(command.tz.as_deref().unwrap_or(&config.default_timezone))?;
    let mut spec = match (&command.rule, command.every) {
        (Some(rule), _) => RecurrenceSpec::Custom(rule.clone()),
        (None, Some(preset)) => RecurrenceSpec::Preset(preset),
        (None, None) => anyhow::bail!("Either --every or --rule is required"),
    };
    let from = match command.from.as_deref() {
        Some(from) => parse_due_date(from, timezone)?,
        None => Utc::now(),
    };

    let engine = RecurrenceEngine::new();
    println!("Rule: {}", engine.normalize(&spec)?);

    let mut anchor = from.with_timezone(&timezone);
    for n in 1..=command.count.unwrap_or(config.preview_count) {
        match engine.next_occurrence(&spec, &anchor)? {
            Some(next) => {
                println!("{:>3}. {}", n, next.format(DATE_FORMAT));
                spec = engine.carry_forward(&spec);
                anchor = next;
            }
            None => {
                println!("No further occurrences.");
                break;
            }
        }
    }
    Ok(())
}
