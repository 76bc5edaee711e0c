use anyhow::Result;
use clap::Parser;
use owo_colors::{OwoColorize, Style};
use planner_core::db;
use planner_core::error::{CoreError, RecurrenceError};
use planner_core::repository::SqliteRepository;
use planner_core::timezone::parse_timezone;

mod cli;
mod commands;
mod config;
mod logging;
mod parser;
mod util;
mod views;

use cli::{Cli, Commands};
use config::Config;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::new() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} Invalid configuration: {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };
    logging::init(&config.log_level);

    if let Err(e) = run(cli, &config).await {
        handle_error(e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &Config) -> Result<()> {
    // Previewing a rule needs no database.
    if let Commands::Next(command) = &cli.command {
        return commands::next::preview(command, config);
    }

    let timezone = parse_timezone(&config.default_timezone)?;
    let pool = db::establish_connection(&config.database_path).await?;
    let repository = SqliteRepository::new(pool).with_timezone(timezone);
    tracing::debug!(database = %config.database_path, timezone = %timezone, "repository ready");

    match cli.command {
        Commands::Add(command) => commands::add::add_task(&repository, command, timezone).await,
        Commands::Ls(command) => commands::ls::list_tasks(&repository, command, timezone).await,
        Commands::Do(command) => commands::r#do::do_task(&repository, command, timezone).await,
        Commands::Undo(command) => commands::undo::undo_task(&repository, command).await,
        Commands::Recur(command) => commands::recur::set_recurrence(&repository, command).await,
        Commands::Log(command) => commands::log::log_time(&repository, command).await,
        Commands::Rm(command) => commands::rm::delete_task(&repository, command).await,
        Commands::List(command) => commands::lists::list_command(&repository, command).await,
        Commands::Next(_) => Ok(()),
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.downcast_ref::<CoreError>() {
        match core_error {
            CoreError::NotFound(s) => {
                eprintln!("{} Not found: {}", "Error:".style(error_style), s);
            }
            CoreError::AmbiguousId(tasks) => {
                eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
                eprintln!("Did you mean one of these?");
                for (id, title) in tasks {
                    eprintln!("  {} ({})", id.yellow(), title);
                }
            }
            CoreError::InvalidInput(s) => {
                eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
            }
            CoreError::AlreadyCompleted(title) => {
                eprintln!(
                    "{} Task '{}' is already completed.",
                    "Error:".style(error_style),
                    title.yellow()
                );
            }
            CoreError::Recurrence(e) => print_recurrence_error(e, error_style),
            CoreError::Database(e) => {
                eprintln!("{} Database error: {}", "Error:".style(error_style), e);
            }
            _ => eprintln!("{} {}", "Error:".style(error_style), err),
        }
    } else if let Some(e) = err.downcast_ref::<RecurrenceError>() {
        print_recurrence_error(e, error_style);
    } else {
        eprintln!("{} {}", "Error:".style(error_style), err);
    }
}

fn print_recurrence_error(err: &RecurrenceError, style: Style) {
    match err {
        RecurrenceError::Parse { rule, reason } => {
            eprintln!(
                "{} Invalid recurrence rule '{}': {}",
                "Error:".style(style),
                rule.yellow(),
                reason
            );
        }
    }
}
