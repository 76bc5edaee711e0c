use anyhow::Result;
use dialoguer::Confirm;
use planner_core::repository::ListRepository;

use crate::cli::{ListAction, ListCommand};
use crate::views::table::display_lists;

pub async fn list_command(repo: &impl ListRepository, command: ListCommand) -> Result<()> {
    match command.action {
        ListAction::Add { name } => {
            let list = repo.add_list(name).await?;
            println!("Created list: '{}'", list.name);
        }
        ListAction::Ls => {
            // Make sure the Inbox shows up even before the first task.
            repo.default_list().await?;
            display_lists(&repo.find_lists().await?);
        }
        ListAction::Rm { name, force } => {
            if !force {
                let confirmation = Confirm::new()
                    .with_prompt(format!("Delete list '{}' and all of its tasks?", name))
                    .default(false)
                    .interact()
                    .unwrap_or(false);
                if !confirmation {
                    println!("Deletion cancelled.");
                    return Ok(());
                }
            }
            repo.delete_list(name.clone()).await?;
            println!("Deleted list: '{}'", name);
        }
    }
    Ok(())
}
