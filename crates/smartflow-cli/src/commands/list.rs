use anyhow::Result;
use chrono_tz::Tz;
use smartflow_core::repository::TaskRepository;

use crate::cli::ListCommand;
use crate::views::table::display_tasks;

pub fn list_tasks(repo: &TaskRepository, command: ListCommand, tz: Tz) -> Result<()> {
    let tasks = repo.list(command.status, &command.search, command.sort);
    display_tasks(&tasks, tz);
    Ok(())
}
