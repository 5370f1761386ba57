use anyhow::{anyhow, Result};
use chrono_tz::Tz;
use owo_colors::OwoColorize;
use smartflow_core::models::UpdateTaskData;
use smartflow_core::repository::TaskRepository;

use crate::cli::EditCommand;
use crate::parser::parse_due_date;
use crate::util::{resolve_task_id, CliError};

pub async fn edit_task(repo: &mut TaskRepository, command: EditCommand, tz: Tz) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id)?;

    let date = command
        .due
        .as_deref()
        .map(|d| parse_due_date(d, tz))
        .transpose()?;

    let update_data = UpdateTaskData {
        text: command.text,
        date,
        priority: command.priority,
        category: command.category,
        recurrence: command.every,
    };

    if update_data.text.is_none()
        && update_data.date.is_none()
        && update_data.priority.is_none()
        && update_data.category.is_none()
        && update_data.recurrence.is_none()
    {
        return Err(anyhow!(CliError::InvalidInput(
            "Nothing to change. Pass at least one of --text, --due, --priority, --category, --every."
                .to_string()
        )));
    }

    let task = repo.update(&task_id, update_data).await?;
    println!("{} Updated task: {}", "✓".green().bold(), task.text);
    Ok(())
}
