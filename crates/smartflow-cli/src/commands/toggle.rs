use anyhow::Result;
use owo_colors::OwoColorize;
use smartflow_core::repository::TaskRepository;

use crate::cli::ToggleCommand;
use crate::util::resolve_task_id;

pub async fn toggle_task(repo: &mut TaskRepository, command: ToggleCommand) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id)?;
    let task = repo.toggle(&task_id).await?;

    if task.completed {
        println!("{} Completed task: '{}'", "✓".green().bold(), task.text);
    } else {
        println!("{} Reopened task: '{}'", "↺".yellow(), task.text);
    }
    Ok(())
}
