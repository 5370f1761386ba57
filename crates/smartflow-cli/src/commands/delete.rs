use anyhow::Result;
use dialoguer::Confirm;
use smartflow_core::repository::TaskRepository;

use crate::cli::{ClearCommand, DeleteCommand};
use crate::util::resolve_task_id;

fn confirm(prompt: String) -> bool {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .unwrap_or(false)
}

pub async fn delete_task(repo: &mut TaskRepository, command: DeleteCommand) -> Result<()> {
    let task_id = resolve_task_id(repo, &command.id)?;

    if !command.force {
        let text = repo.get(&task_id).map(|t| t.text.clone()).unwrap_or_default();
        if !confirm(format!("Are you sure you want to delete task '{}'?", text)) {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    let task = repo.remove(&task_id).await?;
    println!("Deleted task: '{}'", task.text);
    Ok(())
}

pub async fn clear_tasks(repo: &mut TaskRepository, command: ClearCommand) -> Result<()> {
    if repo.is_empty() {
        println!("No tasks to delete.");
        return Ok(());
    }

    if !command.force
        && !confirm(format!("Are you sure you want to delete all {} tasks?", repo.len()))
    {
        println!("Deletion cancelled.");
        return Ok(());
    }

    let removed = repo.clear().await?;
    println!("Deleted {} task(s).", removed);
    Ok(())
}
