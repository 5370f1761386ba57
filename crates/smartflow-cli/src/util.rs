use anyhow::{anyhow, Result};
use smartflow_core::error::CoreError;
use smartflow_core::repository::TaskRepository;
use thiserror::Error;

/// Input problems detected by the CLI itself.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Ambiguous ID")]
    AmbiguousId(Vec<(String, String)>),
}

/// Resolves a full id or an unambiguous prefix of at least two characters.
pub fn resolve_task_id(repo: &TaskRepository, short_id: &str) -> Result<String> {
    if repo.get(short_id).is_some() {
        return Ok(short_id.to_string());
    }
    if short_id.len() < 2 {
        return Err(anyhow!(CliError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }

    let matches: Vec<_> = repo
        .tasks()
        .iter()
        .filter(|t| t.id.starts_with(short_id))
        .collect();
    match matches.as_slice() {
        [task] => Ok(task.id.clone()),
        [] => Err(anyhow!(CoreError::NotFound(format!(
            "No task found with ID prefix '{}'",
            short_id
        )))),
        _ => Err(anyhow!(CliError::AmbiguousId(
            matches
                .iter()
                .map(|t| (t.id.clone(), t.text.clone()))
                .collect()
        ))),
    }
}

/// First characters of an id, enough to type back in.
pub fn short_id(id: &str) -> &str {
    id.get(..18).unwrap_or(id)
}
