//! Plain-text and JSON renderings of the task list.

use chrono_tz::Tz;
use thiserror::Error;

use crate::models::Task;

pub const EXPORT_TITLE: &str = "SmartFlow - Task list";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No tasks to export")]
    NothingToExport,

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Title line followed by one numbered line per task, dates shown as
/// wall-clock time in `tz`.
pub fn render_text(tasks: &[Task], tz: Tz) -> Result<String, ExportError> {
    if tasks.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let mut out = String::from(EXPORT_TITLE);
    out.push('\n');
    for (i, task) in tasks.iter().enumerate() {
        let status = if task.completed { "Completed" } else { "Pending" };
        out.push_str(&format!(
            "{}. {} ({}) [{}]\n",
            i + 1,
            task.text,
            task.date.with_timezone(&tz).format("%Y-%m-%d %H:%M"),
            status
        ));
    }
    Ok(out)
}

/// The task array in its wire shape.
pub fn render_json(tasks: &[Task]) -> Result<String, ExportError> {
    if tasks.is_empty() {
        return Err(ExportError::NothingToExport);
    }
    Ok(serde_json::to_string_pretty(tasks)?)
}
