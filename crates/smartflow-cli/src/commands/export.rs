use anyhow::{Context, Result};
use chrono_tz::Tz;
use smartflow_core::export::{render_json, render_text};
use smartflow_core::repository::TaskRepository;

use crate::cli::{ExportCommand, ExportFormat};

pub fn export_tasks(repo: &TaskRepository, command: ExportCommand, tz: Tz) -> Result<()> {
    let rendered = match command.format {
        ExportFormat::Text => render_text(repo.tasks(), tz)?,
        ExportFormat::Json => render_json(repo.tasks())?,
    };

    match command.output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("Could not write {}", path.display()))?;
            println!("Exported {} task(s) to {}", repo.len(), path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}
