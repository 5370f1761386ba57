use anyhow::Result;
use chrono_tz::Tz;
use owo_colors::{OwoColorize, Style};
use smartflow_core::models::{AddResult, NewTaskData};
use smartflow_core::repository::TaskRepository;

use crate::cli::AddCommand;
use crate::parser::parse_due_date;
use crate::timezone::format_local;

pub async fn add_task(repo: &mut TaskRepository, command: AddCommand, tz: Tz) -> Result<()> {
    let date = parse_due_date(&command.due, tz)?;
    let priority_inferred = command.priority.is_none();

    let new_task_data = NewTaskData {
        text: command.text,
        date: Some(date),
        priority: command.priority,
        category: command.category,
        recurrence: command.every,
    };

    let result = repo.add(new_task_data).await?;

    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();
    let task = result.task();

    let heading = match result {
        AddResult::Recurring { .. } => "Created recurring task:",
        AddResult::Single(_) => "Created task:",
    };
    println!(
        "{} {} {}",
        "✓".style(success_style),
        heading,
        task.text.bright_white().bold()
    );
    println!("  {} Task ID: {}", "→".style(info_style), task.id.yellow());
    println!(
        "  {} Due: {}",
        "→".style(info_style),
        format_local(task.date, tz).cyan()
    );
    if priority_inferred {
        println!(
            "  {} Priority: {} (from the text)",
            "→".style(info_style),
            task.priority
        );
    }

    if let AddResult::Recurring { successor, .. } = &result {
        println!(
            "  {} Next {} occurrence: {} ({})",
            "→".style(info_style),
            successor.recurrence,
            format_local(successor.date, tz).cyan(),
            successor.id.yellow()
        );
    }

    Ok(())
}
