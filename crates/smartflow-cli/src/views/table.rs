use chrono::Utc;
use chrono_humanize::Humanize;
use chrono_tz::Tz;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use smartflow_core::models::{Recurrence, Task, TaskCategory, TaskPriority};

use crate::timezone::format_local;
use crate::util::short_id;

pub fn display_tasks(tasks: &[Task], tz: Tz) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Task", "Priority", "Category", "Due", "Status"]);

    let now = Utc::now();
    let today = now.with_timezone(&tz).date_naive();

    for task in tasks {
        let mut row = Row::new();
        row.add_cell(Cell::new(short_id(&task.id)));

        let mut display_text = String::new();
        if task.recurrence != Recurrence::None {
            display_text.push('↻');
            display_text.push(' ');
        }
        display_text.push_str(&task.text);

        let mut text_cell = Cell::new(display_text);
        if task.completed {
            text_cell = text_cell
                .add_attribute(Attribute::CrossedOut)
                .fg(Color::DarkGrey);
        } else {
            text_cell = match task.priority {
                TaskPriority::High => text_cell.fg(Color::Red).add_attribute(Attribute::Bold),
                TaskPriority::Medium => text_cell.fg(Color::Yellow),
                TaskPriority::Low => text_cell.fg(Color::Green),
            };
        }
        row.add_cell(text_cell);
        row.add_cell(Cell::new(task.priority));

        let category_cell = match task.category {
            TaskCategory::Urgent => Cell::new(task.category).fg(Color::Red),
            _ => Cell::new(task.category),
        };
        row.add_cell(category_cell);

        let due_text = format!("{} ({})", task.date.humanize(), format_local(task.date, tz));
        let due_cell = if task.completed {
            Cell::new(due_text)
        } else if task.date < now {
            Cell::new(due_text).fg(Color::Red) // Overdue
        } else if task.date.with_timezone(&tz).date_naive() == today {
            Cell::new(due_text).fg(Color::Yellow) // Due today
        } else {
            Cell::new(due_text)
        };
        row.add_cell(due_cell);

        let status_cell = if task.completed {
            Cell::new("Completed").fg(Color::Green)
        } else {
            Cell::new("Pending")
        };
        row.add_cell(status_cell);

        table.add_row(row);
    }

    println!("{table}");
}
