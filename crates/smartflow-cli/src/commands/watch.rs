use anyhow::Result;
use chrono_tz::Tz;
use owo_colors::OwoColorize;
use smartflow_core::notification::{NotificationEvent, Permission, PermissionGate};
use smartflow_core::repository::TaskRepository;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::timezone::format_local;

const OVERDUE_CHECK_INTERVAL: Duration = Duration::from_secs(60);

fn print_event(event: &NotificationEvent, tz: Tz) {
    match event {
        NotificationEvent::Reminder { text, due, .. } => {
            println!("{} {} is due at {}", "⏰".yellow(), text.bold(), format_local(*due, tz));
        }
        NotificationEvent::Overdue { text, due, .. } => {
            println!(
                "{} {} is overdue (was due {})",
                "!".red().bold(),
                text.bold(),
                format_local(*due, tz)
            );
        }
        NotificationEvent::Completed { text, .. } => {
            println!("{} {} completed", "✓".green().bold(), text);
        }
    }
}

/// Arms reminders and prints them, plus overdue alerts, until Ctrl-C.
pub async fn watch_tasks(
    repo: &mut TaskRepository,
    events: &mut UnboundedReceiver<NotificationEvent>,
    gate: &dyn PermissionGate,
    tz: Tz,
) -> Result<()> {
    let permission = repo.set_notifications(true, gate).await;
    if permission != Permission::Granted {
        println!("Notifications are not permitted; nothing to watch.");
        return Ok(());
    }
    // starting the watch is the user interaction alerts wait for
    repo.record_interaction();

    println!(
        "Watching {} reminder(s). Press Ctrl-C to stop.",
        repo.notifications().armed_count()
    );

    let mut overdue_check = tokio::time::interval(OVERDUE_CHECK_INTERVAL);
    loop {
        tokio::select! {
            _ = overdue_check.tick() => {
                repo.check_overdue();
            }
            Some(event) = events.recv() => print_event(&event, tz),
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    repo.set_notifications(false, gate).await;
    Ok(())
}
