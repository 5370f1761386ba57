use clap::{Parser, Subcommand, ValueEnum};
use smartflow_core::models::{Recurrence, SortKey, StatusFilter, TaskCategory, TaskPriority};
use std::path::PathBuf;

/// SmartFlow: an offline-first task manager with reminders and background sync
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add a new task
    Add(AddCommand),
    /// List tasks
    List(ListCommand),
    /// Edit a task
    Edit(EditCommand),
    /// Mark a task as completed, or reopen a completed one
    Toggle(ToggleCommand),
    /// Delete a task
    Delete(DeleteCommand),
    /// Delete every task
    Clear(ClearCommand),
    /// Export the task list
    Export(ExportCommand),
    /// Run a background sync and reconcile with its result
    Sync,
    /// Show reminders and overdue alerts until interrupted
    Watch,
    /// Manage the offline asset cache
    Cache(CacheCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// What needs doing
    pub text: String,
    /// When it is due (e.g. "tomorrow 9am", "2030-12-25 18:30")
    #[clap(short, long)]
    pub due: String,
    /// Inferred from the text when omitted
    #[clap(short, long)]
    pub priority: Option<TaskPriority>,
    /// work, personal, urgent or other
    #[clap(short, long)]
    pub category: Option<TaskCategory>,
    /// Repeat daily, weekly or monthly
    #[clap(short, long)]
    pub every: Option<Recurrence>,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    /// all, pending or completed
    #[clap(short, long, default_value = "all")]
    pub status: StatusFilter,
    /// Only tasks whose text contains this (case-insensitive)
    #[clap(long, default_value = "")]
    pub search: String,
    /// default, date-asc or date-desc
    #[clap(long, default_value = "default")]
    pub sort: SortKey,
}

#[derive(Parser, Debug, Clone)]
pub struct EditCommand {
    /// The ID (or an unambiguous prefix) of the task to edit
    pub id: String,

    #[arg(long)]
    pub text: Option<String>,

    #[arg(long)]
    pub due: Option<String>,

    #[arg(long)]
    pub priority: Option<TaskPriority>,

    #[arg(long)]
    pub category: Option<TaskCategory>,

    #[arg(long)]
    pub every: Option<Recurrence>,
}

#[derive(Parser, Debug, Clone)]
pub struct ToggleCommand {
    /// The ID (or an unambiguous prefix) of the task
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    /// The ID (or an unambiguous prefix) of the task to delete
    pub id: String,
    /// Force deletion without confirmation
    #[clap(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ClearCommand {
    /// Skip the confirmation prompt
    #[clap(short, long)]
    pub force: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug, Clone)]
pub struct ExportCommand {
    #[clap(short, long, value_enum, default_value_t = ExportFormat::Text)]
    pub format: ExportFormat,
    /// Write to a file instead of stdout
    #[clap(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct CacheCommand {
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CacheSubcommand {
    /// Download every manifest asset into the current cache
    Install,
    /// Delete caches left by older versions
    Activate,
    /// Fetch a URL through the cache
    Fetch(CacheFetchCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct CacheFetchCommand {
    /// Absolute URL or a path under the configured origin
    pub url: String,
    /// Treat as a page navigation (network first, offline page fallback)
    #[clap(long)]
    pub navigate: bool,
}
