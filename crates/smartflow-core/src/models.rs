use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::error::PersistenceError;

/// Separator that only appears in canonical (RFC 3339) dates.
pub const CANONICAL_MARKER: char = 'T';

/// Formats a timestamp in the single representation used for stored dates.
pub fn format_canonical(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parses a canonical date. Returns `None` for anything else, including
/// legacy display strings.
pub fn parse_canonical(s: &str) -> Option<DateTime<Utc>> {
    if !s.contains(CANONICAL_MARKER) {
        return None;
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid task priority: {0}")]
pub struct ParseTaskPriorityError(String);

impl FromStr for TaskPriority {
    type Err = ParseTaskPriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            _ => Err(ParseTaskPriorityError(s.to_string())),
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskPriority::Low => write!(f, "low"),
            TaskPriority::Medium => write!(f, "medium"),
            TaskPriority::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Work,
    Personal,
    Urgent,
    #[default]
    Other,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid task category: {0}")]
pub struct ParseTaskCategoryError(String);

impl FromStr for TaskCategory {
    type Err = ParseTaskCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "work" => Ok(TaskCategory::Work),
            "personal" => Ok(TaskCategory::Personal),
            "urgent" => Ok(TaskCategory::Urgent),
            "other" => Ok(TaskCategory::Other),
            _ => Err(ParseTaskCategoryError(s.to_string())),
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskCategory::Work => write!(f, "work"),
            TaskCategory::Personal => write!(f, "personal"),
            TaskCategory::Urgent => write!(f, "urgent"),
            TaskCategory::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid recurrence: {0}")]
pub struct ParseRecurrenceError(String);

impl FromStr for Recurrence {
    type Err = ParseRecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Recurrence::None),
            "daily" => Ok(Recurrence::Daily),
            "weekly" => Ok(Recurrence::Weekly),
            "monthly" => Ok(Recurrence::Monthly),
            _ => Err(ParseRecurrenceError(s.to_string())),
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recurrence::None => write!(f, "none"),
            Recurrence::Daily => write!(f, "daily"),
            Recurrence::Weekly => write!(f, "weekly"),
            Recurrence::Monthly => write!(f, "monthly"),
        }
    }
}

/// A task as held by the repository and relayed between contexts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Time-derived (UUIDv7 text for new tasks); legacy ids are kept verbatim.
    pub id: String,
    pub text: String,
    pub date: DateTime<Utc>,
    pub priority: TaskPriority,
    pub category: TaskCategory,
    pub recurrence: Recurrence,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// A fresh time-ordered identifier.
    pub fn generate_id() -> String {
        Uuid::now_v7().to_string()
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.date < now
    }
}

/// Row layout of the `tasks` table.
///
/// Ids and timestamps are kept as TEXT: a record loaded from an old database
/// may still carry a legacy display date until the migration stage rewrites it.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TaskRecord {
    pub id: String,
    pub text: String,
    pub date: String,
    pub priority: TaskPriority,
    pub category: TaskCategory,
    pub recurrence: Recurrence,
    pub completed: bool,
    pub created_at: String,
}

impl TaskRecord {
    pub fn has_canonical_dates(&self) -> bool {
        parse_canonical(&self.date).is_some() && parse_canonical(&self.created_at).is_some()
    }

    /// Converts a record whose timestamps are already canonical.
    pub fn to_task(&self) -> Result<Task, PersistenceError> {
        let corrupt = |reason: &str| PersistenceError::CorruptRecord {
            id: self.id.clone(),
            reason: reason.to_string(),
        };
        let date = parse_canonical(&self.date).ok_or_else(|| corrupt("date is not canonical"))?;
        let created_at = parse_canonical(&self.created_at)
            .ok_or_else(|| corrupt("created_at is not canonical"))?;

        Ok(Task {
            id: self.id.clone(),
            text: self.text.clone(),
            date,
            priority: self.priority,
            category: self.category,
            recurrence: self.recurrence,
            completed: self.completed,
            created_at,
        })
    }
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            text: task.text.clone(),
            date: format_canonical(&task.date),
            priority: task.priority,
            category: task.category,
            recurrence: task.recurrence,
            completed: task.completed,
            created_at: format_canonical(&task.created_at),
        }
    }
}

/// Input for [`crate::repository::TaskRepository::add`].
#[derive(Debug, Clone, Default)]
pub struct NewTaskData {
    pub text: String,
    pub date: Option<DateTime<Utc>>,
    /// Inferred from the text when absent.
    pub priority: Option<TaskPriority>,
    pub category: Option<TaskCategory>,
    pub recurrence: Option<Recurrence>,
}

/// Fields replaced by [`crate::repository::TaskRepository::update`].
/// `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct UpdateTaskData {
    pub text: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub priority: Option<TaskPriority>,
    pub category: Option<TaskCategory>,
    pub recurrence: Option<Recurrence>,
}

#[derive(Debug)]
pub enum AddResult {
    Single(Task),
    Recurring { task: Task, successor: Task },
}

impl AddResult {
    pub fn task(&self) -> &Task {
        match self {
            AddResult::Single(task) => task,
            AddResult::Recurring { task, .. } => task,
        }
    }
}

/// Completion-status bucket used by `list`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl StatusFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => !task.completed,
            StatusFilter::Completed => task.completed,
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid status filter: {0}")]
pub struct ParseStatusFilterError(String);

impl FromStr for StatusFilter {
    type Err = ParseStatusFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "pending" => Ok(StatusFilter::Pending),
            "completed" | "done" => Ok(StatusFilter::Completed),
            _ => Err(ParseStatusFilterError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Insertion order.
    #[default]
    Default,
    DateAsc,
    DateDesc,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid sort key: {0}")]
pub struct ParseSortKeyError(String);

impl FromStr for SortKey {
    type Err = ParseSortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(SortKey::Default),
            "date-asc" | "asc" => Ok(SortKey::DateAsc),
            "date-desc" | "desc" => Ok(SortKey::DateDesc),
            _ => Err(ParseSortKeyError(s.to_string())),
        }
    }
}

/// Core-side repository settings. The CLI maps its own config onto this.
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    pub max_tasks: usize,
    /// IANA zone legacy display dates were written in.
    pub legacy_timezone: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            max_tasks: 500,
            legacy_timezone: "UTC".to_string(),
        }
    }
}
