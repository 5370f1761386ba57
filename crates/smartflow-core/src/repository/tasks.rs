use chrono::{DateTime, Utc};
use tracing::debug;

use super::TaskRepository;
use crate::error::CoreError;
use crate::models::{AddResult, NewTaskData, Recurrence, Task, UpdateTaskData};
use crate::priority::infer_priority;
use crate::recurrence::RecurrenceManager;

fn validate_text(text: &str) -> Result<String, CoreError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(CoreError::Validation("Task text cannot be empty".to_string()));
    }
    Ok(text.to_string())
}

fn validate_date(
    date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, CoreError> {
    match date {
        None => Err(CoreError::Validation("A due date is required".to_string())),
        Some(date) if date <= now => Err(CoreError::Validation(
            "Due date must be in the future".to_string(),
        )),
        Some(date) => Ok(date),
    }
}

impl TaskRepository {
    /// Creates a task, and for a recurring one its next occurrence as well.
    pub async fn add(&mut self, data: NewTaskData) -> Result<AddResult, CoreError> {
        let recurrence = data.recurrence.unwrap_or_default();
        let needed = if recurrence == Recurrence::None { 1 } else { 2 };
        if self.tasks.len() + needed > self.config.max_tasks {
            return Err(CoreError::Capacity(self.config.max_tasks));
        }

        let now = Utc::now();
        let text = validate_text(&data.text)?;
        let date = validate_date(data.date, now)?;

        let task = Task {
            id: self.fresh_id(),
            priority: data.priority.unwrap_or_else(|| infer_priority(&text)),
            text,
            date,
            category: data.category.unwrap_or_default(),
            recurrence,
            completed: false,
            created_at: now,
        };
        let successor =
            RecurrenceManager::new(recurrence).successor(&task, self.fresh_id(), now)?;

        self.tasks.push(task.clone());
        self.notifications.schedule(&task);
        let mut written = self.store.put(&task).await;

        let result = match successor {
            Some(successor) => {
                debug!("Spawned successor {} of task {}", successor.id, task.id);
                self.tasks.push(successor.clone());
                self.notifications.schedule(&successor);
                if written.is_ok() {
                    written = self.store.put(&successor).await;
                }
                AddResult::Recurring { task, successor }
            }
            None => AddResult::Single(task),
        };

        self.finish(written, result)
    }

    /// Replaces the editable fields of a task. Text and date are validated as
    /// for [`add`](Self::add); the date must still lie in the future.
    pub async fn update(&mut self, id: &str, data: UpdateTaskData) -> Result<Task, CoreError> {
        let index = self.position(id)?;
        let current = &self.tasks[index];

        let text = validate_text(data.text.as_deref().unwrap_or(&current.text))?;
        let date = validate_date(Some(data.date.unwrap_or(current.date)), Utc::now())?;
        let updated = Task {
            id: current.id.clone(),
            text,
            date,
            priority: data.priority.unwrap_or(current.priority),
            category: data.category.unwrap_or(current.category),
            recurrence: data.recurrence.unwrap_or(current.recurrence),
            completed: current.completed,
            created_at: current.created_at,
        };

        self.tasks[index] = updated.clone();
        self.notifications.cancel(id);
        self.notifications.schedule(&updated);

        let written = self.store.put(&updated).await;
        self.finish(written, updated)
    }

    /// Flips completion. Completing cancels the reminder; reopening re-arms it.
    pub async fn toggle(&mut self, id: &str) -> Result<Task, CoreError> {
        let index = self.position(id)?;
        self.tasks[index].completed = !self.tasks[index].completed;
        let task = self.tasks[index].clone();

        self.notifications.cancel(id);
        if task.completed {
            self.notifications.notify_completed(&task);
        } else {
            self.notifications.schedule(&task);
        }

        let written = self.store.put(&task).await;
        self.finish(written, task)
    }

    pub async fn remove(&mut self, id: &str) -> Result<Task, CoreError> {
        let index = self.position(id)?;
        let task = self.tasks.remove(index);
        self.notifications.cancel(id);

        let written = self.store.delete(id).await.map(|_| ());
        self.finish(written, task)
    }

    /// Removes every task. Returns how many were held in memory.
    pub async fn clear(&mut self) -> Result<usize, CoreError> {
        let removed = self.tasks.len();
        self.tasks.clear();
        self.notifications.cancel_all();

        let written = self.store.clear().await.map(|_| ());
        self.finish(written, removed)
    }
}
