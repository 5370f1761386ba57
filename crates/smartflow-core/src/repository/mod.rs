//! The in-memory task collection and everything that mutates it.
//!
//! [`TaskRepository`] is the single owner of the working set. A mutation is
//! applied to memory first, then written through to the [`TaskStore`], and
//! finally announced to the background sync trigger. A failed write comes
//! back as [`CoreError::Persistence`] but the in-memory change stands; the
//! next `TASKS_SYNCED` reconcile or reload realigns memory with the store.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::controller::PageMessage;
use crate::error::{CoreError, PersistenceError};
use crate::migration::migrate_records;
use crate::models::{RepositoryConfig, SortKey, StatusFilter, Task};
use crate::notification::{NotificationScheduler, Permission, PermissionGate};
use crate::store::TaskStore;
use crate::sync::SyncTrigger;
use crate::timezone::validate_timezone;

pub mod query;
mod tasks;

#[cfg(test)]
pub(crate) mod testing;

/// What happened while loading the collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    /// Legacy records whose dates were rewritten.
    pub migrated: usize,
    /// Legacy records whose date could not be read and now carry the load time.
    pub defaulted: usize,
}

pub struct TaskRepository {
    tasks: Vec<Task>,
    store: Arc<dyn TaskStore>,
    notifications: NotificationScheduler,
    sync: Box<dyn SyncTrigger>,
    config: RepositoryConfig,
    summary: LoadSummary,
}

impl TaskRepository {
    /// Reads every stored record, upgrades legacy ones in place and arms
    /// reminders for the result.
    pub async fn load(
        store: Arc<dyn TaskStore>,
        notifications: NotificationScheduler,
        sync: Box<dyn SyncTrigger>,
        config: RepositoryConfig,
    ) -> Result<Self, CoreError> {
        let legacy_tz = validate_timezone(&config.legacy_timezone)?;
        let records = store.get_all().await?;
        let report = migrate_records(store.as_ref(), records, legacy_tz, Utc::now()).await?;

        if report.changed() > 0 {
            info!(
                "Migrated {} legacy task(s), {} without a readable date",
                report.changed(),
                report.defaulted
            );
        }
        let summary = LoadSummary {
            loaded: report.tasks.len(),
            migrated: report.migrated,
            defaulted: report.defaulted,
        };
        debug!("Loaded {} task(s)", summary.loaded);

        let mut repository = Self {
            tasks: report.tasks,
            store,
            notifications,
            sync,
            config,
            summary,
        };
        repository.arm_all();
        Ok(repository)
    }

    pub fn summary(&self) -> LoadSummary {
        self.summary
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Filtered, searched and sorted copy of the collection.
    pub fn list(&self, filter: StatusFilter, search: &str, sort: SortKey) -> Vec<Task> {
        query::project(&self.tasks, filter, search, sort)
    }

    /// Replaces the collection with a sync payload.
    ///
    /// Timers of ids that vanished, or that arrive completed, are cancelled;
    /// every other task is re-armed. Nothing is written back.
    pub fn reconcile(&mut self, tasks: Vec<Task>) {
        for old in &self.tasks {
            let still_pending = tasks.iter().any(|t| t.id == old.id && !t.completed);
            if !still_pending {
                self.notifications.cancel(&old.id);
            }
        }
        debug!("Reconciled {} -> {} task(s)", self.tasks.len(), tasks.len());
        self.tasks = tasks;
        self.arm_all();
    }

    pub fn apply_page_message(&mut self, message: PageMessage) {
        match message {
            PageMessage::TasksSynced { tasks } => self.reconcile(tasks),
        }
    }

    pub fn notifications(&self) -> &NotificationScheduler {
        &self.notifications
    }

    /// Turns reminders on (asking `gate` for permission) or off.
    pub async fn set_notifications(
        &mut self,
        enabled: bool,
        gate: &dyn PermissionGate,
    ) -> Permission {
        if enabled {
            self.notifications.enable(gate, &self.tasks).await
        } else {
            self.notifications.disable();
            self.notifications.permission()
        }
    }

    pub fn record_interaction(&mut self) {
        self.notifications.record_interaction();
    }

    /// Flags incomplete past-due tasks once per session. Returns their ids.
    pub fn check_overdue(&mut self) -> Vec<String> {
        self.notifications.check_overdue(&self.tasks)
    }

    pub fn schedule_notification(&mut self, id: &str) -> Result<bool, CoreError> {
        let task = self
            .tasks
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
        Ok(self.notifications.schedule(task))
    }

    pub fn cancel_notification(&mut self, id: &str) -> bool {
        self.notifications.cancel(id)
    }

    pub fn trigger_sync(&self) {
        self.sync.trigger();
    }

    fn arm_all(&mut self) {
        for task in &self.tasks {
            if !task.completed {
                self.notifications.schedule(task);
            }
        }
    }

    fn position(&self, id: &str) -> Result<usize, CoreError> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Task::generate_id();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    /// Ends a mutation: announces it to the sync trigger whatever the outcome
    /// of the write, and maps a failed write to a user-facing error.
    fn finish<T>(&self, result: Result<(), PersistenceError>, value: T) -> Result<T, CoreError> {
        self.sync.trigger();
        match result {
            Ok(()) => Ok(value),
            Err(e) => {
                error!("Write-through failed, in-memory change kept: {}", e);
                Err(CoreError::Persistence(e))
            }
        }
    }
}
