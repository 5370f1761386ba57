//! Reminder timers and overdue detection, keyed by task id.
//!
//! Every task holds at most one entry in the timer table: either an armed
//! one-shot timer or a sentinel recording that it was already flagged as
//! overdue this session.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::debug;

use crate::models::Task;

#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// How long before the due time a reminder fires.
    pub lead: Duration,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            lead: Duration::minutes(15),
        }
    }
}

/// Host answer to a notification permission request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Permission {
    #[default]
    Prompt,
    Granted,
    Denied,
}

/// The host's permission prompt.
#[async_trait]
pub trait PermissionGate: Send + Sync {
    async fn request_permission(&self) -> Permission;
}

/// A gate whose answer is fixed up front, e.g. from configuration.
pub struct StaticPermission(pub Permission);

#[async_trait]
impl PermissionGate for StaticPermission {
    async fn request_permission(&self) -> Permission {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    Reminder {
        task_id: String,
        text: String,
        due: DateTime<Utc>,
    },
    Overdue {
        task_id: String,
        text: String,
        due: DateTime<Utc>,
    },
    Completed {
        task_id: String,
        text: String,
    },
}

enum TimerEntry {
    Armed { handle: AbortHandle, generation: u64 },
    OverdueSentinel,
}

type TimerTable = Arc<Mutex<HashMap<String, TimerEntry>>>;

fn lock(timers: &TimerTable) -> MutexGuard<'_, HashMap<String, TimerEntry>> {
    timers.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct NotificationScheduler {
    config: NotificationConfig,
    enabled: bool,
    permission: Permission,
    interacted: bool,
    timers: TimerTable,
    next_generation: u64,
    events: mpsc::UnboundedSender<NotificationEvent>,
}

impl NotificationScheduler {
    /// Creates a disabled scheduler and the receiver its events go to.
    pub fn new(config: NotificationConfig) -> (Self, mpsc::UnboundedReceiver<NotificationEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            config,
            enabled: false,
            permission: Permission::Prompt,
            interacted: false,
            timers: Arc::new(Mutex::new(HashMap::new())),
            next_generation: 0,
            events,
        };
        (scheduler, rx)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    fn active(&self) -> bool {
        self.enabled && self.permission == Permission::Granted
    }

    /// Asks the host for permission and, when granted, turns reminders on and
    /// arms a timer for every incomplete task. A denial leaves the feature
    /// off without error.
    pub async fn enable(&mut self, gate: &dyn PermissionGate, tasks: &[Task]) -> Permission {
        self.permission = gate.request_permission().await;
        self.enabled = self.permission == Permission::Granted;
        if self.enabled {
            for task in tasks {
                self.schedule(task);
            }
        } else {
            debug!("Notification permission not granted ({:?})", self.permission);
        }
        self.permission
    }

    /// Turns reminders off and cancels every outstanding timer. Overdue
    /// sentinels stay, so re-enabling does not repeat alerts this session.
    pub fn disable(&mut self) {
        self.enabled = false;
        lock(&self.timers).retain(|_, entry| match entry {
            TimerEntry::Armed { handle, .. } => {
                handle.abort();
                false
            }
            TimerEntry::OverdueSentinel => true,
        });
    }

    /// Host alerts are only allowed after the user interacted with the page.
    pub fn record_interaction(&mut self) {
        self.interacted = true;
    }

    /// Arms a reminder for `task` at due time minus the lead interval,
    /// replacing any timer already armed for it. Returns whether a timer is
    /// now armed.
    pub fn schedule(&mut self, task: &Task) -> bool {
        // whatever happens below, a timer armed for an older due date is stale
        self.disarm(&task.id);
        if !self.active() || task.completed {
            return false;
        }

        let now = Utc::now();
        let fire_at = task.date - self.config.lead;
        if fire_at <= now {
            return false;
        }
        let delay = (fire_at - now).to_std().unwrap_or_default();

        self.next_generation += 1;
        let generation = self.next_generation;
        let id = task.id.clone();
        let event = NotificationEvent::Reminder {
            task_id: task.id.clone(),
            text: task.text.clone(),
            due: task.date,
        };
        let events = self.events.clone();
        let timers = Arc::clone(&self.timers);

        // Hold the table while spawning so the timer cannot observe it before
        // its own entry is in place.
        let mut table = lock(&self.timers);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let current = {
                let mut table = lock(&timers);
                match table.get(&id) {
                    Some(TimerEntry::Armed { generation: g, .. }) if *g == generation => {
                        table.remove(&id);
                        true
                    }
                    _ => false,
                }
            };
            if current {
                let _ = events.send(event);
            }
        })
        .abort_handle();

        if let Some(TimerEntry::Armed { handle: previous, .. }) =
            table.insert(task.id.clone(), TimerEntry::Armed { handle, generation })
        {
            previous.abort();
        }
        debug!("Armed reminder for task {} at {}", task.id, fire_at);
        true
    }

    fn disarm(&self, id: &str) {
        let mut table = lock(&self.timers);
        if matches!(table.get(id), Some(TimerEntry::Armed { .. })) {
            if let Some(TimerEntry::Armed { handle, .. }) = table.remove(id) {
                handle.abort();
            }
        }
    }

    /// Clears any entry for `id`. Safe to call when there is none.
    pub fn cancel(&mut self, id: &str) -> bool {
        match lock(&self.timers).remove(id) {
            Some(TimerEntry::Armed { handle, .. }) => {
                handle.abort();
                true
            }
            Some(TimerEntry::OverdueSentinel) => true,
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, entry) in lock(&self.timers).drain() {
            if let TimerEntry::Armed { handle, .. } = entry {
                handle.abort();
            }
        }
    }

    /// Flags incomplete, past-due tasks that have no timer-table entry yet.
    /// Each task is flagged at most once per session. Returns the flagged ids.
    pub fn check_overdue(&mut self, tasks: &[Task]) -> Vec<String> {
        if !self.active() || !self.interacted {
            return Vec::new();
        }

        let now = Utc::now();
        let mut table = lock(&self.timers);
        let mut flagged = Vec::new();
        for task in tasks.iter().filter(|t| t.is_overdue(now)) {
            if table.contains_key(&task.id) {
                continue;
            }
            table.insert(task.id.clone(), TimerEntry::OverdueSentinel);
            let _ = self.events.send(NotificationEvent::Overdue {
                task_id: task.id.clone(),
                text: task.text.clone(),
                due: task.date,
            });
            flagged.push(task.id.clone());
        }
        flagged
    }

    pub fn notify_completed(&self, task: &Task) {
        if self.active() {
            let _ = self.events.send(NotificationEvent::Completed {
                task_id: task.id.clone(),
                text: task.text.clone(),
            });
        }
    }

    /// Whether a reminder timer (not an overdue sentinel) is armed for `id`.
    pub fn is_armed(&self, id: &str) -> bool {
        matches!(lock(&self.timers).get(id), Some(TimerEntry::Armed { .. }))
    }

    pub fn armed_count(&self) -> usize {
        lock(&self.timers)
            .values()
            .filter(|entry| matches!(entry, TimerEntry::Armed { .. }))
            .count()
    }
}

impl Drop for NotificationScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Recurrence, TaskCategory, TaskPriority};

    fn task_due_in(minutes: i64) -> Task {
        Task {
            id: Task::generate_id(),
            text: format!("due in {minutes} minutes"),
            date: Utc::now() + Duration::minutes(minutes),
            priority: TaskPriority::Medium,
            category: TaskCategory::Work,
            recurrence: Recurrence::None,
            completed: false,
            created_at: Utc::now(),
        }
    }

    async fn enabled_scheduler() -> (NotificationScheduler, mpsc::UnboundedReceiver<NotificationEvent>) {
        let (mut scheduler, rx) = NotificationScheduler::new(NotificationConfig::default());
        scheduler
            .enable(&StaticPermission(Permission::Granted), &[])
            .await;
        (scheduler, rx)
    }

    #[tokio::test]
    async fn schedule_is_a_no_op_while_disabled() {
        let (mut scheduler, _rx) = NotificationScheduler::new(NotificationConfig::default());
        let task = task_due_in(120);
        assert!(!scheduler.schedule(&task));
        assert_eq!(scheduler.armed_count(), 0);
    }

    #[tokio::test]
    async fn denied_permission_keeps_feature_off() {
        let (mut scheduler, _rx) = NotificationScheduler::new(NotificationConfig::default());
        let task = task_due_in(120);
        let answer = scheduler
            .enable(&StaticPermission(Permission::Denied), std::slice::from_ref(&task))
            .await;
        assert_eq!(answer, Permission::Denied);
        assert!(!scheduler.is_enabled());
        assert!(!scheduler.is_armed(&task.id));
    }

    #[tokio::test]
    async fn rescheduling_replaces_the_existing_timer() {
        let (mut scheduler, _rx) = enabled_scheduler().await;
        let task = task_due_in(120);

        assert!(scheduler.schedule(&task));
        assert!(scheduler.schedule(&task));

        assert!(scheduler.is_armed(&task.id));
        assert_eq!(scheduler.armed_count(), 1);
    }

    #[tokio::test]
    async fn reminder_inside_lead_interval_is_skipped() {
        let (mut scheduler, _rx) = enabled_scheduler().await;
        let soon = task_due_in(5);
        assert!(!scheduler.schedule(&soon));
        assert_eq!(scheduler.armed_count(), 0);
    }

    #[tokio::test]
    async fn completed_tasks_are_never_armed() {
        let (mut scheduler, _rx) = enabled_scheduler().await;
        let mut task = task_due_in(120);
        task.completed = true;
        assert!(!scheduler.schedule(&task));
    }

    #[tokio::test(start_paused = true)]
    async fn timer_fires_once_and_clears_its_entry() {
        let (mut scheduler, mut rx) = enabled_scheduler().await;
        let task = task_due_in(30);
        assert!(scheduler.schedule(&task));

        let event = rx.recv().await.expect("reminder event");
        assert!(matches!(event, NotificationEvent::Reminder { ref task_id, .. } if *task_id == task.id));
        tokio::task::yield_now().await;
        assert!(!scheduler.is_armed(&task.id));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_never_fires() {
        let (mut scheduler, mut rx) = enabled_scheduler().await;
        let task = task_due_in(30);
        scheduler.schedule(&task);

        assert!(scheduler.cancel(&task.id));
        assert!(!scheduler.cancel(&task.id));

        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn disabling_cancels_all_timers() {
        let (mut scheduler, _rx) = enabled_scheduler().await;
        scheduler.schedule(&task_due_in(60));
        scheduler.schedule(&task_due_in(90));
        assert_eq!(scheduler.armed_count(), 2);

        scheduler.disable();
        assert_eq!(scheduler.armed_count(), 0);
    }

    #[tokio::test]
    async fn rescheduling_inside_lead_interval_drops_old_timer() {
        let (mut scheduler, _rx) = enabled_scheduler().await;
        let mut task = task_due_in(120);
        assert!(scheduler.schedule(&task));

        task.date = Utc::now() + Duration::minutes(5);
        assert!(!scheduler.schedule(&task));
        assert!(!scheduler.is_armed(&task.id));
    }

    #[tokio::test]
    async fn toggling_notifications_keeps_overdue_sentinels() {
        let (mut scheduler, mut rx) = enabled_scheduler().await;
        scheduler.record_interaction();
        let overdue = task_due_in(-60);
        let tasks = vec![overdue.clone()];

        assert_eq!(scheduler.check_overdue(&tasks), vec![overdue.id.clone()]);

        scheduler.disable();
        scheduler
            .enable(&StaticPermission(Permission::Granted), &tasks)
            .await;

        assert!(scheduler.check_overdue(&tasks).is_empty());
        assert!(matches!(rx.try_recv(), Ok(NotificationEvent::Overdue { .. })));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn overdue_check_requires_interaction_and_fires_once() {
        let (mut scheduler, mut rx) = enabled_scheduler().await;
        let overdue = task_due_in(-10);
        let upcoming = task_due_in(600);
        let tasks = vec![overdue.clone(), upcoming];

        assert!(scheduler.check_overdue(&tasks).is_empty());

        scheduler.record_interaction();
        assert_eq!(scheduler.check_overdue(&tasks), vec![overdue.id.clone()]);
        assert!(scheduler.check_overdue(&tasks).is_empty());

        let event = rx.try_recv().unwrap();
        assert!(matches!(event, NotificationEvent::Overdue { ref task_id, .. } if *task_id == overdue.id));
        assert!(rx.try_recv().is_err());
    }
}
