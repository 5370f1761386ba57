//! Test doubles shared by the repository unit tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use super::TaskRepository;
use crate::error::PersistenceError;
use crate::models::{Recurrence, RepositoryConfig, Task, TaskCategory, TaskPriority, TaskRecord};
use crate::notification::{NotificationConfig, NotificationEvent, NotificationScheduler};
use crate::store::TaskStore;
use crate::sync::SyncTrigger;

/// Insertion-ordered store kept in memory, with a switch that makes every
/// write fail.
#[derive(Default)]
pub(crate) struct MemoryStore {
    records: Mutex<Vec<TaskRecord>>,
    writes: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn with_records(records: Vec<TaskRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn ids(&self) -> Vec<String> {
        self.records.lock().unwrap().iter().map(|r| r.id.clone()).collect()
    }

    fn check_writable(&self) -> Result<(), PersistenceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PersistenceError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "quota exceeded",
            )));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn upsert(&self, record: TaskRecord) {
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn get_all(&self) -> Result<Vec<TaskRecord>, PersistenceError> {
        Ok(self.records.lock().unwrap().clone())
    }

    async fn get(&self, id: &str) -> Result<Option<TaskRecord>, PersistenceError> {
        Ok(self.records.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn put(&self, task: &Task) -> Result<(), PersistenceError> {
        self.put_record(&TaskRecord::from(task)).await
    }

    async fn put_record(&self, record: &TaskRecord) -> Result<(), PersistenceError> {
        self.check_writable()?;
        self.upsert(record.clone());
        Ok(())
    }

    async fn put_all(&self, records: &[TaskRecord]) -> Result<(), PersistenceError> {
        self.check_writable()?;
        for record in records {
            self.upsert(record.clone());
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, PersistenceError> {
        self.check_writable()?;
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() < before)
    }

    async fn clear(&self) -> Result<u64, PersistenceError> {
        self.check_writable()?;
        let mut records = self.records.lock().unwrap();
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }

    async fn schema_version(&self) -> Result<i64, PersistenceError> {
        Ok(crate::db::SCHEMA_VERSION)
    }
}

/// Counts trigger calls.
#[derive(Clone, Default)]
pub(crate) struct CountingTrigger(pub Arc<AtomicUsize>);

impl CountingTrigger {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl SyncTrigger for CountingTrigger {
    fn trigger(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) fn sample_task(text: &str, date: DateTime<Utc>) -> Task {
    Task {
        id: Task::generate_id(),
        text: text.to_string(),
        date,
        priority: TaskPriority::Medium,
        category: TaskCategory::Other,
        recurrence: Recurrence::None,
        completed: false,
        created_at: Utc::now(),
    }
}

pub(crate) async fn repository_with_config(
    records: Vec<TaskRecord>,
    config: RepositoryConfig,
) -> (
    TaskRepository,
    Arc<MemoryStore>,
    CountingTrigger,
    mpsc::UnboundedReceiver<NotificationEvent>,
) {
    let store = Arc::new(MemoryStore::with_records(records));
    let (scheduler, events) = NotificationScheduler::new(NotificationConfig::default());
    let trigger = CountingTrigger::default();
    let repo = TaskRepository::load(store.clone(), scheduler, Box::new(trigger.clone()), config)
        .await
        .unwrap();
    (repo, store, trigger, events)
}

pub(crate) async fn repository_with(
    records: Vec<TaskRecord>,
) -> (
    TaskRepository,
    Arc<MemoryStore>,
    mpsc::UnboundedReceiver<NotificationEvent>,
) {
    let (repo, store, _trigger, events) =
        repository_with_config(records, RepositoryConfig::default()).await;
    (repo, store, events)
}
