//! # SmartFlow Core Library
//!
//! Offline-first task management: an in-memory task collection written
//! through to SQLite, upgraded from legacy date strings on load, with
//! reminder timers and a background controller that caches app assets and
//! relays sync results back to every open page.
//!
//! ## Core Modules
//!
//! - [`repository`]: The task collection and every operation that mutates it
//! - [`store`]: Durable task store keyed by task id
//! - [`migration`]: Legacy date normalisation run on load
//! - [`notification`]: Reminder timers and overdue detection
//! - [`controller`]: Cache/update controller running as its own task
//! - [`sync`]: Best-effort background sync requests
//! - [`recurrence`]: Successor dates for recurring tasks
//! - [`export`]: Text and JSON renderings of the list
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use smartflow_core::{
//!     models::{NewTaskData, RepositoryConfig},
//!     notification::{NotificationConfig, NotificationScheduler},
//!     repository::TaskRepository,
//!     store::SqliteTaskStore,
//!     sync::NoopSyncTrigger,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(SqliteTaskStore::open_or_create("tasks.db").await?);
//!     let (scheduler, _events) = NotificationScheduler::new(NotificationConfig::default());
//!     let mut repo = TaskRepository::load(
//!         store,
//!         scheduler,
//!         Box::new(NoopSyncTrigger),
//!         RepositoryConfig::default(),
//!     )
//!     .await?;
//!
//!     repo.add(NewTaskData {
//!         text: "Call the plumber".to_string(),
//!         date: Some(chrono::Utc::now() + chrono::Duration::days(1)),
//!         ..Default::default()
//!     })
//!     .await?;
//!     Ok(())
//! }
//! ```

pub mod controller;
pub mod db;
pub mod error;
pub mod export;
pub mod migration;
pub mod models;
pub mod notification;
pub mod priority;
pub mod recurrence;
pub mod repository;
pub mod store;
pub mod sync;
pub mod timezone;
