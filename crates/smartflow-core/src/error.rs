use thiserror::Error;

/// Failures of the durable store. Reported to the caller, which decides
/// whether the user sees them.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt task record '{id}': {reason}")]
    CorruptRecord { id: String, reason: String },
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid task: {0}")]
    Validation(String),

    #[error("Task limit reached ({0} tasks)")]
    Capacity(usize),

    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Could not save tasks")]
    Persistence(#[from] PersistenceError),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        CoreError::Persistence(PersistenceError::Database(err))
    }
}

/// Errors returned by the cache/update controller's fetch path.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Offline and not cached: {0}")]
    Offline(String),

    #[error("Cache storage error")]
    Storage(#[from] PersistenceError),

    #[error("Controller is not running")]
    ControllerStopped,
}
