//! Durable task store.
//!
//! Records are keyed by task id. Every operation runs in its own transaction
//! so a failure never leaves a partial write behind.

use async_trait::async_trait;

use crate::db::{self, DbPool};
use crate::error::PersistenceError;
use crate::models::{Task, TaskRecord};

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All records in insertion order. Dates are returned as stored, so a
    /// legacy record still carries its display string.
    async fn get_all(&self) -> Result<Vec<TaskRecord>, PersistenceError>;
    async fn get(&self, id: &str) -> Result<Option<TaskRecord>, PersistenceError>;
    async fn put(&self, task: &Task) -> Result<(), PersistenceError>;
    async fn put_record(&self, record: &TaskRecord) -> Result<(), PersistenceError>;
    /// Writes every record in one transaction.
    async fn put_all(&self, records: &[TaskRecord]) -> Result<(), PersistenceError>;
    /// Returns whether a record was removed.
    async fn delete(&self, id: &str) -> Result<bool, PersistenceError>;
    /// Returns the number of removed records.
    async fn clear(&self) -> Result<u64, PersistenceError>;
    async fn schema_version(&self) -> Result<i64, PersistenceError>;
}

pub struct SqliteTaskStore {
    pool: DbPool,
}

impl SqliteTaskStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Opens the database at `db_path`, creating the file and any missing
    /// tables.
    pub async fn open_or_create(db_path: &str) -> Result<Self, PersistenceError> {
        let pool = db::establish_connection(db_path).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn upsert<'e, E>(executor: E, record: &TaskRecord) -> Result<(), PersistenceError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query(
            r#"INSERT INTO tasks (id, text, date, priority, category, recurrence, completed, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT(id) DO UPDATE SET
                text = excluded.text,
                date = excluded.date,
                priority = excluded.priority,
                category = excluded.category,
                recurrence = excluded.recurrence,
                completed = excluded.completed,
                created_at = excluded.created_at
            "#,
        )
        .bind(&record.id)
        .bind(&record.text)
        .bind(&record.date)
        .bind(record.priority)
        .bind(record.category)
        .bind(record.recurrence)
        .bind(record.completed)
        .bind(&record.created_at)
        .execute(executor)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn get_all(&self) -> Result<Vec<TaskRecord>, PersistenceError> {
        let mut tx = self.pool.begin().await?;
        let records = sqlx::query_as("SELECT * FROM tasks ORDER BY rowid")
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(records)
    }

    async fn get(&self, id: &str) -> Result<Option<TaskRecord>, PersistenceError> {
        let record = sqlx::query_as("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn put(&self, task: &Task) -> Result<(), PersistenceError> {
        self.put_record(&TaskRecord::from(task)).await
    }

    async fn put_record(&self, record: &TaskRecord) -> Result<(), PersistenceError> {
        let mut tx = self.pool.begin().await?;
        Self::upsert(&mut *tx, record).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn put_all(&self, records: &[TaskRecord]) -> Result<(), PersistenceError> {
        let mut tx = self.pool.begin().await?;
        for record in records {
            Self::upsert(&mut *tx, record).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, PersistenceError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self) -> Result<u64, PersistenceError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM tasks").execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }

    async fn schema_version(&self) -> Result<i64, PersistenceError> {
        db::schema_version(&self.pool).await
    }
}
