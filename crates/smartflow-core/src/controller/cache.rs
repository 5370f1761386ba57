//! Named asset caches persisted next to the task table, so cached assets
//! outlive the process.

use chrono::Utc;
use sqlx::FromRow;

use super::fetch::CachedResponse;
use crate::db::DbPool;
use crate::error::PersistenceError;
use crate::models::format_canonical;

#[derive(Debug, FromRow)]
struct CacheRow {
    url: String,
    status: i64,
    content_type: Option<String>,
    body: Vec<u8>,
}

impl From<CacheRow> for CachedResponse {
    fn from(row: CacheRow) -> Self {
        Self {
            url: row.url,
            status: row.status as u16,
            content_type: row.content_type,
            body: row.body,
        }
    }
}

#[derive(Clone)]
pub struct CacheStorage {
    pool: DbPool,
}

impl CacheStorage {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Creates the named cache if it does not exist yet.
    pub async fn open(&self, name: &str) -> Result<(), PersistenceError> {
        sqlx::query("INSERT OR IGNORE INTO caches (name, created_at) VALUES ($1, $2)")
            .bind(name)
            .bind(format_canonical(&Utc::now()))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn keys(&self) -> Result<Vec<String>, PersistenceError> {
        let names = sqlx::query_scalar("SELECT name FROM caches ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(names)
    }

    /// Removes a cache and everything in it.
    pub async fn delete(&self, name: &str) -> Result<bool, PersistenceError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM asset_cache WHERE cache_name = $1")
            .bind(name)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM caches WHERE name = $1")
            .bind(name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn match_url(
        &self,
        name: &str,
        url: &str,
    ) -> Result<Option<CachedResponse>, PersistenceError> {
        let row: Option<CacheRow> = sqlx::query_as(
            "SELECT url, status, content_type, body FROM asset_cache WHERE cache_name = $1 AND url = $2",
        )
        .bind(name)
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(CachedResponse::from))
    }

    pub async fn put(&self, name: &str, response: &CachedResponse) -> Result<(), PersistenceError> {
        self.put_all(name, std::slice::from_ref(response)).await
    }

    /// Stores every response or none of them.
    pub async fn put_all(
        &self,
        name: &str,
        responses: &[CachedResponse],
    ) -> Result<(), PersistenceError> {
        let stored_at = format_canonical(&Utc::now());
        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT OR IGNORE INTO caches (name, created_at) VALUES ($1, $2)")
            .bind(name)
            .bind(&stored_at)
            .execute(&mut *tx)
            .await?;
        for response in responses {
            sqlx::query(
                r#"INSERT INTO asset_cache (cache_name, url, status, content_type, body, stored_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT(cache_name, url) DO UPDATE SET
                    status = excluded.status,
                    content_type = excluded.content_type,
                    body = excluded.body,
                    stored_at = excluded.stored_at
                "#,
            )
            .bind(name)
            .bind(&response.url)
            .bind(response.status as i64)
            .bind(&response.content_type)
            .bind(&response.body)
            .bind(&stored_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
