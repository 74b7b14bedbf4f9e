//! Persistent tier of the configuration cache.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::error::StoreResult;
use domain::models::CacheEntry;
use domain::store::CacheStore;
use sqlx::PgPool;

use super::store_error;
use crate::entities::CacheEntryEntity;
use crate::metrics::QueryTimer;

/// Repository for the config_cache_entries table.
#[derive(Clone)]
pub struct CacheRepository {
    pool: PgPool,
}

impl CacheRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CacheStore for CacheRepository {
    async fn get(&self, key: &str) -> StoreResult<Option<CacheEntry>> {
        let timer = QueryTimer::new("get_cache_entry");
        let result = sqlx::query_as::<_, CacheEntryEntity>(
            r#"
            SELECT key, value, created_at, expires_at, hit_count, last_accessed
            FROM config_cache_entries
            WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(store_error)?.map(CacheEntry::from))
    }

    async fn put(&self, entry: &CacheEntry) -> StoreResult<()> {
        let timer = QueryTimer::new("put_cache_entry");
        let result = sqlx::query(
            r#"
            INSERT INTO config_cache_entries (key, value, created_at, expires_at, hit_count, last_accessed)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (key)
            DO UPDATE SET value = $2, created_at = $3, expires_at = $4,
                          hit_count = $5, last_accessed = $6
            "#,
        )
        .bind(&entry.key)
        .bind(&entry.value)
        .bind(entry.created_at)
        .bind(entry.expires_at)
        .bind(entry.hit_count)
        .bind(entry.last_accessed)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map_err(store_error)?;
        Ok(())
    }

    async fn record_hit(&self, key: &str, at: DateTime<Utc>) -> StoreResult<()> {
        let timer = QueryTimer::new("record_cache_hit");
        let result = sqlx::query(
            r#"
            UPDATE config_cache_entries
            SET hit_count = hit_count + 1, last_accessed = $2
            WHERE key = $1
            "#,
        )
        .bind(key)
        .bind(at)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map_err(store_error)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let timer = QueryTimer::new("delete_cache_entry");
        let result = sqlx::query("DELETE FROM config_cache_entries WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result.map_err(store_error)?.rows_affected() > 0)
    }

    // Uses the PostgreSQL POSIX `~` operator; simple patterns behave the same
    // as in the memory tier.
    async fn delete_matching(&self, pattern: &str) -> StoreResult<u64> {
        let timer = QueryTimer::new("delete_matching_cache_entries");
        let result = sqlx::query("DELETE FROM config_cache_entries WHERE key ~ $1")
            .bind(pattern)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result.map_err(store_error)?.rows_affected())
    }

    async fn clear(&self) -> StoreResult<u64> {
        let timer = QueryTimer::new("clear_cache_entries");
        let result = sqlx::query("DELETE FROM config_cache_entries")
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result.map_err(store_error)?.rows_affected())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let timer = QueryTimer::new("delete_expired_cache_entries");
        let result = sqlx::query("DELETE FROM config_cache_entries WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result.map_err(store_error)?.rows_affected())
    }
}
