//! Persistent cache entry entity.

use chrono::{DateTime, Utc};
use domain::models::CacheEntry;
use sqlx::FromRow;

/// Database row mapping for the config_cache_entries table.
#[derive(Debug, Clone, FromRow)]
pub struct CacheEntryEntity {
    pub key: String,
    pub value: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub hit_count: i64,
    pub last_accessed: DateTime<Utc>,
}

impl From<CacheEntryEntity> for CacheEntry {
    fn from(entity: CacheEntryEntity) -> Self {
        CacheEntry {
            key: entity.key,
            value: entity.value,
            created_at: entity.created_at,
            expires_at: entity.expires_at,
            hit_count: entity.hit_count,
            last_accessed: entity.last_accessed,
        }
    }
}
