//! Persistence seams used by the domain services.
//!
//! Every component talks to storage through these traits. The `persistence`
//! crate implements them on PostgreSQL; [`memory`] implements them in-process
//! for tests and `memory://` deployments.

use crate::error::StoreResult;
use crate::models::{
    AuditEntry, CacheEntry, ContentVersion, MediaAsset, MediaFileType, PublishedContent, Setting,
    SettingCategory, SettingChangeRecord, SettingValue,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod memory;

/// Canonical key/value store for settings.
#[async_trait]
pub trait SettingStore: Send + Sync {
    async fn find_by_key(&self, key: &str) -> StoreResult<Option<Setting>>;

    /// Settings ordered by key, optionally restricted to one category.
    async fn list(&self, category: Option<SettingCategory>) -> StoreResult<Vec<Setting>>;

    /// Insert a new setting. A duplicate key is a [`StoreError::Conflict`](crate::StoreError::Conflict).
    async fn insert(&self, setting: &Setting) -> StoreResult<()>;

    /// Replace the value of an existing setting, returning the updated record.
    async fn update_value(
        &self,
        key: &str,
        value: &SettingValue,
        updated_by: Option<Uuid>,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<Setting>>;

    async fn delete(&self, key: &str) -> StoreResult<bool>;
}

/// Durable append-only log of setting changes.
#[async_trait]
pub trait SettingChangeStore: Send + Sync {
    async fn record(&self, record: &SettingChangeRecord) -> StoreResult<()>;

    /// Newest first, with the total count for the key.
    async fn list_for_key(
        &self,
        key: &str,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<SettingChangeRecord>, i64)>;
}

/// Persistent tier of the configuration cache.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<CacheEntry>>;
    async fn put(&self, entry: &CacheEntry) -> StoreResult<()>;
    /// Increment the stored hit counter and touch `last_accessed`.
    async fn record_hit(&self, key: &str, at: DateTime<Utc>) -> StoreResult<()>;
    async fn delete(&self, key: &str) -> StoreResult<bool>;
    /// Delete every entry whose key matches the regular expression.
    async fn delete_matching(&self, pattern: &str) -> StoreResult<u64>;
    async fn clear(&self) -> StoreResult<u64>;
    async fn delete_expired(&self, now: DateTime<Utc>) -> StoreResult<u64>;
}

/// Append-only version chains of content elements.
#[async_trait]
pub trait ContentVersionStore: Send + Sync {
    /// Insert a version. A duplicate `(element_id, version_number)` is a conflict.
    async fn insert(&self, version: &ContentVersion) -> StoreResult<()>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<ContentVersion>>;
    async fn find_by_number(
        &self,
        element_id: &str,
        version_number: i32,
    ) -> StoreResult<Option<ContentVersion>>;
    /// All versions of an element, ascending by version number.
    async fn list_for_element(&self, element_id: &str) -> StoreResult<Vec<ContentVersion>>;
    async fn max_version_number(&self, element_id: &str) -> StoreResult<Option<i32>>;
    async fn find_published(&self, element_id: &str) -> StoreResult<Option<ContentVersion>>;
    /// Atomically clear the published flag on every other version of the
    /// element and set it on `version_id`.
    async fn mark_published(
        &self,
        element_id: &str,
        version_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<ContentVersion>>;
    /// Clear the published flag on every version of the element. `published_at`
    /// is kept so an unpublished element can be told apart from a draft.
    async fn clear_published(&self, element_id: &str) -> StoreResult<u64>;
    async fn delete_versions(&self, ids: &[Uuid]) -> StoreResult<u64>;
    async fn delete_element(&self, element_id: &str) -> StoreResult<u64>;
    async fn list_element_ids(&self) -> StoreResult<Vec<String>>;
}

/// Denormalized table of live content.
#[async_trait]
pub trait PublishedContentStore: Send + Sync {
    async fn upsert(&self, row: &PublishedContent) -> StoreResult<()>;
    async fn find(&self, element_id: &str) -> StoreResult<Option<PublishedContent>>;
    async fn delete(&self, element_id: &str) -> StoreResult<bool>;
}

/// Media asset metadata.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn insert(&self, asset: &MediaAsset) -> StoreResult<()>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<MediaAsset>>;
    /// Newest first.
    async fn list(&self, file_type: Option<MediaFileType>) -> StoreResult<Vec<MediaAsset>>;
    async fn update(&self, asset: &MediaAsset) -> StoreResult<()>;
    async fn increment_usage(&self, id: Uuid) -> StoreResult<Option<i64>>;
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

/// Binary storage for media files, addressed by relative path.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    async fn write(&self, path: &str, bytes: &[u8]) -> StoreResult<()>;
    async fn read(&self, path: &str) -> StoreResult<Vec<u8>>;
    /// Returns false when the file did not exist.
    async fn delete(&self, path: &str) -> StoreResult<bool>;
}

/// Destination for audit log entries.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: &AuditEntry) -> StoreResult<()>;
}
