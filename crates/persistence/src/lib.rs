//! Persistence layer for the marketplace admin backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - PostgreSQL implementations of the domain store traits
//! - Filesystem media storage

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
pub mod storage;

use domain::Stores;
use sqlx::PgPool;
use std::path::PathBuf;
use std::sync::Arc;

use repositories::{
    AuditLogRepository, CacheRepository, ContentVersionRepository, MediaRepository,
    PublishedContentRepository, SettingChangeRepository, SettingRepository,
};
use storage::FsMediaStorage;

/// Build the store bundle for a PostgreSQL deployment.
pub fn pg_stores(pool: PgPool, upload_dir: impl Into<PathBuf>) -> Stores {
    Stores {
        settings: Arc::new(SettingRepository::new(pool.clone())),
        setting_changes: Arc::new(SettingChangeRepository::new(pool.clone())),
        cache: Some(Arc::new(CacheRepository::new(pool.clone()))),
        content_versions: Arc::new(ContentVersionRepository::new(pool.clone())),
        published_content: Arc::new(PublishedContentRepository::new(pool.clone())),
        media: Arc::new(MediaRepository::new(pool.clone())),
        media_storage: Arc::new(FsMediaStorage::new(upload_dir)),
        audit: Arc::new(AuditLogRepository::new(pool)),
    }
}
