//! Repository implementations for database operations.
//!
//! Each repository implements one of the domain store traits on PostgreSQL.

pub mod audit_log;
pub mod cache;
pub mod content;
pub mod media;
pub mod setting;

pub use audit_log::AuditLogRepository;
pub use cache::CacheRepository;
pub use content::{ContentVersionRepository, PublishedContentRepository};
pub use media::MediaRepository;
pub use setting::{SettingChangeRepository, SettingRepository};

use domain::StoreError;

/// Map a sqlx error onto the domain store error.
pub(crate) fn store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        // PostgreSQL error code 23505 = unique_violation
        if db_err.code().as_deref() == Some("23505") {
            return StoreError::Conflict(db_err.message().to_string());
        }
    }
    StoreError::Backend(err.to_string())
}
