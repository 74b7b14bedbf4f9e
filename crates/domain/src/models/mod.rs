//! Domain models for the marketplace admin backend.

pub mod audit_log;
pub mod cache;
pub mod change_event;
pub mod content;
pub mod media;
pub mod setting;

pub use audit_log::{AuditAction, AuditEntry, CreateAuditEntry, FieldChange, ResourceType};
pub use cache::{CacheEntry, CacheStats};
pub use change_event::{
    ChangeEvent, ChangeEventType, ListenerInfo, SettingChangeRecord, SettingChangeType,
};
pub use content::{
    ContentIssue, ContentState, ContentSummary, ContentType, ContentVersion, PublishedContent,
    VersionDiff, VersionNode, VersionSnapshot,
};
pub use media::{Dimensions, MediaAsset, MediaFileType, MediaVariant, UploadMedia, VariantStatus};
pub use setting::{
    BulkUpdateOutcome, NewSetting, Setting, SettingCategory, SettingValue, ValidationResult, ValidationRule,
    ValidationRules, ValueKind,
};
