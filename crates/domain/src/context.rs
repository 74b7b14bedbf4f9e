//! Component wiring.
//!
//! [`AdminContext`] owns every service for the lifetime of the process and is
//! shared with the HTTP layer behind an `Arc`.

use crate::services::{
    CacheOptions, ChangeNotifier, ConfigurationCache, ConfigurationManager, ConfigurationOptions,
    ContentManager, ContentOptions, ContentPublisher, MediaOptions, MediaProcessor,
    NotifierOptions, SettingsValidator, VersionManager,
};
use crate::store::memory::{
    MemoryAuditSink, MemoryContentVersionStore, MemoryMediaStorage, MemoryMediaStore,
    MemoryPublishedContentStore, MemorySettingChangeStore, MemorySettingStore,
};
use crate::store::{
    AuditSink, CacheStore, ContentVersionStore, MediaStorage, MediaStore, PublishedContentStore,
    SettingChangeStore, SettingStore,
};
use crate::error::DomainResult;
use crate::models::AuditAction;
use crate::services::{record_best_effort, AuditLogBuilder};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// The persistence backends a context is built on.
#[derive(Clone)]
pub struct Stores {
    pub settings: Arc<dyn SettingStore>,
    pub setting_changes: Arc<dyn SettingChangeStore>,
    /// Persistent cache tier. `None` keeps the cache memory-only.
    pub cache: Option<Arc<dyn CacheStore>>,
    pub content_versions: Arc<dyn ContentVersionStore>,
    pub published_content: Arc<dyn PublishedContentStore>,
    pub media: Arc<dyn MediaStore>,
    pub media_storage: Arc<dyn MediaStorage>,
    pub audit: Arc<dyn AuditSink>,
}

impl Stores {
    /// Process-local stores, used by tests and `memory://` deployments.
    pub fn in_memory() -> Self {
        Self {
            settings: Arc::new(MemorySettingStore::new()),
            setting_changes: Arc::new(MemorySettingChangeStore::new()),
            cache: None,
            content_versions: Arc::new(MemoryContentVersionStore::new()),
            published_content: Arc::new(MemoryPublishedContentStore::new()),
            media: Arc::new(MemoryMediaStore::new()),
            media_storage: Arc::new(MemoryMediaStorage::new()),
            audit: Arc::new(MemoryAuditSink::new()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdminOptions {
    pub cache: CacheOptions,
    pub notifier: NotifierOptions,
    pub configuration: ConfigurationOptions,
    pub content: ContentOptions,
    pub media: MediaOptions,
}

pub struct AdminContext {
    pub configuration: Arc<ConfigurationManager>,
    pub content: Arc<ContentManager>,
    pub media: Arc<MediaProcessor>,
    pub cache: Arc<ConfigurationCache>,
    pub options: AdminOptions,
    audit: Arc<dyn AuditSink>,
}

impl AdminContext {
    pub fn new(stores: Stores, validator: SettingsValidator, options: AdminOptions) -> Self {
        let cache = Arc::new(ConfigurationCache::new(
            stores.cache.clone(),
            options.cache.clone(),
        ));

        let configuration = Arc::new(ConfigurationManager::new(
            stores.settings.clone(),
            stores.setting_changes.clone(),
            stores.audit.clone(),
            Arc::new(validator),
            cache.clone(),
            Arc::new(ChangeNotifier::new(options.notifier.clone())),
            options.configuration.clone(),
        ));

        // Publication events go to their own registry so content listeners
        // never see setting keys.
        let publisher = Arc::new(ContentPublisher::new(
            stores.content_versions.clone(),
            stores.published_content.clone(),
            cache.clone(),
            Arc::new(ChangeNotifier::new(options.notifier.clone())),
            stores.audit.clone(),
        ));
        let content = Arc::new(ContentManager::new(
            stores.content_versions.clone(),
            Arc::new(VersionManager::new(stores.content_versions.clone())),
            publisher,
            stores.audit.clone(),
            options.content.clone(),
        ));

        let media = Arc::new(MediaProcessor::new(
            stores.media,
            stores.media_storage,
            stores.audit.clone(),
            options.media.clone(),
        ));

        Self {
            configuration,
            content,
            media,
            cache,
            options,
            audit: stores.audit,
        }
    }

    /// Context over in-memory stores with default options.
    pub fn in_memory() -> Self {
        Self::new(
            Stores::in_memory(),
            SettingsValidator::new(),
            AdminOptions::default(),
        )
    }

    /// Drop one cache key on behalf of an administrator.
    pub async fn invalidate_cache_key(&self, key: &str, user_id: Option<Uuid>) -> usize {
        let removed = usize::from(self.cache.invalidate(key).await);
        self.audit_cache(
            AuditLogBuilder::user_action(user_id, AuditAction::CacheInvalidate)
                .on_resource(key)
                .with_details(json!({ "key": key, "removed": removed })),
        )
        .await;
        removed
    }

    /// Drop every cache key matching `pattern`. A malformed pattern is
    /// audited as a failed attempt before the error is returned.
    pub async fn invalidate_cache_pattern(
        &self,
        pattern: &str,
        user_id: Option<Uuid>,
    ) -> DomainResult<usize> {
        let builder = AuditLogBuilder::user_action(user_id, AuditAction::CacheInvalidate);
        match self.cache.invalidate_pattern(pattern).await {
            Ok(removed) => {
                self.audit_cache(
                    builder.with_details(json!({ "pattern": pattern, "removed": removed })),
                )
                .await;
                Ok(removed)
            }
            Err(err) => {
                self.audit_cache(
                    builder
                        .with_details(json!({ "pattern": pattern, "error": err.to_string() }))
                        .failed(),
                )
                .await;
                Err(err)
            }
        }
    }

    pub async fn clear_cache(&self, user_id: Option<Uuid>) {
        let entries = self.cache.stats().memory_entries;
        self.cache.clear().await;
        self.audit_cache(
            AuditLogBuilder::user_action(user_id, AuditAction::CacheClear)
                .with_details(json!({ "entries": entries })),
        )
        .await;
        info!(entries, "Configuration cache cleared");
    }

    /// Sweep expired entries on request. The scheduled sweep calls the
    /// cache directly and is not audited.
    pub async fn cleanup_cache(&self, user_id: Option<Uuid>) -> usize {
        let removed = self.cache.cleanup_expired().await;
        self.audit_cache(
            AuditLogBuilder::user_action(user_id, AuditAction::CacheCleanup)
                .with_details(json!({ "removed": removed })),
        )
        .await;
        removed
    }

    async fn audit_cache(&self, builder: AuditLogBuilder) {
        record_best_effort(self.audit.as_ref(), builder.build()).await;
    }

    /// Drop all listeners and in-process history.
    pub fn shutdown(&self) {
        self.configuration.notifier().clear();
        self.content.publisher().notifier().clear();
        info!("Admin context shut down");
    }
}
