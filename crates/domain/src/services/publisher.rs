//! Publication of content versions.
//!
//! Owns the `is_published` transitions, the published-content table and the
//! `content_*`, `page_cache_*` and `api_cache_*` cache keys.

use crate::error::{DomainError, DomainResult};
use crate::models::{AuditAction, ChangeEvent, ChangeEventType, PublishedContent};
use crate::services::audit::{audit_helpers, record_best_effort, AuditLogBuilder};
use crate::services::cache::ConfigurationCache;
use crate::services::notifier::ChangeNotifier;
use crate::store::{AuditSink, ContentVersionStore, PublishedContentStore};
use chrono::Utc;
use metrics::counter;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Cache keys derived from an element's published content.
pub fn content_cache_keys(element_id: &str) -> [String; 3] {
    [
        format!("content_{}", element_id),
        format!("page_cache_{}", element_id),
        format!("api_cache_{}", element_id),
    ]
}

pub struct ContentPublisher {
    versions: Arc<dyn ContentVersionStore>,
    published: Arc<dyn PublishedContentStore>,
    cache: Arc<ConfigurationCache>,
    notifier: Arc<ChangeNotifier>,
    audit: Arc<dyn AuditSink>,
}

impl ContentPublisher {
    pub fn new(
        versions: Arc<dyn ContentVersionStore>,
        published: Arc<dyn PublishedContentStore>,
        cache: Arc<ConfigurationCache>,
        notifier: Arc<ChangeNotifier>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            versions,
            published,
            cache,
            notifier,
            audit,
        }
    }

    pub fn notifier(&self) -> &Arc<ChangeNotifier> {
        &self.notifier
    }

    /// Make `version_id` the single published version of its element.
    pub async fn publish_version(
        &self,
        version_id: Uuid,
        user_id: Option<Uuid>,
    ) -> DomainResult<PublishedContent> {
        let version = self
            .versions
            .find_by_id(version_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Version {} not found", version_id)))?;
        let element_id = version.element_id.clone();
        let previous = self.versions.find_published(&element_id).await?;

        let now = Utc::now();
        let published = self
            .versions
            .mark_published(&element_id, version_id, now)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Version {} not found", version_id)))?;

        let row = PublishedContent::from_version(&published, now, user_id);
        self.published.upsert(&row).await?;
        self.invalidate_caches(&element_id).await;

        self.notifier.broadcast_event(ChangeEvent::new(
            ChangeEventType::ContentPublished,
            &element_id,
            previous.map(|p| json!({"versionId": p.id, "versionNumber": p.version_number})),
            Some(json!({"versionId": published.id, "versionNumber": published.version_number})),
            user_id,
        ));
        record_best_effort(
            self.audit.as_ref(),
            audit_helpers::content_version(
                AuditAction::ContentPublish,
                user_id,
                &element_id,
                published.id,
                published.version_number,
            ),
        )
        .await;

        counter!("content_publications_total").increment(1);
        info!(
            element_id = %element_id,
            version_number = published.version_number,
            "Content version published"
        );
        Ok(row)
    }

    /// Take an element offline. Returns false if nothing was published.
    pub async fn unpublish_content(
        &self,
        element_id: &str,
        user_id: Option<Uuid>,
    ) -> DomainResult<bool> {
        let previous = self.versions.find_published(element_id).await?;
        let cleared = self.versions.clear_published(element_id).await?;
        let removed = self.published.delete(element_id).await?;
        self.invalidate_caches(element_id).await;

        if cleared == 0 && !removed {
            return Ok(false);
        }

        self.notifier.broadcast_event(ChangeEvent::new(
            ChangeEventType::ContentUnpublished,
            element_id,
            previous
                .as_ref()
                .map(|p| json!({"versionId": p.id, "versionNumber": p.version_number})),
            None,
            user_id,
        ));
        record_best_effort(
            self.audit.as_ref(),
            AuditLogBuilder::user_action(user_id, AuditAction::ContentUnpublish)
                .on_resource(element_id)
                .with_details(json!({
                    "versionNumber": previous.map(|p| p.version_number),
                }))
                .build(),
        )
        .await;

        info!(element_id = %element_id, "Content unpublished");
        Ok(true)
    }

    /// Published content, read through the `content_{id}` cache key.
    pub async fn get_published(&self, element_id: &str) -> DomainResult<Option<PublishedContent>> {
        let [content_key, ..] = content_cache_keys(element_id);
        if let Some(cached) = self.cache.get(&content_key).await {
            match serde_json::from_value::<PublishedContent>(cached) {
                Ok(row) => return Ok(Some(row)),
                Err(err) => {
                    warn!(element_id = %element_id, error = %err, "Discarding unreadable published content cache entry");
                    self.cache.invalidate(&content_key).await;
                }
            }
        }

        let Some(row) = self.published.find(element_id).await? else {
            return Ok(None);
        };
        match serde_json::to_value(&row) {
            Ok(value) => self.cache.set(&content_key, value, None).await,
            Err(err) => warn!(element_id = %element_id, error = %err, "Failed to cache published content"),
        }
        Ok(Some(row))
    }

    /// Drop every cache key derived from the element.
    pub async fn invalidate_caches(&self, element_id: &str) {
        for key in content_cache_keys(element_id) {
            self.cache.invalidate(&key).await;
        }
    }

    /// Subscribe to publication events.
    pub fn subscribe<F>(&self, listener_id: impl Into<String>, callback: F, filter_keys: Vec<String>, priority: i32)
    where
        F: Fn(&ChangeEvent) -> Result<(), String> + Send + Sync + 'static,
    {
        self.notifier
            .register_listener(listener_id, callback, filter_keys, priority)
    }
}
