//! Content element management.
//!
//! A façade over [`VersionManager`] and [`ContentPublisher`]: bodies are
//! validated before anything is stored, every edit appends a version, and
//! rollback re-publishes a copy of an older version.

use crate::error::{DomainError, DomainResult};
use crate::models::{
    AuditAction, ContentIssue, ContentState, ContentSummary, ContentType, ContentVersion,
    PublishedContent, VersionSnapshot,
};
use crate::services::audit::{audit_helpers, record_best_effort, AuditLogBuilder};
use crate::services::publisher::ContentPublisher;
use crate::services::versioning::VersionManager;
use crate::store::{AuditSink, ContentVersionStore};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

lazy_static! {
    static ref DISALLOWED_TAG_REGEX: Regex =
        Regex::new(r"(?i)<\s*(script|iframe|object|embed)\b").unwrap();
}

/// Metadata key marking a version created by rollback.
pub const ROLLBACK_FROM_KEY: &str = "rollback_from";

/// Metadata an edit carries over from the latest version, minus the rollback marker.
fn inherited_metadata(metadata: &serde_json::Value) -> serde_json::Value {
    match metadata {
        serde_json::Value::Object(map) => {
            let mut map = map.clone();
            map.remove(ROLLBACK_FROM_KEY);
            serde_json::Value::Object(map)
        }
        other => other.clone(),
    }
}

#[derive(Debug, Clone)]
pub struct ContentOptions {
    pub max_content_bytes: usize,
    pub default_keep_versions: usize,
}

impl Default for ContentOptions {
    fn default() -> Self {
        Self {
            max_content_bytes: 1024 * 1024,
            default_keep_versions: 10,
        }
    }
}

pub struct ContentManager {
    versions: Arc<dyn ContentVersionStore>,
    version_manager: Arc<VersionManager>,
    publisher: Arc<ContentPublisher>,
    audit: Arc<dyn AuditSink>,
    options: ContentOptions,
}

impl ContentManager {
    pub fn new(
        versions: Arc<dyn ContentVersionStore>,
        version_manager: Arc<VersionManager>,
        publisher: Arc<ContentPublisher>,
        audit: Arc<dyn AuditSink>,
        options: ContentOptions,
    ) -> Self {
        Self {
            versions,
            version_manager,
            publisher,
            audit,
            options,
        }
    }

    pub fn version_manager(&self) -> &Arc<VersionManager> {
        &self.version_manager
    }

    pub fn publisher(&self) -> &Arc<ContentPublisher> {
        &self.publisher
    }

    /// Check an element id, body and metadata. All problems are reported together.
    pub fn validate_content(
        &self,
        element_id: &str,
        content: &str,
        content_type: ContentType,
        metadata: Option<&serde_json::Value>,
    ) -> DomainResult<()> {
        let mut issues = Vec::new();

        if let Err(err) = shared::validation::validate_element_id(element_id) {
            issues.push(ContentIssue::new(
                "elementId",
                err.message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid element id".to_string()),
            ));
        }

        if content.len() > self.options.max_content_bytes {
            issues.push(ContentIssue::new(
                "content",
                format!(
                    "Content is {} bytes, exceeding the limit of {} bytes",
                    content.len(),
                    self.options.max_content_bytes
                ),
            ));
        }

        match content_type {
            ContentType::Html | ContentType::Markdown => {
                let mut tags: Vec<String> = DISALLOWED_TAG_REGEX
                    .captures_iter(content)
                    .map(|c| c[1].to_lowercase())
                    .collect();
                tags.sort();
                tags.dedup();
                for tag in tags {
                    issues.push(ContentIssue::new(
                        "content",
                        format!("Disallowed HTML tag <{}>", tag),
                    ));
                }
            }
            ContentType::Json => {
                if let Err(err) = serde_json::from_str::<serde_json::Value>(content) {
                    issues.push(ContentIssue::new("content", format!("Malformed JSON: {}", err)));
                }
            }
            ContentType::Text => {}
        }

        if let Some(metadata) = metadata {
            if !metadata.is_object() {
                issues.push(ContentIssue::new("metadata", "Metadata must be a JSON object"));
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(DomainError::ContentValidation(issues))
        }
    }

    /// Create a new element with version 1 as a draft.
    pub async fn create_content(
        &self,
        element_id: &str,
        content: String,
        content_type: ContentType,
        metadata: Option<serde_json::Value>,
        user_id: Option<Uuid>,
    ) -> DomainResult<ContentVersion> {
        self.validate_content(element_id, &content, content_type, metadata.as_ref())?;
        if self.versions.max_version_number(element_id).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "Content '{}' already exists",
                element_id
            )));
        }

        let version = self
            .version_manager
            .create_version_snapshot(VersionSnapshot {
                element_id: element_id.to_string(),
                content,
                content_type,
                parent_version_id: None,
                change_summary: Some("Initial version".to_string()),
                metadata: metadata.unwrap_or_else(|| json!({})),
                created_by: user_id,
            })
            .await?;

        self.audit_version(AuditAction::ContentCreate, user_id, &version).await;
        info!(element_id = %element_id, content_type = %content_type, "Content created");
        Ok(version)
    }

    /// Append a draft version. The parent is the published version, or the
    /// latest one if nothing is published.
    pub async fn edit_content(
        &self,
        element_id: &str,
        content: String,
        change_summary: Option<String>,
        metadata: Option<serde_json::Value>,
        user_id: Option<Uuid>,
    ) -> DomainResult<ContentVersion> {
        let history = self.versions.list_for_element(element_id).await?;
        let Some(latest) = history.last() else {
            return Err(DomainError::NotFound(format!(
                "Content '{}' not found",
                element_id
            )));
        };
        self.validate_content(element_id, &content, latest.content_type, metadata.as_ref())?;

        let parent = history
            .iter()
            .find(|v| v.is_published)
            .unwrap_or(latest);

        let version = self
            .version_manager
            .create_version_snapshot(VersionSnapshot {
                element_id: element_id.to_string(),
                content,
                content_type: latest.content_type,
                parent_version_id: Some(parent.id),
                change_summary,
                metadata: metadata.unwrap_or_else(|| inherited_metadata(&latest.metadata)),
                created_by: user_id,
            })
            .await?;

        self.audit_version(AuditAction::ContentEdit, user_id, &version).await;
        Ok(version)
    }

    pub async fn publish_version(
        &self,
        version_id: Uuid,
        user_id: Option<Uuid>,
    ) -> DomainResult<PublishedContent> {
        self.publisher.publish_version(version_id, user_id).await
    }

    pub async fn unpublish_content(
        &self,
        element_id: &str,
        user_id: Option<Uuid>,
    ) -> DomainResult<bool> {
        self.publisher.unpublish_content(element_id, user_id).await
    }

    /// Restore an older version as a new, immediately published version.
    pub async fn rollback_content(
        &self,
        element_id: &str,
        target_version: i32,
        user_id: Option<Uuid>,
    ) -> DomainResult<ContentVersion> {
        let target = self
            .version_manager
            .validate_rollback_target(element_id, target_version)
            .await?;
        let current = self.versions.find_published(element_id).await?;

        let mut metadata = match &target.metadata {
            serde_json::Value::Object(map) => map.clone(),
            _ => serde_json::Map::new(),
        };
        metadata.insert(ROLLBACK_FROM_KEY.to_string(), json!(target.version_number));

        let version = self
            .version_manager
            .create_version_snapshot(VersionSnapshot {
                element_id: element_id.to_string(),
                content: target.content.clone(),
                content_type: target.content_type,
                parent_version_id: current.as_ref().map(|c| c.id).or(Some(target.id)),
                change_summary: Some(format!("Rollback to version {}", target.version_number)),
                metadata: serde_json::Value::Object(metadata),
                created_by: user_id,
            })
            .await?;

        self.publisher.publish_version(version.id, user_id).await?;

        record_best_effort(
            self.audit.as_ref(),
            AuditLogBuilder::user_action(user_id, AuditAction::ContentRollback)
                .on_resource(element_id)
                .with_details(json!({
                    "targetVersion": target.version_number,
                    "newVersion": version.version_number,
                }))
                .build(),
        )
        .await;
        info!(
            element_id = %element_id,
            target_version = target.version_number,
            new_version = version.version_number,
            "Content rolled back"
        );

        self.versions
            .find_by_id(version.id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Version {} not found", version.id)))
    }

    /// Published version if any, otherwise the latest version.
    pub async fn get_content(&self, element_id: &str) -> DomainResult<Option<ContentVersion>> {
        if let Some(published) = self.versions.find_published(element_id).await? {
            return Ok(Some(published));
        }
        Ok(self.versions.list_for_element(element_id).await?.pop())
    }

    pub async fn get_published_content(
        &self,
        element_id: &str,
    ) -> DomainResult<Option<PublishedContent>> {
        self.publisher.get_published(element_id).await
    }

    /// All versions, newest first.
    pub async fn get_version_history(&self, element_id: &str) -> DomainResult<Vec<ContentVersion>> {
        self.version_manager.get_version_history(element_id).await
    }

    pub async fn get_content_by_version_id(
        &self,
        version_id: Uuid,
    ) -> DomainResult<Option<ContentVersion>> {
        Ok(self.versions.find_by_id(version_id).await?)
    }

    pub async fn get_content_version(
        &self,
        element_id: &str,
        version_number: i32,
    ) -> DomainResult<Option<ContentVersion>> {
        Ok(self.versions.find_by_number(element_id, version_number).await?)
    }

    /// One summary row per element, ordered by element id.
    pub async fn list_content(&self) -> DomainResult<Vec<ContentSummary>> {
        let mut summaries = Vec::new();
        for element_id in self.versions.list_element_ids().await? {
            let versions = self.versions.list_for_element(&element_id).await?;
            let Some(latest) = versions.last() else {
                continue;
            };
            let published = versions.iter().find(|v| v.is_published);
            let ever_published = versions.iter().any(|v| v.published_at.is_some());
            let state = match published {
                Some(_) => ContentState::Published,
                None if ever_published => ContentState::Unpublished,
                None => ContentState::Draft,
            };
            summaries.push(ContentSummary {
                element_id: element_id.clone(),
                content_type: latest.content_type,
                latest_version: latest.version_number,
                published_version: published.map(|v| v.version_number),
                version_count: versions.len(),
                state,
                updated_at: latest.created_at,
            });
        }
        Ok(summaries)
    }

    /// Remove an element with all its versions. Returns false if it did not exist.
    pub async fn delete_content(&self, element_id: &str, user_id: Option<Uuid>) -> DomainResult<bool> {
        if self.versions.max_version_number(element_id).await?.is_none() {
            return Ok(false);
        }
        self.publisher.unpublish_content(element_id, user_id).await?;
        let deleted = self.versions.delete_element(element_id).await?;

        record_best_effort(
            self.audit.as_ref(),
            AuditLogBuilder::user_action(user_id, AuditAction::ContentDelete)
                .on_resource(element_id)
                .with_details(json!({ "deletedVersions": deleted }))
                .build(),
        )
        .await;
        info!(element_id = %element_id, deleted, "Content deleted");
        Ok(true)
    }

    /// Apply version retention, defaulting to the configured keep count.
    pub async fn cleanup_versions(
        &self,
        element_id: &str,
        keep_count: Option<usize>,
        user_id: Option<Uuid>,
    ) -> DomainResult<u64> {
        let keep = keep_count.unwrap_or(self.options.default_keep_versions);
        let deleted = self
            .version_manager
            .cleanup_old_versions(element_id, keep)
            .await?;
        if deleted > 0 {
            record_best_effort(
                self.audit.as_ref(),
                AuditLogBuilder::user_action(user_id, AuditAction::ContentCleanup)
                    .on_resource(element_id)
                    .with_details(json!({ "keepCount": keep, "deleted": deleted }))
                    .build(),
            )
            .await;
        }
        Ok(deleted)
    }

    async fn audit_version(&self, action: AuditAction, user_id: Option<Uuid>, version: &ContentVersion) {
        record_best_effort(
            self.audit.as_ref(),
            audit_helpers::content_version(
                action,
                user_id,
                &version.element_id,
                version.id,
                version.version_number,
            ),
        )
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChangeEvent;
    use crate::services::cache::ConfigurationCache;
    use crate::services::notifier::ChangeNotifier;
    use crate::store::memory::{
        MemoryAuditSink, MemoryContentVersionStore, MemoryPublishedContentStore,
    };
    use std::sync::Mutex;

    struct Fixture {
        manager: ContentManager,
        cache: Arc<ConfigurationCache>,
        audit: Arc<MemoryAuditSink>,
    }

    fn fixture() -> Fixture {
        let versions: Arc<MemoryContentVersionStore> = Arc::new(MemoryContentVersionStore::new());
        let audit = Arc::new(MemoryAuditSink::new());
        let cache = Arc::new(ConfigurationCache::in_memory());
        let version_manager = Arc::new(VersionManager::new(versions.clone()));
        let publisher = Arc::new(ContentPublisher::new(
            versions.clone(),
            Arc::new(MemoryPublishedContentStore::new()),
            cache.clone(),
            Arc::new(ChangeNotifier::default()),
            audit.clone(),
        ));
        let manager = ContentManager::new(
            versions,
            version_manager,
            publisher,
            audit.clone(),
            ContentOptions {
                max_content_bytes: 64,
                default_keep_versions: 2,
            },
        );
        Fixture {
            manager,
            cache,
            audit,
        }
    }

    async fn create(f: &Fixture, element_id: &str, body: &str) -> ContentVersion {
        f.manager
            .create_content(element_id, body.to_string(), ContentType::Text, None, None)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_publish_earlier_version_scenario() {
        let f = fixture();
        let v1 = create(&f, "hero", "v1").await;
        f.manager
            .edit_content("hero", "v2".to_string(), None, None, None)
            .await
            .unwrap();

        f.manager.publish_version(v1.id, None).await.unwrap();

        let published = f.manager.get_published_content("hero").await.unwrap().unwrap();
        assert_eq!(published.content, "v1");
        assert_eq!(f.manager.get_version_history("hero").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_existing_element_conflicts() {
        let f = fixture();
        create(&f, "hero", "v1").await;
        let err = f
            .manager
            .create_content("hero", "again".to_string(), ContentType::Text, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_edit_parent_is_published_version() {
        let f = fixture();
        let v1 = create(&f, "hero", "v1").await;
        let v2 = f
            .manager
            .edit_content("hero", "v2".to_string(), None, None, None)
            .await
            .unwrap();
        assert_eq!(v2.parent_version_id, Some(v1.id));
        let v3 = f
            .manager
            .edit_content("hero", "v3".to_string(), None, None, None)
            .await
            .unwrap();
        assert_eq!(v3.parent_version_id, Some(v2.id));

        f.manager.publish_version(v1.id, None).await.unwrap();
        let v4 = f
            .manager
            .edit_content("hero", "v4".to_string(), Some("tweak".into()), None, None)
            .await
            .unwrap();
        assert_eq!(v4.parent_version_id, Some(v1.id));
        assert_eq!(v4.version_number, 4);
        assert!(!v4.is_published);
    }

    #[tokio::test]
    async fn test_edit_missing_element() {
        let f = fixture();
        let err = f
            .manager
            .edit_content("ghost", "x".to_string(), None, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_single_published_version() {
        let f = fixture();
        let v1 = create(&f, "hero", "v1").await;
        let v2 = f
            .manager
            .edit_content("hero", "v2".to_string(), None, None, None)
            .await
            .unwrap();
        f.manager.publish_version(v1.id, None).await.unwrap();
        f.manager.publish_version(v2.id, None).await.unwrap();

        let published: Vec<_> = f
            .manager
            .get_version_history("hero")
            .await
            .unwrap()
            .into_iter()
            .filter(|v| v.is_published)
            .collect();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].id, v2.id);
        assert_eq!(f.manager.get_content("hero").await.unwrap().unwrap().content, "v2");
    }

    #[tokio::test]
    async fn test_rollback_copies_body_and_publishes() {
        let f = fixture();
        let body = "line one\n  <b>bold</b>\ttab\n";
        let v1 = create(&f, "hero", body).await;
        f.manager.publish_version(v1.id, None).await.unwrap();
        let v2 = f
            .manager
            .edit_content("hero", "second".to_string(), None, None, None)
            .await
            .unwrap();
        f.manager.publish_version(v2.id, None).await.unwrap();

        let restored = f.manager.rollback_content("hero", 1, None).await.unwrap();
        assert_eq!(restored.version_number, 3);
        assert_eq!(restored.content, body);
        assert!(restored.is_published);
        assert_eq!(restored.metadata["rollback_from"], 1);
        assert_eq!(restored.parent_version_id, Some(v2.id));

        let published = f.manager.get_published_content("hero").await.unwrap().unwrap();
        assert_eq!(published.content, body);
        assert_eq!(published.version_number, 3);
    }

    #[tokio::test]
    async fn test_edit_after_rollback_drops_rollback_marker() {
        let f = fixture();
        let v1 = f
            .manager
            .create_content(
                "hero",
                "v1".to_string(),
                ContentType::Text,
                Some(json!({ "locale": "en" })),
                None,
            )
            .await
            .unwrap();
        f.manager.publish_version(v1.id, None).await.unwrap();
        let v2 = f
            .manager
            .edit_content("hero", "v2".to_string(), None, None, None)
            .await
            .unwrap();
        f.manager.publish_version(v2.id, None).await.unwrap();
        let v3 = f.manager.rollback_content("hero", 1, None).await.unwrap();
        assert_eq!(v3.metadata[ROLLBACK_FROM_KEY], 1);

        let v4 = f
            .manager
            .edit_content("hero", "fresh".to_string(), None, None, None)
            .await
            .unwrap();
        assert!(v4.metadata.get(ROLLBACK_FROM_KEY).is_none());
        assert_eq!(v4.metadata["locale"], "en");
    }

    #[tokio::test]
    async fn test_rollback_rejections() {
        let f = fixture();
        let v1 = create(&f, "hero", "v1").await;
        let err = f.manager.rollback_content("hero", 1, None).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidRollback(_)));

        f.manager.publish_version(v1.id, None).await.unwrap();
        let err = f.manager.rollback_content("hero", 1, None).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidRollback(_)));
        // Nothing was appended.
        assert_eq!(f.manager.get_version_history("hero").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_validation_reports_all_issues() {
        let f = fixture();
        let err = f
            .manager
            .create_content(
                "bad id!",
                "<script>alert(1)</script><IFRAME src=x>".to_string(),
                ContentType::Html,
                Some(json!([1])),
                None,
            )
            .await
            .unwrap_err();
        let DomainError::ContentValidation(issues) = err else {
            panic!("expected content validation error");
        };
        let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["elementId", "content", "content", "metadata"]);
        assert!(issues[1].message.contains("<iframe>"));
        assert!(issues[2].message.contains("<script>"));
        assert!(f.manager.list_content().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validation_size_and_json() {
        let f = fixture();
        let err = f
            .manager
            .create_content("big", "x".repeat(65), ContentType::Text, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ContentValidation(ref i) if i[0].message.contains("exceeding")));

        let err = f
            .manager
            .create_content("cfg", "{not json".to_string(), ContentType::Json, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ContentValidation(ref i) if i[0].message.contains("Malformed JSON")));

        assert!(f
            .manager
            .create_content("cfg", r#"{"ok":true}"#.to_string(), ContentType::Json, None, None)
            .await
            .is_ok());
        // Plain text may mention tags freely.
        assert!(f
            .manager
            .create_content("note", "<script>".to_string(), ContentType::Text, None, None)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_publish_invalidates_caches_and_notifies() {
        let f = fixture();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        f.manager.publisher().subscribe(
            "storefront",
            move |event: &ChangeEvent| {
                sink.lock().unwrap().push(event.clone());
                Ok(())
            },
            vec!["hero".to_string()],
            0,
        );

        let v1 = create(&f, "hero", "v1").await;
        f.manager.publish_version(v1.id, None).await.unwrap();
        // Warm the published cache, then seed derived page caches.
        f.manager.get_published_content("hero").await.unwrap();
        assert!(f.cache.contains_in_memory("content_hero"));
        f.cache.set("page_cache_hero", json!("<html>"), None).await;
        f.cache.set("api_cache_hero", json!({}), None).await;

        let v2 = f
            .manager
            .edit_content("hero", "v2".to_string(), None, None, None)
            .await
            .unwrap();
        f.manager.publish_version(v2.id, None).await.unwrap();

        assert!(!f.cache.contains_in_memory("content_hero"));
        assert!(!f.cache.contains_in_memory("page_cache_hero"));
        assert!(!f.cache.contains_in_memory("api_cache_hero"));
        assert_eq!(
            f.manager.get_published_content("hero").await.unwrap().unwrap().content,
            "v2"
        );

        f.manager.unpublish_content("hero", None).await.unwrap();
        let events = events.lock().unwrap();
        let types: Vec<_> = events.iter().map(|e| e.event_type).collect();
        assert_eq!(
            types,
            vec![
                crate::models::ChangeEventType::ContentPublished,
                crate::models::ChangeEventType::ContentPublished,
                crate::models::ChangeEventType::ContentUnpublished,
            ]
        );
        assert_eq!(events[1].old_value.as_ref().unwrap()["versionNumber"], 1);
        assert_eq!(events[1].new_value.as_ref().unwrap()["versionNumber"], 2);
    }

    #[tokio::test]
    async fn test_unpublish() {
        let f = fixture();
        let v1 = create(&f, "hero", "v1").await;
        assert!(!f.manager.unpublish_content("hero", None).await.unwrap());
        f.manager.publish_version(v1.id, None).await.unwrap();
        assert!(f.manager.unpublish_content("hero", None).await.unwrap());

        assert!(f.manager.get_published_content("hero").await.unwrap().is_none());
        let summary = &f.manager.list_content().await.unwrap()[0];
        assert_eq!(summary.state, ContentState::Unpublished);
        assert!(summary.published_version.is_none());
        // The latest version is still readable.
        assert_eq!(f.manager.get_content("hero").await.unwrap().unwrap().content, "v1");
    }

    #[tokio::test]
    async fn test_list_content_states() {
        let f = fixture();
        create(&f, "draft", "d").await;
        let live = create(&f, "live", "l").await;
        f.manager.publish_version(live.id, None).await.unwrap();

        let summaries = f.manager.list_content().await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].element_id, "draft");
        assert_eq!(summaries[0].state, ContentState::Draft);
        assert_eq!(summaries[1].state, ContentState::Published);
        assert_eq!(summaries[1].published_version, Some(1));
        assert_eq!(summaries[1].version_count, 1);
    }

    #[tokio::test]
    async fn test_lookup_by_id_and_number() {
        let f = fixture();
        let v1 = create(&f, "hero", "v1").await;
        assert_eq!(
            f.manager.get_content_by_version_id(v1.id).await.unwrap().unwrap().content,
            "v1"
        );
        assert!(f.manager.get_content_version("hero", 1).await.unwrap().is_some());
        assert!(f.manager.get_content_version("hero", 2).await.unwrap().is_none());
        assert!(f
            .manager
            .get_content_by_version_id(Uuid::new_v4())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_and_cleanup() {
        let f = fixture();
        create(&f, "hero", "v1").await;
        for body in ["v2", "v3", "v4"] {
            f.manager
                .edit_content("hero", body.to_string(), None, None, None)
                .await
                .unwrap();
        }
        assert_eq!(f.manager.cleanup_versions("hero", None, None).await.unwrap(), 2);
        assert_eq!(f.manager.get_version_history("hero").await.unwrap().len(), 2);

        assert!(f.manager.delete_content("hero", None).await.unwrap());
        assert!(!f.manager.delete_content("hero", None).await.unwrap());
        assert!(f.manager.get_content("hero").await.unwrap().is_none());

        let actions: Vec<String> = f.audit.entries().into_iter().map(|e| e.action).collect();
        assert!(actions.contains(&"content.cleanup".to_string()));
        assert!(actions.contains(&"content.delete".to_string()));
    }
}
