//! Configuration manager.
//!
//! Owns the canonical setting store and the `setting:*` cache keys. Every
//! write is validated first, then persisted, cached and broadcast. The
//! durable change log and the audit trail are written last on a best-effort
//! basis.

use crate::error::{DomainError, DomainResult};
use crate::models::{
    AuditAction, BulkUpdateOutcome, ChangeEvent, ChangeEventType, NewSetting, Setting,
    SettingCategory, SettingChangeRecord, SettingValue, ValidationResult,
};
use crate::services::audit::{audit_helpers, record_best_effort, AuditLogBuilder};
use crate::services::cache::ConfigurationCache;
use crate::services::notifier::{ChangeNotifier, ListenerCallback};
use crate::services::validator::{json_equal, SettingsValidator};
use crate::store::{AuditSink, SettingChangeStore, SettingStore};
use crate::sync::lock;
use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use serde_json::json;
use shared::pagination::{Page, PageRequest};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

/// Cache key for a setting.
pub fn setting_cache_key(key: &str) -> String {
    format!("setting:{}", key)
}

#[derive(Debug, Clone)]
pub struct ConfigurationOptions {
    /// How long cached reads are trusted after the last store read.
    pub freshness_window: Duration,
    pub history_limit: usize,
}

impl Default for ConfigurationOptions {
    fn default() -> Self {
        Self {
            freshness_window: Duration::minutes(5),
            history_limit: 1000,
        }
    }
}

pub struct ConfigurationManager {
    settings: Arc<dyn SettingStore>,
    changes: Arc<dyn SettingChangeStore>,
    audit: Arc<dyn AuditSink>,
    validator: Arc<SettingsValidator>,
    cache: Arc<ConfigurationCache>,
    notifier: Arc<ChangeNotifier>,
    history: Mutex<VecDeque<ChangeEvent>>,
    cache_loaded_at: Mutex<Option<DateTime<Utc>>>,
    options: ConfigurationOptions,
}

impl ConfigurationManager {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        settings: Arc<dyn SettingStore>,
        changes: Arc<dyn SettingChangeStore>,
        audit: Arc<dyn AuditSink>,
        validator: Arc<SettingsValidator>,
        cache: Arc<ConfigurationCache>,
        notifier: Arc<ChangeNotifier>,
        options: ConfigurationOptions,
    ) -> Self {
        Self {
            settings,
            changes,
            audit,
            validator,
            cache,
            notifier,
            history: Mutex::new(VecDeque::new()),
            cache_loaded_at: Mutex::new(None),
            options,
        }
    }

    pub fn notifier(&self) -> &Arc<ChangeNotifier> {
        &self.notifier
    }

    pub fn cache(&self) -> &Arc<ConfigurationCache> {
        &self.cache
    }

    /// Whether cached reads are currently trusted.
    pub fn is_cache_valid(&self) -> bool {
        match *lock(&self.cache_loaded_at) {
            Some(loaded_at) => Utc::now() - loaded_at < self.options.freshness_window,
            None => false,
        }
    }

    fn mark_cache_loaded(&self) {
        *lock(&self.cache_loaded_at) = Some(Utc::now());
    }

    /// Create a new setting after validating its key and initial value.
    pub async fn create_setting(
        &self,
        new: NewSetting,
        user_id: Option<Uuid>,
    ) -> DomainResult<Uuid> {
        shared::validation::validate_setting_key(&new.key).map_err(|e| {
            DomainError::Validation(
                e.message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid setting key '{}'", new.key)),
            )
        })?;

        let value = SettingValue::from_json(new.value);
        let result = self
            .validator
            .validate_value(&value, new.validation_rules.as_ref(), &new.key);
        if !result.is_valid {
            counter!("settings_validation_failures_total").increment(1);
            let message = result
                .error_message
                .unwrap_or_else(|| format!("Invalid value for '{}'", new.key));
            self.record_rejection(AuditAction::SettingCreate, user_id, &new.key, &value, &message)
                .await;
            return Err(DomainError::Validation(message));
        }

        let now = Utc::now();
        let setting = Setting {
            id: Uuid::new_v4(),
            key: new.key,
            value,
            category: new.category,
            description: new.description,
            validation_rules: new.validation_rules,
            is_sensitive: new.is_sensitive,
            requires_restart: new.requires_restart,
            created_at: now,
            updated_at: now,
            updated_by: user_id,
        };
        self.settings.insert(&setting).await?;

        self.cache
            .set(&setting_cache_key(&setting.key), setting.value.to_json(), None)
            .await;

        let event = ChangeEvent::new(
            ChangeEventType::SettingCreated,
            &setting.key,
            None,
            Some(setting.value.to_json()),
            user_id,
        );
        self.publish(event.clone());
        self.record_change(&event, AuditAction::SettingCreate).await;

        info!(key = %setting.key, category = %setting.category, "Setting created");
        Ok(setting.id)
    }

    /// Read a setting value, preferring the cache while it is fresh.
    pub async fn get_setting(&self, key: &str, use_cache: bool) -> DomainResult<Option<SettingValue>> {
        let cache_key = setting_cache_key(key);
        if use_cache && self.is_cache_valid() {
            if let Some(cached) = self.cache.get(&cache_key).await {
                return Ok(Some(SettingValue::from_json(cached)));
            }
        }

        let Some(setting) = self.settings.find_by_key(key).await? else {
            return Ok(None);
        };
        self.cache.set(&cache_key, setting.value.to_json(), None).await;
        self.mark_cache_loaded();
        Ok(Some(setting.value))
    }

    pub async fn get_setting_record(&self, key: &str) -> DomainResult<Option<Setting>> {
        Ok(self.settings.find_by_key(key).await?)
    }

    pub async fn list_settings(&self, category: Option<SettingCategory>) -> DomainResult<Vec<Setting>> {
        Ok(self.settings.list(category).await?)
    }

    /// Update a setting value.
    ///
    /// Returns `Ok(false)` when the value is unchanged, in which case nothing
    /// is written or broadcast.
    pub async fn update_setting(
        &self,
        key: &str,
        value: serde_json::Value,
        user_id: Option<Uuid>,
    ) -> DomainResult<bool> {
        let existing = self
            .settings
            .find_by_key(key)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Setting '{}' not found", key)))?;

        let new_value = SettingValue::from_json(value);
        let result = self
            .validator
            .validate_value(&new_value, existing.validation_rules.as_ref(), key);
        if !result.is_valid {
            counter!("settings_validation_failures_total").increment(1);
            let message = result
                .error_message
                .unwrap_or_else(|| format!("Invalid value for '{}'", key));
            self.record_rejection(AuditAction::SettingUpdate, user_id, key, &new_value, &message)
                .await;
            return Err(DomainError::Validation(message));
        }

        let old_json = existing.value.to_json();
        let new_json = new_value.to_json();
        if json_equal(&old_json, &new_json) {
            return Ok(false);
        }

        self.settings
            .update_value(key, &new_value, user_id, Utc::now())
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Setting '{}' not found", key)))?;

        let cache_key = setting_cache_key(key);
        self.cache.invalidate(&cache_key).await;
        self.cache.set(&cache_key, new_json.clone(), None).await;

        let event = ChangeEvent::new(
            ChangeEventType::SettingUpdated,
            key,
            Some(old_json),
            Some(new_json),
            user_id,
        );
        self.publish(event.clone());
        self.record_change(&event, AuditAction::SettingUpdate).await;

        counter!("settings_updates_total").increment(1);
        if existing.requires_restart {
            warn!(key = %key, "Updated setting requires a restart to take effect");
        }
        info!(key = %key, "Setting updated");
        Ok(true)
    }

    /// Apply several updates independently; one failing key does not stop the rest.
    pub async fn update_settings(
        &self,
        values: HashMap<String, serde_json::Value>,
        user_id: Option<Uuid>,
    ) -> DomainResult<BulkUpdateOutcome> {
        let mut outcome = BulkUpdateOutcome::default();
        let mut keys: Vec<String> = values.keys().cloned().collect();
        keys.sort();

        for key in keys {
            let Some(value) = values.get(&key).cloned() else {
                continue;
            };
            match self.update_setting(&key, value, user_id).await {
                Ok(true) => outcome.updated.push(key),
                Ok(false) => outcome.unchanged.push(key),
                Err(DomainError::Validation(message)) => {
                    outcome.invalid.insert(key, message);
                }
                Err(DomainError::NotFound(_)) => outcome.not_found.push(key),
                Err(err) => return Err(err),
            }
        }

        record_best_effort(
            self.audit.as_ref(),
            AuditLogBuilder::user_action(user_id, AuditAction::SettingBulkUpdate)
                .with_details(json!({
                    "updated": outcome.updated,
                    "unchanged": outcome.unchanged,
                    "invalid": outcome.invalid.keys().collect::<Vec<_>>(),
                    "notFound": outcome.not_found,
                }))
                .build(),
        )
        .await;
        Ok(outcome)
    }

    /// Delete a setting. Returns `Ok(false)` if it did not exist.
    pub async fn delete_setting(&self, key: &str, user_id: Option<Uuid>) -> DomainResult<bool> {
        let Some(existing) = self.settings.find_by_key(key).await? else {
            return Ok(false);
        };
        if !self.settings.delete(key).await? {
            return Ok(false);
        }
        self.cache.invalidate(&setting_cache_key(key)).await;

        let event = ChangeEvent::new(
            ChangeEventType::SettingDeleted,
            key,
            Some(existing.value.to_json()),
            None,
            user_id,
        );
        self.publish(event.clone());
        self.record_change(&event, AuditAction::SettingDelete).await;

        info!(key = %key, "Setting deleted");
        Ok(true)
    }

    /// Dry-run validation of `value` against the stored rules for `key`.
    pub async fn validate_setting(
        &self,
        key: &str,
        value: serde_json::Value,
    ) -> DomainResult<ValidationResult> {
        let setting = self
            .settings
            .find_by_key(key)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Setting '{}' not found", key)))?;
        Ok(self.validator.validate_value(
            &SettingValue::from_json(value),
            setting.validation_rules.as_ref(),
            key,
        ))
    }

    /// Subscribe to every setting change. Returns the generated listener id.
    pub fn register_change_listener<F>(&self, callback: F) -> String
    where
        F: Fn(&ChangeEvent) -> Result<(), String> + Send + Sync + 'static,
    {
        self.notifier.subscribe(callback)
    }

    pub fn register_change_listener_advanced(
        &self,
        listener_id: impl Into<String>,
        callback: ListenerCallback,
        filter_keys: Vec<String>,
        priority: i32,
    ) {
        self.notifier
            .register_callback(listener_id, callback, filter_keys, priority)
    }

    /// Recent changes made through this manager, newest first.
    pub fn get_change_history(&self, key: Option<&str>, limit: usize) -> Vec<ChangeEvent> {
        lock(&self.history)
            .iter()
            .rev()
            .filter(|e| key.map_or(true, |k| e.key == k))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Durable change log for one key.
    pub async fn get_setting_history(
        &self,
        key: &str,
        page: &PageRequest,
    ) -> DomainResult<Page<SettingChangeRecord>> {
        let (items, total) = self
            .changes
            .list_for_key(key, page.limit(), page.offset())
            .await?;
        Ok(Page::new(items, total, page))
    }

    /// Reload every setting into the cache and reopen the freshness window.
    pub async fn refresh_cache(&self) -> DomainResult<usize> {
        let settings = self.settings.list(None).await?;
        for setting in &settings {
            self.cache
                .set(&setting_cache_key(&setting.key), setting.value.to_json(), None)
                .await;
        }
        self.mark_cache_loaded();
        info!(count = settings.len(), "Configuration cache refreshed");
        Ok(settings.len())
    }

    fn publish(&self, event: ChangeEvent) {
        self.notifier.broadcast_event(event.clone());
        let mut history = lock(&self.history);
        history.push_back(event);
        while history.len() > self.options.history_limit {
            history.pop_front();
        }
    }

    async fn record_change(&self, event: &ChangeEvent, action: AuditAction) {
        let record = SettingChangeRecord::from_event(event);
        if let Err(err) = self.changes.record(&record).await {
            warn!(key = %event.key, error = %err, "Failed to write setting change log");
        }
        record_best_effort(
            self.audit.as_ref(),
            audit_helpers::setting_changed(
                action,
                event.user_id,
                &event.key,
                event.old_value.clone(),
                event.new_value.clone(),
            ),
        )
        .await;
    }

    /// Audit a write the validator refused. Nothing is persisted or broadcast.
    async fn record_rejection(
        &self,
        action: AuditAction,
        user_id: Option<Uuid>,
        key: &str,
        attempted: &SettingValue,
        message: &str,
    ) {
        record_best_effort(
            self.audit.as_ref(),
            AuditLogBuilder::user_action(user_id, action)
                .on_resource(key)
                .with_json_change("value", None, Some(attempted.to_json()))
                .with_details(json!({ "error": message }))
                .failed()
                .build(),
        )
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SettingChangeType, ValidationRules};
    use crate::store::memory::{
        MemoryAuditSink, MemoryCacheStore, MemorySettingChangeStore, MemorySettingStore,
    };
    use serde_json::json;

    struct Fixture {
        manager: ConfigurationManager,
        store: Arc<MemorySettingStore>,
        audit: Arc<MemoryAuditSink>,
    }

    fn fixture_with(audit: MemoryAuditSink, validator: SettingsValidator) -> Fixture {
        let store = Arc::new(MemorySettingStore::new());
        let audit = Arc::new(audit);
        let cache = Arc::new(ConfigurationCache::new(
            Some(Arc::new(MemoryCacheStore::new())),
            Default::default(),
        ));
        let manager = ConfigurationManager::new(
            store.clone(),
            Arc::new(MemorySettingChangeStore::new()),
            audit.clone(),
            Arc::new(validator),
            cache,
            Arc::new(ChangeNotifier::default()),
            ConfigurationOptions::default(),
        );
        Fixture {
            manager,
            store,
            audit,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MemoryAuditSink::new(), SettingsValidator::new())
    }

    async fn seed_products_per_page(manager: &ConfigurationManager) {
        manager
            .create_setting(
                NewSetting::new("products_per_page", json!(24))
                    .with_category(SettingCategory::Catalog)
                    .with_rules(ValidationRules::number_range(1.0, 100.0)),
                None,
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rejected_update_keeps_stored_value() {
        let f = fixture();
        seed_products_per_page(&f.manager).await;

        let err = f
            .manager
            .update_setting("products_per_page", json!(500), None)
            .await
            .unwrap_err();
        match err {
            DomainError::Validation(message) => assert!(message.contains("above maximum 100")),
            other => panic!("unexpected error: {:?}", other),
        }

        let value = f.manager.get_setting("products_per_page", false).await.unwrap();
        assert_eq!(value, Some(SettingValue::from_json(json!(24))));
        // Rejected writes are not broadcast.
        assert_eq!(f.manager.get_change_history(Some("products_per_page"), 10).len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_writes_are_audited_as_failures() {
        let f = fixture();
        seed_products_per_page(&f.manager).await;
        let user = Uuid::new_v4();

        f.manager
            .update_setting("products_per_page", json!(500), Some(user))
            .await
            .unwrap_err();
        f.manager
            .create_setting(
                NewSetting::new("page_size", json!("big"))
                    .with_rules(ValidationRules::number_range(1.0, 10.0)),
                Some(user),
            )
            .await
            .unwrap_err();

        let entries = f.audit.entries();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].success);

        let update = &entries[1];
        assert_eq!(update.action, "setting.update");
        assert!(!update.success);
        assert_eq!(update.user_id, Some(user));
        assert_eq!(update.resource_id.as_deref(), Some("products_per_page"));
        assert!(update.details["error"]
            .as_str()
            .unwrap()
            .contains("above maximum 100"));

        let create = &entries[2];
        assert_eq!(create.action, "setting.create");
        assert!(!create.success);
        assert_eq!(create.resource_id.as_deref(), Some("page_size"));
    }

    #[tokio::test]
    async fn test_cache_coherent_after_update() {
        let f = fixture();
        seed_products_per_page(&f.manager).await;
        // Warm the cache and open the freshness window.
        f.manager.get_setting("products_per_page", true).await.unwrap();

        assert!(f
            .manager
            .update_setting("products_per_page", json!(48), None)
            .await
            .unwrap());

        let cached = f.manager.get_setting("products_per_page", true).await.unwrap();
        let uncached = f.manager.get_setting("products_per_page", false).await.unwrap();
        assert_eq!(cached, Some(SettingValue::from_json(json!(48))));
        assert_eq!(uncached, cached);
    }

    #[tokio::test]
    async fn test_update_broadcasts_old_and_new_values() {
        let f = fixture();
        seed_products_per_page(&f.manager).await;

        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        f.manager.register_change_listener_advanced(
            "catalog-watch",
            Arc::new(move |event: &ChangeEvent| {
                sink.lock().unwrap().push(event.clone());
                Ok(())
            }),
            vec!["products_per_page".to_string()],
            0,
        );

        f.manager
            .update_setting("products_per_page", json!(30), Some(Uuid::new_v4()))
            .await
            .unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].event_type, ChangeEventType::SettingUpdated);
        assert_eq!(received[0].old_value, Some(json!(24)));
        assert_eq!(received[0].new_value, Some(json!(30)));
    }

    #[tokio::test]
    async fn test_unchanged_value_is_noop() {
        let f = fixture();
        seed_products_per_page(&f.manager).await;
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();
        f.manager.register_change_listener(move |_| {
            *counter.lock().unwrap() += 1;
            Ok(())
        });

        let changed = f
            .manager
            .update_setting("products_per_page", json!(24), None)
            .await
            .unwrap();
        assert!(!changed);
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_key_is_not_found() {
        let f = fixture();
        let err = f
            .manager
            .update_setting("missing", json!(1), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert_eq!(f.manager.get_setting("missing", true).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts() {
        let f = fixture();
        seed_products_per_page(&f.manager).await;
        let err = f
            .manager
            .create_setting(NewSetting::new("products_per_page", json!(10)), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_key_and_value() {
        let f = fixture();
        let err = f
            .manager
            .create_setting(NewSetting::new("Bad Key", json!(1)), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = f
            .manager
            .create_setting(
                NewSetting::new("page_size", json!(0))
                    .with_rules(ValidationRules::number_range(1.0, 10.0)),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(f.store.find_by_key("page_size").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_durable_history_and_audit() {
        let f = fixture();
        let user = Uuid::new_v4();
        seed_products_per_page(&f.manager).await;
        f.manager
            .update_setting("products_per_page", json!(30), Some(user))
            .await
            .unwrap();
        f.manager
            .update_setting("products_per_page", json!(40), Some(user))
            .await
            .unwrap();

        let page = f
            .manager
            .get_setting_history("products_per_page", &PageRequest::new(2, 0))
            .await
            .unwrap();
        assert_eq!(page.total_count, 3);
        assert!(page.has_more);
        assert_eq!(page.items[0].new_value, Some(json!(40)));
        assert_eq!(page.items[0].change_type, SettingChangeType::ValueChanged);
        assert_eq!(page.items[0].changed_by, Some(user));

        let actions: Vec<String> = f.audit.entries().into_iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec!["setting.create", "setting.update", "setting.update"]
        );
    }

    #[tokio::test]
    async fn test_audit_failure_does_not_block_update() {
        let f = fixture_with(MemoryAuditSink::failing(), SettingsValidator::new());
        seed_products_per_page(&f.manager).await;
        assert!(f
            .manager
            .update_setting("products_per_page", json!(12), None)
            .await
            .unwrap());
        assert_eq!(
            f.manager.get_setting("products_per_page", false).await.unwrap(),
            Some(SettingValue::from_json(json!(12)))
        );
    }

    #[tokio::test]
    async fn test_custom_validator_applies_on_update() {
        let validator = SettingsValidator::builder()
            .register("store_email", |v| match v.as_str() {
                Some(s) if s.contains('@') => Ok(()),
                _ => Err("store_email must be an email address".to_string()),
            })
            .build();
        let f = fixture_with(MemoryAuditSink::new(), validator);
        f.manager
            .create_setting(NewSetting::new("store_email", json!("shop@example.com")), None)
            .await
            .unwrap();
        let err = f
            .manager
            .update_setting("store_email", json!("nope"), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "store_email must be an email address");
    }

    #[tokio::test]
    async fn test_bulk_update_applies_keys_independently() {
        let f = fixture();
        seed_products_per_page(&f.manager).await;
        f.manager
            .create_setting(NewSetting::new("currency", json!("USD")), None)
            .await
            .unwrap();

        let mut values = HashMap::new();
        values.insert("products_per_page".to_string(), json!(500));
        values.insert("currency".to_string(), json!("EUR"));
        values.insert("missing".to_string(), json!(1));

        let outcome = f.manager.update_settings(values, None).await.unwrap();
        assert_eq!(outcome.updated, vec!["currency"]);
        assert!(outcome.invalid["products_per_page"].contains("above maximum 100"));
        assert_eq!(outcome.not_found, vec!["missing"]);
    }

    #[tokio::test]
    async fn test_delete_setting() {
        let f = fixture();
        seed_products_per_page(&f.manager).await;
        assert!(f.manager.delete_setting("products_per_page", None).await.unwrap());
        assert!(!f.manager.delete_setting("products_per_page", None).await.unwrap());
        assert_eq!(f.manager.get_setting("products_per_page", true).await.unwrap(), None);

        let history = f.manager.get_change_history(None, 10);
        assert_eq!(history[0].event_type, ChangeEventType::SettingDeleted);
        assert_eq!(history[0].old_value, Some(json!(24)));
    }

    #[tokio::test]
    async fn test_validate_setting_dry_run() {
        let f = fixture();
        seed_products_per_page(&f.manager).await;
        let ok = f.manager.validate_setting("products_per_page", json!(50)).await.unwrap();
        assert!(ok.is_valid);
        let bad = f.manager.validate_setting("products_per_page", json!(0)).await.unwrap();
        assert!(!bad.is_valid);
        assert_eq!(
            f.manager.get_setting("products_per_page", false).await.unwrap(),
            Some(SettingValue::from_json(json!(24)))
        );
    }

    #[tokio::test]
    async fn test_refresh_cache_opens_window() {
        let f = fixture();
        seed_products_per_page(&f.manager).await;
        assert!(!f.manager.is_cache_valid());
        assert_eq!(f.manager.refresh_cache().await.unwrap(), 1);
        assert!(f.manager.is_cache_valid());
        assert!(f.manager.cache().contains_in_memory("setting:products_per_page"));
    }

    #[tokio::test]
    async fn test_list_settings_by_category() {
        let f = fixture();
        seed_products_per_page(&f.manager).await;
        f.manager
            .create_setting(NewSetting::new("currency", json!("USD")), None)
            .await
            .unwrap();
        let catalog = f
            .manager
            .list_settings(Some(SettingCategory::Catalog))
            .await
            .unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(f.manager.list_settings(None).await.unwrap().len(), 2);
    }
}
