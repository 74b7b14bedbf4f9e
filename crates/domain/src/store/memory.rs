//! In-process store implementations.
//!
//! Used by the test suites and by deployments configured with
//! `database.url = "memory://"`. State lives for the lifetime of the value.

use super::{
    AuditSink, CacheStore, ContentVersionStore, MediaStorage, MediaStore, PublishedContentStore,
    SettingChangeStore, SettingStore,
};
use crate::error::{StoreError, StoreResult};
use crate::models::{
    AuditEntry, CacheEntry, ContentVersion, MediaAsset, MediaFileType, PublishedContent, Setting,
    SettingCategory, SettingChangeRecord, SettingValue,
};
use crate::sync::lock;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemorySettingStore {
    settings: Mutex<BTreeMap<String, Setting>>,
}

impl MemorySettingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingStore for MemorySettingStore {
    async fn find_by_key(&self, key: &str) -> StoreResult<Option<Setting>> {
        Ok(lock(&self.settings).get(key).cloned())
    }

    async fn list(&self, category: Option<SettingCategory>) -> StoreResult<Vec<Setting>> {
        Ok(lock(&self.settings)
            .values()
            .filter(|s| category.map_or(true, |c| s.category == c))
            .cloned()
            .collect())
    }

    async fn insert(&self, setting: &Setting) -> StoreResult<()> {
        let mut settings = lock(&self.settings);
        if settings.contains_key(&setting.key) {
            return Err(StoreError::Conflict(format!(
                "Setting '{}' already exists",
                setting.key
            )));
        }
        settings.insert(setting.key.clone(), setting.clone());
        Ok(())
    }

    async fn update_value(
        &self,
        key: &str,
        value: &SettingValue,
        updated_by: Option<Uuid>,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<Setting>> {
        let mut settings = lock(&self.settings);
        Ok(settings.get_mut(key).map(|setting| {
            setting.value = value.clone();
            setting.updated_by = updated_by;
            setting.updated_at = updated_at;
            setting.clone()
        }))
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        Ok(lock(&self.settings).remove(key).is_some())
    }
}

#[derive(Debug, Default)]
pub struct MemorySettingChangeStore {
    records: Mutex<Vec<SettingChangeRecord>>,
}

impl MemorySettingChangeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingChangeStore for MemorySettingChangeStore {
    async fn record(&self, record: &SettingChangeRecord) -> StoreResult<()> {
        lock(&self.records).push(record.clone());
        Ok(())
    }

    async fn list_for_key(
        &self,
        key: &str,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<SettingChangeRecord>, i64)> {
        let records = lock(&self.records);
        let matching: Vec<&SettingChangeRecord> = records
            .iter()
            .rev()
            .filter(|r| r.setting_key == key)
            .collect();
        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }
}

/// Persistent cache tier kept in memory.
///
/// [`MemoryCacheStore::failing`] returns a store whose every call fails, for
/// exercising the degrade-to-miss path.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
    simulate_failure: bool,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            entries: Mutex::default(),
            simulate_failure: true,
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self) -> StoreResult<()> {
        if self.simulate_failure {
            Err(StoreError::Backend("simulated cache store failure".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> StoreResult<Option<CacheEntry>> {
        self.check()?;
        Ok(lock(&self.entries).get(key).cloned())
    }

    async fn put(&self, entry: &CacheEntry) -> StoreResult<()> {
        self.check()?;
        lock(&self.entries).insert(entry.key.clone(), entry.clone());
        Ok(())
    }

    async fn record_hit(&self, key: &str, at: DateTime<Utc>) -> StoreResult<()> {
        self.check()?;
        if let Some(entry) = lock(&self.entries).get_mut(key) {
            entry.hit_count += 1;
            entry.last_accessed = at;
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        self.check()?;
        Ok(lock(&self.entries).remove(key).is_some())
    }

    async fn delete_matching(&self, pattern: &str) -> StoreResult<u64> {
        self.check()?;
        let re = Regex::new(pattern).map_err(|e| StoreError::Backend(e.to_string()))?;
        let mut entries = lock(&self.entries);
        let before = entries.len();
        entries.retain(|key, _| !re.is_match(key));
        Ok((before - entries.len()) as u64)
    }

    async fn clear(&self) -> StoreResult<u64> {
        self.check()?;
        let mut entries = lock(&self.entries);
        let count = entries.len() as u64;
        entries.clear();
        Ok(count)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        self.check()?;
        let mut entries = lock(&self.entries);
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        Ok((before - entries.len()) as u64)
    }
}

#[derive(Debug, Default)]
pub struct MemoryContentVersionStore {
    versions: Mutex<Vec<ContentVersion>>,
}

impl MemoryContentVersionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentVersionStore for MemoryContentVersionStore {
    async fn insert(&self, version: &ContentVersion) -> StoreResult<()> {
        let mut versions = lock(&self.versions);
        if versions.iter().any(|v| {
            v.element_id == version.element_id && v.version_number == version.version_number
        }) {
            return Err(StoreError::Conflict(format!(
                "Version {} of '{}' already exists",
                version.version_number, version.element_id
            )));
        }
        versions.push(version.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<ContentVersion>> {
        Ok(lock(&self.versions).iter().find(|v| v.id == id).cloned())
    }

    async fn find_by_number(
        &self,
        element_id: &str,
        version_number: i32,
    ) -> StoreResult<Option<ContentVersion>> {
        Ok(lock(&self.versions)
            .iter()
            .find(|v| v.element_id == element_id && v.version_number == version_number)
            .cloned())
    }

    async fn list_for_element(&self, element_id: &str) -> StoreResult<Vec<ContentVersion>> {
        let mut list: Vec<ContentVersion> = lock(&self.versions)
            .iter()
            .filter(|v| v.element_id == element_id)
            .cloned()
            .collect();
        list.sort_by_key(|v| v.version_number);
        Ok(list)
    }

    async fn max_version_number(&self, element_id: &str) -> StoreResult<Option<i32>> {
        Ok(lock(&self.versions)
            .iter()
            .filter(|v| v.element_id == element_id)
            .map(|v| v.version_number)
            .max())
    }

    async fn find_published(&self, element_id: &str) -> StoreResult<Option<ContentVersion>> {
        Ok(lock(&self.versions)
            .iter()
            .find(|v| v.element_id == element_id && v.is_published)
            .cloned())
    }

    async fn mark_published(
        &self,
        element_id: &str,
        version_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<ContentVersion>> {
        let mut versions = lock(&self.versions);
        if !versions
            .iter()
            .any(|v| v.id == version_id && v.element_id == element_id)
        {
            return Ok(None);
        }
        let mut published = None;
        for version in versions.iter_mut().filter(|v| v.element_id == element_id) {
            if version.id == version_id {
                version.is_published = true;
                version.published_at = Some(at);
                published = Some(version.clone());
            } else {
                version.is_published = false;
                version.published_at = None;
            }
        }
        Ok(published)
    }

    async fn clear_published(&self, element_id: &str) -> StoreResult<u64> {
        let mut count = 0;
        for version in lock(&self.versions)
            .iter_mut()
            .filter(|v| v.element_id == element_id && v.is_published)
        {
            version.is_published = false;
            count += 1;
        }
        Ok(count)
    }

    async fn delete_versions(&self, ids: &[Uuid]) -> StoreResult<u64> {
        let mut versions = lock(&self.versions);
        let before = versions.len();
        versions.retain(|v| !ids.contains(&v.id));
        Ok((before - versions.len()) as u64)
    }

    async fn delete_element(&self, element_id: &str) -> StoreResult<u64> {
        let mut versions = lock(&self.versions);
        let before = versions.len();
        versions.retain(|v| v.element_id != element_id);
        Ok((before - versions.len()) as u64)
    }

    async fn list_element_ids(&self) -> StoreResult<Vec<String>> {
        let mut ids: Vec<String> = lock(&self.versions)
            .iter()
            .map(|v| v.element_id.clone())
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}

#[derive(Debug, Default)]
pub struct MemoryPublishedContentStore {
    rows: Mutex<HashMap<String, PublishedContent>>,
}

impl MemoryPublishedContentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PublishedContentStore for MemoryPublishedContentStore {
    async fn upsert(&self, row: &PublishedContent) -> StoreResult<()> {
        lock(&self.rows).insert(row.element_id.clone(), row.clone());
        Ok(())
    }

    async fn find(&self, element_id: &str) -> StoreResult<Option<PublishedContent>> {
        Ok(lock(&self.rows).get(element_id).cloned())
    }

    async fn delete(&self, element_id: &str) -> StoreResult<bool> {
        Ok(lock(&self.rows).remove(element_id).is_some())
    }
}

#[derive(Debug, Default)]
pub struct MemoryMediaStore {
    assets: Mutex<HashMap<Uuid, MediaAsset>>,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn insert(&self, asset: &MediaAsset) -> StoreResult<()> {
        lock(&self.assets).insert(asset.id, asset.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<MediaAsset>> {
        Ok(lock(&self.assets).get(&id).cloned())
    }

    async fn list(&self, file_type: Option<MediaFileType>) -> StoreResult<Vec<MediaAsset>> {
        let mut list: Vec<MediaAsset> = lock(&self.assets)
            .values()
            .filter(|a| file_type.map_or(true, |t| a.file_type == t))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn update(&self, asset: &MediaAsset) -> StoreResult<()> {
        lock(&self.assets).insert(asset.id, asset.clone());
        Ok(())
    }

    async fn increment_usage(&self, id: Uuid) -> StoreResult<Option<i64>> {
        Ok(lock(&self.assets).get_mut(&id).map(|asset| {
            asset.usage_count += 1;
            asset.updated_at = Utc::now();
            asset.usage_count
        }))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(lock(&self.assets).remove(&id).is_some())
    }
}

#[derive(Debug, Default)]
pub struct MemoryMediaStorage {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryMediaStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        lock(&self.files).contains_key(path)
    }

    pub fn file_count(&self) -> usize {
        lock(&self.files).len()
    }
}

#[async_trait]
impl MediaStorage for MemoryMediaStorage {
    async fn write(&self, path: &str, bytes: &[u8]) -> StoreResult<()> {
        lock(&self.files).insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn read(&self, path: &str) -> StoreResult<Vec<u8>> {
        lock(&self.files).get(path).cloned().ok_or_else(|| {
            StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", path),
            ))
        })
    }

    async fn delete(&self, path: &str) -> StoreResult<bool> {
        Ok(lock(&self.files).remove(path).is_some())
    }
}

/// Audit sink that keeps entries for inspection.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
    simulate_failure: bool,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            entries: Mutex::default(),
            simulate_failure: true,
        }
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        lock(&self.entries).clone()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, entry: &AuditEntry) -> StoreResult<()> {
        if self.simulate_failure {
            return Err(StoreError::Backend("simulated audit sink failure".into()));
        }
        lock(&self.entries).push(entry.clone());
        Ok(())
    }
}
