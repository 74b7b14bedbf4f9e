//! Linear version chains for content elements.

use crate::error::{DomainError, DomainResult};
use crate::models::{ContentVersion, VersionDiff, VersionNode, VersionSnapshot};
use crate::store::ContentVersionStore;
use chrono::Utc;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

pub struct VersionManager {
    versions: Arc<dyn ContentVersionStore>,
}

impl VersionManager {
    pub fn new(versions: Arc<dyn ContentVersionStore>) -> Self {
        Self { versions }
    }

    /// Append a version with the next number for its element.
    ///
    /// Two concurrent snapshots of one element can pick the same number; the
    /// store rejects the loser with a conflict.
    pub async fn create_version_snapshot(
        &self,
        snapshot: VersionSnapshot,
    ) -> DomainResult<ContentVersion> {
        let next = self
            .versions
            .max_version_number(&snapshot.element_id)
            .await?
            .map_or(1, |max| max + 1);

        let version = ContentVersion {
            id: Uuid::new_v4(),
            element_id: snapshot.element_id,
            content: snapshot.content,
            content_type: snapshot.content_type,
            version_number: next,
            is_published: false,
            published_at: None,
            parent_version_id: snapshot.parent_version_id,
            change_summary: snapshot.change_summary,
            metadata: snapshot.metadata,
            created_by: snapshot.created_by,
            created_at: Utc::now(),
        };
        self.versions.insert(&version).await?;
        debug!(
            element_id = %version.element_id,
            version_number = version.version_number,
            "Created content version"
        );
        Ok(version)
    }

    /// All versions of an element, newest first.
    pub async fn get_version_history(&self, element_id: &str) -> DomainResult<Vec<ContentVersion>> {
        let mut versions = self.versions.list_for_element(element_id).await?;
        versions.reverse();
        Ok(versions)
    }

    async fn require_version(&self, element_id: &str, number: i32) -> DomainResult<ContentVersion> {
        self.versions
            .find_by_number(element_id, number)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound(format!("Version {} of '{}' not found", number, element_id))
            })
    }

    /// Compare two versions of one element.
    pub async fn get_version_diff(
        &self,
        element_id: &str,
        from_version: i32,
        to_version: i32,
    ) -> DomainResult<VersionDiff> {
        let from = self.require_version(element_id, from_version).await?;
        let to = self.require_version(element_id, to_version).await?;
        Ok(diff_versions(&from, &to))
    }

    /// Versions in ascending order with parent and child links.
    pub async fn get_version_tree(&self, element_id: &str) -> DomainResult<Vec<VersionNode>> {
        let versions = self.versions.list_for_element(element_id).await?;
        if versions.is_empty() {
            return Err(DomainError::NotFound(format!(
                "Content '{}' not found",
                element_id
            )));
        }

        let numbers: HashMap<Uuid, i32> = versions
            .iter()
            .map(|v| (v.id, v.version_number))
            .collect();
        let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for version in &versions {
            if let Some(parent) = version.parent_version_id {
                children.entry(parent).or_default().push(version.id);
            }
        }

        Ok(versions
            .into_iter()
            .map(|v| VersionNode {
                version_id: v.id,
                version_number: v.version_number,
                parent_version_id: v.parent_version_id,
                parent_version_number: v
                    .parent_version_id
                    .and_then(|p| numbers.get(&p).copied()),
                children: children.remove(&v.id).unwrap_or_default(),
                is_published: v.is_published,
                change_summary: v.change_summary,
                created_at: v.created_at,
            })
            .collect())
    }

    /// Check that `target` can be rolled back to and return it.
    ///
    /// A rollback needs an existing target, a currently published version and
    /// a target that is not the published one.
    pub async fn validate_rollback_target(
        &self,
        element_id: &str,
        target: i32,
    ) -> DomainResult<ContentVersion> {
        let versions = self.versions.list_for_element(element_id).await?;
        if versions.is_empty() {
            return Err(DomainError::NotFound(format!(
                "Content '{}' not found",
                element_id
            )));
        }
        let Some(target_version) = versions.iter().find(|v| v.version_number == target) else {
            return Err(DomainError::InvalidRollback(format!(
                "Version {} of '{}' does not exist",
                target, element_id
            )));
        };
        let Some(published) = versions.iter().find(|v| v.is_published) else {
            return Err(DomainError::InvalidRollback(format!(
                "'{}' has no published version to roll back from",
                element_id
            )));
        };
        if published.version_number == target {
            return Err(DomainError::InvalidRollback(format!(
                "Version {} of '{}' is already published",
                target, element_id
            )));
        }
        Ok(target_version.clone())
    }

    /// Delete old versions, keeping the published one and the `keep_count`
    /// highest numbers. Returns the number deleted.
    ///
    /// `keep_count` must be at least 1 so the highest number survives and
    /// numbering never restarts below it.
    pub async fn cleanup_old_versions(
        &self,
        element_id: &str,
        keep_count: usize,
    ) -> DomainResult<u64> {
        if keep_count == 0 {
            return Err(DomainError::Validation(
                "keep_count must be at least 1".to_string(),
            ));
        }
        let versions = self.get_version_history(element_id).await?;
        let doomed: Vec<Uuid> = versions
            .iter()
            .enumerate()
            .filter(|(index, v)| *index >= keep_count && !v.is_published)
            .map(|(_, v)| v.id)
            .collect();
        if doomed.is_empty() {
            return Ok(0);
        }
        let deleted = self.versions.delete_versions(&doomed).await?;
        info!(element_id = %element_id, deleted, keep_count, "Cleaned up old content versions");
        Ok(deleted)
    }
}

/// Structural comparison of two versions.
pub fn diff_versions(from: &ContentVersion, to: &ContentVersion) -> VersionDiff {
    let (lines_added, lines_removed) = line_changes(&from.content, &to.content);
    let changed_metadata_keys = changed_keys(&from.metadata, &to.metadata);

    VersionDiff {
        element_id: to.element_id.clone(),
        from_version: from.version_number,
        to_version: to.version_number,
        content_changed: from.content != to.content,
        metadata_changed: from.metadata != to.metadata,
        content_type_changed: from.content_type != to.content_type,
        changed_metadata_keys,
        lines_added,
        lines_removed,
        size_delta: to.content.len() as i64 - from.content.len() as i64,
    }
}

/// Line multiset difference: (lines only in `to`, lines only in `from`).
fn line_changes(from: &str, to: &str) -> (usize, usize) {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for line in from.lines() {
        *counts.entry(line).or_default() -= 1;
    }
    for line in to.lines() {
        *counts.entry(line).or_default() += 1;
    }
    counts.values().fold((0, 0), |(added, removed), &delta| {
        if delta > 0 {
            (added + delta as usize, removed)
        } else {
            (added, removed + delta.unsigned_abs() as usize)
        }
    })
}

fn changed_keys(from: &serde_json::Value, to: &serde_json::Value) -> Vec<String> {
    let empty = serde_json::Map::new();
    let from = from.as_object().unwrap_or(&empty);
    let to = to.as_object().unwrap_or(&empty);
    let keys: BTreeSet<&String> = from.keys().chain(to.keys()).collect();
    keys.into_iter()
        .filter(|k| from.get(*k) != to.get(*k))
        .cloned()
        .collect()
}
