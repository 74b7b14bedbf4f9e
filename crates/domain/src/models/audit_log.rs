//! Audit log domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

/// Resource types that can be audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Setting,
    Content,
    Media,
    Cache,
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "setting" => Ok(ResourceType::Setting),
            "content" => Ok(ResourceType::Content),
            "media" => Ok(ResourceType::Media),
            "cache" => Ok(ResourceType::Cache),
            _ => Err(format!("Unknown resource type: {}", s)),
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceType::Setting => write!(f, "setting"),
            ResourceType::Content => write!(f, "content"),
            ResourceType::Media => write!(f, "media"),
            ResourceType::Cache => write!(f, "cache"),
        }
    }
}

/// Audited actions following the format: resource.operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    // Setting actions
    SettingCreate,
    SettingUpdate,
    SettingDelete,
    SettingBulkUpdate,

    // Content actions
    ContentCreate,
    ContentEdit,
    ContentPublish,
    ContentUnpublish,
    ContentRollback,
    ContentDelete,
    ContentCleanup,

    // Media actions
    MediaUpload,
    MediaOptimize,
    MediaDelete,

    // Cache actions
    CacheInvalidate,
    CacheClear,
    CacheCleanup,
}

impl AuditAction {
    /// Resource type implied by the action prefix.
    pub fn resource_type(&self) -> ResourceType {
        match self {
            AuditAction::SettingCreate
            | AuditAction::SettingUpdate
            | AuditAction::SettingDelete
            | AuditAction::SettingBulkUpdate => ResourceType::Setting,
            AuditAction::ContentCreate
            | AuditAction::ContentEdit
            | AuditAction::ContentPublish
            | AuditAction::ContentUnpublish
            | AuditAction::ContentRollback
            | AuditAction::ContentDelete
            | AuditAction::ContentCleanup => ResourceType::Content,
            AuditAction::MediaUpload | AuditAction::MediaOptimize | AuditAction::MediaDelete => {
                ResourceType::Media
            }
            AuditAction::CacheInvalidate | AuditAction::CacheClear | AuditAction::CacheCleanup => {
                ResourceType::Cache
            }
        }
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "setting.create" => Ok(AuditAction::SettingCreate),
            "setting.update" => Ok(AuditAction::SettingUpdate),
            "setting.delete" => Ok(AuditAction::SettingDelete),
            "setting.bulk_update" => Ok(AuditAction::SettingBulkUpdate),
            "content.create" => Ok(AuditAction::ContentCreate),
            "content.edit" => Ok(AuditAction::ContentEdit),
            "content.publish" => Ok(AuditAction::ContentPublish),
            "content.unpublish" => Ok(AuditAction::ContentUnpublish),
            "content.rollback" => Ok(AuditAction::ContentRollback),
            "content.delete" => Ok(AuditAction::ContentDelete),
            "content.cleanup" => Ok(AuditAction::ContentCleanup),
            "media.upload" => Ok(AuditAction::MediaUpload),
            "media.optimize" => Ok(AuditAction::MediaOptimize),
            "media.delete" => Ok(AuditAction::MediaDelete),
            "cache.invalidate" => Ok(AuditAction::CacheInvalidate),
            "cache.clear" => Ok(AuditAction::CacheClear),
            "cache.cleanup" => Ok(AuditAction::CacheCleanup),
            _ => Err(format!("Unknown audit action: {}", s)),
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuditAction::SettingCreate => "setting.create",
            AuditAction::SettingUpdate => "setting.update",
            AuditAction::SettingDelete => "setting.delete",
            AuditAction::SettingBulkUpdate => "setting.bulk_update",
            AuditAction::ContentCreate => "content.create",
            AuditAction::ContentEdit => "content.edit",
            AuditAction::ContentPublish => "content.publish",
            AuditAction::ContentUnpublish => "content.unpublish",
            AuditAction::ContentRollback => "content.rollback",
            AuditAction::ContentDelete => "content.delete",
            AuditAction::ContentCleanup => "content.cleanup",
            AuditAction::MediaUpload => "media.upload",
            AuditAction::MediaOptimize => "media.optimize",
            AuditAction::MediaDelete => "media.delete",
            AuditAction::CacheInvalidate => "cache.invalidate",
            AuditAction::CacheClear => "cache.clear",
            AuditAction::CacheCleanup => "cache.cleanup",
        };
        write!(f, "{}", s)
    }
}

/// Represents a change to a field with old and new values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub old: Option<JsonValue>,
    pub new: Option<JsonValue>,
}

impl FieldChange {
    pub fn new(old: Option<JsonValue>, new: Option<JsonValue>) -> Self {
        Self { old, new }
    }
}

/// Stored audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub action: String,
    pub resource_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    pub details: JsonValue,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

/// Input for creating a new audit log entry.
#[derive(Debug, Clone)]
pub struct CreateAuditEntry {
    pub user_id: Option<Uuid>,
    pub action: AuditAction,
    pub resource_type: ResourceType,
    pub resource_id: Option<String>,
    pub changes: Option<HashMap<String, FieldChange>>,
    pub details: Option<JsonValue>,
    pub success: bool,
}

impl CreateAuditEntry {
    pub fn new(action: AuditAction) -> Self {
        Self {
            user_id: None,
            action,
            resource_type: action.resource_type(),
            resource_id: None,
            changes: None,
            details: None,
            success: true,
        }
    }

    /// Merge `changes` and free-form details into the stored JSON document.
    pub fn details_json(&self) -> JsonValue {
        let mut details = match &self.details {
            Some(JsonValue::Object(map)) => map.clone(),
            Some(other) => {
                let mut map = serde_json::Map::new();
                map.insert("info".to_string(), other.clone());
                map
            }
            None => serde_json::Map::new(),
        };
        if let Some(changes) = &self.changes {
            if let Ok(value) = serde_json::to_value(changes) {
                details.insert("changes".to_string(), value);
            }
        }
        JsonValue::Object(details)
    }

    /// Materialize the stored entry.
    pub fn into_entry(self) -> AuditEntry {
        let details = self.details_json();
        AuditEntry {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            action: self.action.to_string(),
            resource_type: self.resource_type.to_string(),
            resource_id: self.resource_id,
            details,
            success: self.success,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_roundtrip() {
        for action in [
            AuditAction::SettingUpdate,
            AuditAction::ContentRollback,
            AuditAction::MediaUpload,
            AuditAction::CacheClear,
            AuditAction::CacheCleanup,
        ] {
            assert_eq!(action.to_string().parse::<AuditAction>().unwrap(), action);
        }
        assert!("setting.archive".parse::<AuditAction>().is_err());
    }

    #[test]
    fn test_action_resource_type() {
        assert_eq!(AuditAction::ContentPublish.resource_type(), ResourceType::Content);
        assert_eq!(AuditAction::SettingBulkUpdate.resource_type(), ResourceType::Setting);
        assert_eq!(ResourceType::Media.to_string(), "media");
    }

    #[test]
    fn test_details_merge_changes() {
        let mut input = CreateAuditEntry::new(AuditAction::SettingUpdate);
        input.details = Some(json!({"category": "catalog"}));
        let mut changes = HashMap::new();
        changes.insert(
            "value".to_string(),
            FieldChange::new(Some(json!(24)), Some(json!(48))),
        );
        input.changes = Some(changes);

        let details = input.details_json();
        assert_eq!(details["category"], "catalog");
        assert_eq!(details["changes"]["value"]["old"], 24);
        assert_eq!(details["changes"]["value"]["new"], 48);
    }

    #[test]
    fn test_into_entry() {
        let mut input = CreateAuditEntry::new(AuditAction::MediaDelete);
        input.resource_id = Some("abc".to_string());
        input.success = false;
        let entry = input.into_entry();
        assert_eq!(entry.action, "media.delete");
        assert_eq!(entry.resource_type, "media");
        assert!(!entry.success);
        assert_eq!(entry.details, json!({}));
    }
}
