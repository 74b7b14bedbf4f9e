//! Change event models shared by the configuration and content pipelines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

static EVENT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Kind of change carried by a [`ChangeEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeEventType {
    SettingCreated,
    SettingUpdated,
    SettingDeleted,
    ContentPublished,
    ContentUnpublished,
}

impl std::fmt::Display for ChangeEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ChangeEventType::SettingCreated => "setting_created",
            ChangeEventType::SettingUpdated => "setting_updated",
            ChangeEventType::SettingDeleted => "setting_deleted",
            ChangeEventType::ContentPublished => "content_published",
            ChangeEventType::ContentUnpublished => "content_unpublished",
        };
        write!(f, "{}", s)
    }
}

/// An immutable record of one change, delivered to listeners.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub event_id: String,
    pub event_type: ChangeEventType,
    pub key: String,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    /// Build an event stamped with the current time and a derived id.
    pub fn new(
        event_type: ChangeEventType,
        key: impl Into<String>,
        old_value: Option<serde_json::Value>,
        new_value: Option<serde_json::Value>,
        user_id: Option<Uuid>,
    ) -> Self {
        let key = key.into();
        let timestamp = Utc::now();
        let seq = EVENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let event_id = shared::crypto::short_digest(&format!(
            "{}:{}:{}",
            key,
            timestamp.timestamp_nanos_opt().unwrap_or_default(),
            seq
        ));
        Self {
            event_id,
            event_type,
            key,
            old_value,
            new_value,
            user_id,
            timestamp,
        }
    }
}

/// Snapshot of a registered listener, for status endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerInfo {
    pub listener_id: String,
    pub filter_keys: Vec<String>,
    pub priority: i32,
    pub is_active: bool,
    pub error_count: u32,
}

/// Type of a durable setting change record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettingChangeType {
    Created,
    ValueChanged,
    Deleted,
}

impl std::fmt::Display for SettingChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingChangeType::Created => write!(f, "CREATED"),
            SettingChangeType::ValueChanged => write!(f, "VALUE_CHANGED"),
            SettingChangeType::Deleted => write!(f, "DELETED"),
        }
    }
}

impl FromStr for SettingChangeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(SettingChangeType::Created),
            "VALUE_CHANGED" => Ok(SettingChangeType::ValueChanged),
            "DELETED" => Ok(SettingChangeType::Deleted),
            _ => Err(format!("Unknown setting change type: {}", s)),
        }
    }
}

/// Durable log entry for a setting change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingChangeRecord {
    pub id: Uuid,
    pub setting_key: String,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
    pub change_type: SettingChangeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_by: Option<Uuid>,
    pub changed_at: DateTime<Utc>,
}

impl SettingChangeRecord {
    /// Derive the durable record for a setting event.
    pub fn from_event(event: &ChangeEvent) -> Self {
        let change_type = match event.event_type {
            ChangeEventType::SettingCreated => SettingChangeType::Created,
            ChangeEventType::SettingDeleted => SettingChangeType::Deleted,
            _ => SettingChangeType::ValueChanged,
        };
        Self {
            id: Uuid::new_v4(),
            setting_key: event.key.clone(),
            old_value: event.old_value.clone(),
            new_value: event.new_value.clone(),
            change_type,
            changed_by: event.user_id,
            changed_at: event.timestamp,
        }
    }
}
