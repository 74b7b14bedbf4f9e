//! Setting entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{
    Setting, SettingCategory, SettingChangeRecord, SettingChangeType, SettingValue,
    ValidationRules,
};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the settings table.
#[derive(Debug, Clone, FromRow)]
pub struct SettingEntity {
    pub id: Uuid,
    pub key: String,
    pub value: serde_json::Value,
    pub category: String,
    pub description: Option<String>,
    pub validation_rules: Option<serde_json::Value>,
    pub is_sensitive: bool,
    pub requires_restart: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
}

impl SettingEntity {
    /// Convert to domain model. Unreadable rules are dropped with a warning.
    pub fn into_domain(self) -> Setting {
        let category = self
            .category
            .parse::<SettingCategory>()
            .unwrap_or_default();
        let validation_rules = self.validation_rules.and_then(|raw| {
            serde_json::from_value::<ValidationRules>(raw)
                .map_err(|e| {
                    tracing::warn!(key = %self.key, error = %e, "Ignoring unreadable validation rules");
                })
                .ok()
        });

        Setting {
            id: self.id,
            key: self.key,
            value: SettingValue::from_json(self.value),
            category,
            description: self.description,
            validation_rules,
            is_sensitive: self.is_sensitive,
            requires_restart: self.requires_restart,
            created_at: self.created_at,
            updated_at: self.updated_at,
            updated_by: self.updated_by,
        }
    }
}

impl From<SettingEntity> for Setting {
    fn from(entity: SettingEntity) -> Self {
        entity.into_domain()
    }
}

/// Database row mapping for the setting_changes table.
#[derive(Debug, Clone, FromRow)]
pub struct SettingChangeEntity {
    pub id: Uuid,
    pub setting_key: String,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
    pub change_type: String,
    pub changed_by: Option<Uuid>,
    pub changed_at: DateTime<Utc>,
}

impl From<SettingChangeEntity> for SettingChangeRecord {
    fn from(entity: SettingChangeEntity) -> Self {
        let change_type = entity
            .change_type
            .parse::<SettingChangeType>()
            .unwrap_or(SettingChangeType::ValueChanged);
        SettingChangeRecord {
            id: entity.id,
            setting_key: entity.setting_key,
            old_value: entity.old_value,
            new_value: entity.new_value,
            change_type,
            changed_by: entity.changed_by,
            changed_at: entity.changed_at,
        }
    }
}
