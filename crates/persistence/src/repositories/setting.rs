//! Setting repositories for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::error::StoreResult;
use domain::models::{Setting, SettingCategory, SettingChangeRecord, SettingValue};
use domain::store::{SettingChangeStore, SettingStore};
use sqlx::PgPool;
use uuid::Uuid;

use super::store_error;
use crate::entities::{SettingChangeEntity, SettingEntity};
use crate::metrics::QueryTimer;

/// Repository for the settings table.
#[derive(Clone)]
pub struct SettingRepository {
    pool: PgPool,
}

impl SettingRepository {
    /// Creates a new SettingRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingStore for SettingRepository {
    async fn find_by_key(&self, key: &str) -> StoreResult<Option<Setting>> {
        let timer = QueryTimer::new("find_setting_by_key");
        let result = sqlx::query_as::<_, SettingEntity>(
            r#"
            SELECT id, key, value, category, description, validation_rules,
                   is_sensitive, requires_restart, created_at, updated_at, updated_by
            FROM settings
            WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(store_error)?.map(Setting::from))
    }

    async fn list(&self, category: Option<SettingCategory>) -> StoreResult<Vec<Setting>> {
        let timer = QueryTimer::new("list_settings");
        let result = sqlx::query_as::<_, SettingEntity>(
            r#"
            SELECT id, key, value, category, description, validation_rules,
                   is_sensitive, requires_restart, created_at, updated_at, updated_by
            FROM settings
            WHERE ($1::text IS NULL OR category = $1)
            ORDER BY key
            "#,
        )
        .bind(category.map(|c| c.to_string()))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(store_error)?
            .into_iter()
            .map(Setting::from)
            .collect())
    }

    async fn insert(&self, setting: &Setting) -> StoreResult<()> {
        let rules = setting
            .validation_rules
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;

        let timer = QueryTimer::new("insert_setting");
        let result = sqlx::query(
            r#"
            INSERT INTO settings (id, key, value, category, description, validation_rules,
                                  is_sensitive, requires_restart, created_at, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(setting.id)
        .bind(&setting.key)
        .bind(setting.value.to_json())
        .bind(setting.category.to_string())
        .bind(&setting.description)
        .bind(rules)
        .bind(setting.is_sensitive)
        .bind(setting.requires_restart)
        .bind(setting.created_at)
        .bind(setting.updated_at)
        .bind(setting.updated_by)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map_err(store_error)?;
        Ok(())
    }

    async fn update_value(
        &self,
        key: &str,
        value: &SettingValue,
        updated_by: Option<Uuid>,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Option<Setting>> {
        let timer = QueryTimer::new("update_setting_value");
        let result = sqlx::query_as::<_, SettingEntity>(
            r#"
            UPDATE settings
            SET value = $2, updated_by = $3, updated_at = $4
            WHERE key = $1
            RETURNING id, key, value, category, description, validation_rules,
                      is_sensitive, requires_restart, created_at, updated_at, updated_by
            "#,
        )
        .bind(key)
        .bind(value.to_json())
        .bind(updated_by)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(store_error)?.map(Setting::from))
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let timer = QueryTimer::new("delete_setting");
        let result = sqlx::query("DELETE FROM settings WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result.map_err(store_error)?.rows_affected() > 0)
    }
}

/// Repository for the setting_changes log.
#[derive(Clone)]
pub struct SettingChangeRepository {
    pool: PgPool,
}

impl SettingChangeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingChangeStore for SettingChangeRepository {
    async fn record(&self, record: &SettingChangeRecord) -> StoreResult<()> {
        let timer = QueryTimer::new("insert_setting_change");
        let result = sqlx::query(
            r#"
            INSERT INTO setting_changes (id, setting_key, old_value, new_value, change_type,
                                         changed_by, changed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id)
        .bind(&record.setting_key)
        .bind(&record.old_value)
        .bind(&record.new_value)
        .bind(record.change_type.to_string())
        .bind(record.changed_by)
        .bind(record.changed_at)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map_err(store_error)?;
        Ok(())
    }

    async fn list_for_key(
        &self,
        key: &str,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<SettingChangeRecord>, i64)> {
        let timer = QueryTimer::new("count_setting_changes");
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM setting_changes WHERE setting_key = $1",
        )
        .bind(key)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        let total = total.map_err(store_error)?;

        let timer = QueryTimer::new("list_setting_changes");
        let result = sqlx::query_as::<_, SettingChangeEntity>(
            r#"
            SELECT id, setting_key, old_value, new_value, change_type, changed_by, changed_at
            FROM setting_changes
            WHERE setting_key = $1
            ORDER BY changed_at DESC, id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(key)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();

        let records = result
            .map_err(store_error)?
            .into_iter()
            .map(SettingChangeRecord::from)
            .collect();
        Ok((records, total))
    }
}
