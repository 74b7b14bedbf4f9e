//! Marketplace settings routes.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use axum::Json;
use domain::models::setting::{BulkUpdateSettingsRequest, UpdateSettingRequest};
use domain::models::{NewSetting, SettingCategory};
use serde::{Deserialize, Serialize};
use shared::pagination::PageRequest;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{created, ok};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ActingUser;

const DEFAULT_CHANGE_LIMIT: usize = 50;
const MAX_CHANGE_LIMIT: usize = 1000;

#[derive(Debug, Default, Deserialize)]
pub struct ListSettingsQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GetSettingQuery {
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,
}

fn default_use_cache() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct ChangeHistoryQuery {
    pub key: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSetting {
    pub id: Uuid,
    pub key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedSetting {
    pub key: String,
    pub changed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerToggle {
    pub listener_id: String,
    pub is_active: bool,
}

/// GET /api/v1/settings?category=
///
/// Sensitive values are masked.
pub async fn list_settings(
    State(state): State<AppState>,
    Query(query): Query<ListSettingsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let category = query
        .category
        .as_deref()
        .map(str::parse::<SettingCategory>)
        .transpose()
        .map_err(ApiError::Validation)?;

    let settings: Vec<_> = state
        .ctx
        .configuration
        .list_settings(category)
        .await?
        .iter()
        .map(|s| s.redacted())
        .collect();
    Ok(ok(settings))
}

/// POST /api/v1/settings
pub async fn create_setting(
    State(state): State<AppState>,
    user: ActingUser,
    Json(request): Json<NewSetting>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;
    let key = request.key.clone();
    let id = state
        .ctx
        .configuration
        .create_setting(request, user.id())
        .await?;

    info!(key = %key, user_id = ?user.id(), "Setting created via API");
    Ok(created(CreatedSetting { id, key }))
}

/// PUT /api/v1/settings
///
/// Each key is applied independently; the outcome lists what happened to each.
pub async fn bulk_update_settings(
    State(state): State<AppState>,
    user: ActingUser,
    Json(request): Json<BulkUpdateSettingsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.settings.is_empty() {
        return Err(ApiError::Validation("settings must not be empty".into()));
    }
    let outcome = state
        .ctx
        .configuration
        .update_settings(request.settings, user.id())
        .await?;
    Ok(ok(outcome))
}

/// GET /api/v1/settings/changes?key=&limit=
///
/// In-process change history, newest first.
pub async fn get_change_history(
    State(state): State<AppState>,
    Query(query): Query<ChangeHistoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_CHANGE_LIMIT)
        .clamp(1, MAX_CHANGE_LIMIT);
    let events = state
        .ctx
        .configuration
        .get_change_history(query.key.as_deref(), limit);
    Ok(ok(events))
}

/// GET /api/v1/settings/listeners
pub async fn list_listeners(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(ok(state.ctx.configuration.notifier().listeners()))
}

/// POST /api/v1/settings/listeners/:listener_id/enable
pub async fn enable_listener(
    State(state): State<AppState>,
    Path(listener_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state
        .ctx
        .configuration
        .notifier()
        .enable_listener(&listener_id)
    {
        return Err(ApiError::NotFound(format!(
            "Listener '{}' not found",
            listener_id
        )));
    }
    Ok(ok(ListenerToggle {
        listener_id,
        is_active: true,
    }))
}

/// GET /api/v1/settings/:key?use_cache=
pub async fn get_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<GetSettingQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let configuration = &state.ctx.configuration;
    let mut setting = configuration
        .get_setting_record(&key)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Setting '{}' not found", key)))?;

    if let Some(value) = configuration.get_setting(&key, query.use_cache).await? {
        setting.value = value;
    }
    Ok(ok(setting.redacted()))
}

/// PUT /api/v1/settings/:key
pub async fn update_setting(
    State(state): State<AppState>,
    user: ActingUser,
    Path(key): Path<String>,
    Json(request): Json<UpdateSettingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let changed = state
        .ctx
        .configuration
        .update_setting(&key, request.value, user.id())
        .await?;
    Ok(ok(UpdatedSetting { key, changed }))
}

/// DELETE /api/v1/settings/:key
pub async fn delete_setting(
    State(state): State<AppState>,
    user: ActingUser,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state
        .ctx
        .configuration
        .delete_setting(&key, user.id())
        .await?
    {
        return Err(ApiError::NotFound(format!("Setting '{}' not found", key)));
    }
    Ok(ok(serde_json::json!({ "key": key, "deleted": true })))
}

/// POST /api/v1/settings/:key/validate
///
/// Dry run against the stored rules; nothing is written.
pub async fn validate_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<UpdateSettingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .ctx
        .configuration
        .validate_setting(&key, request.value)
        .await?;
    Ok(ok(result))
}

/// GET /api/v1/settings/:key/history?limit=&offset=
pub async fn get_setting_history(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(page): Query<PageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let history = state
        .ctx
        .configuration
        .get_setting_history(&key, &page)
        .await?;
    Ok(ok(history))
}
