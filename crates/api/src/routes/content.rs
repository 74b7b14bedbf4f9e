//! Content element routes: versioning, publication and rollback.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use domain::models::content::{
    CleanupVersionsRequest, CreateContentRequest, EditContentRequest, PublishRequest,
    RollbackRequest,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{created, ok};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ActingUser;

#[derive(Debug, Deserialize)]
pub struct DiffQuery {
    pub from: i32,
    pub to: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnpublishResult {
    pub element_id: String,
    pub unpublished: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResult {
    pub element_id: String,
    pub deleted: u64,
}

fn element_not_found(element_id: &str) -> ApiError {
    ApiError::NotFound(format!("Content element '{}' not found", element_id))
}

/// GET /api/v1/content
pub async fn list_content(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(ok(state.ctx.content.list_content().await?))
}

/// POST /api/v1/content
///
/// Creates the element with version 1 as an unpublished draft.
pub async fn create_content(
    State(state): State<AppState>,
    user: ActingUser,
    Json(request): Json<CreateContentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;
    let version = state
        .ctx
        .content
        .create_content(
            &request.element_id,
            request.content,
            request.content_type,
            request.metadata,
            user.id(),
        )
        .await?;

    info!(element_id = %version.element_id, version_id = %version.id, "Content created via API");
    Ok(created(version))
}

/// GET /api/v1/content/versions/:version_id
pub async fn get_version_by_id(
    State(state): State<AppState>,
    Path(version_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let version = state
        .ctx
        .content
        .get_content_by_version_id(version_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Content version {} not found", version_id)))?;
    Ok(ok(version))
}

/// GET /api/v1/content/:element_id
///
/// The published version if there is one, otherwise the latest draft.
pub async fn get_content(
    State(state): State<AppState>,
    Path(element_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let version = state
        .ctx
        .content
        .get_content(&element_id)
        .await?
        .ok_or_else(|| element_not_found(&element_id))?;
    Ok(ok(version))
}

/// PUT /api/v1/content/:element_id
///
/// Appends a new draft version; publication is unchanged.
pub async fn edit_content(
    State(state): State<AppState>,
    user: ActingUser,
    Path(element_id): Path<String>,
    Json(request): Json<EditContentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;
    let version = state
        .ctx
        .content
        .edit_content(
            &element_id,
            request.content,
            request.change_summary,
            request.metadata,
            user.id(),
        )
        .await?;
    Ok(ok(version))
}

/// DELETE /api/v1/content/:element_id
pub async fn delete_content(
    State(state): State<AppState>,
    user: ActingUser,
    Path(element_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state
        .ctx
        .content
        .delete_content(&element_id, user.id())
        .await?
    {
        return Err(element_not_found(&element_id));
    }
    Ok(ok(serde_json::json!({ "elementId": element_id, "deleted": true })))
}

/// GET /api/v1/content/:element_id/published
pub async fn get_published_content(
    State(state): State<AppState>,
    Path(element_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let published = state
        .ctx
        .content
        .get_published_content(&element_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("No published content for '{}'", element_id))
        })?;
    Ok(ok(published))
}

/// GET /api/v1/content/:element_id/history
///
/// Newest version first.
pub async fn get_version_history(
    State(state): State<AppState>,
    Path(element_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let history = state.ctx.content.get_version_history(&element_id).await?;
    if history.is_empty() {
        return Err(element_not_found(&element_id));
    }
    Ok(ok(history))
}

/// GET /api/v1/content/:element_id/tree
pub async fn get_version_tree(
    State(state): State<AppState>,
    Path(element_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let tree = state
        .ctx
        .content
        .version_manager()
        .get_version_tree(&element_id)
        .await?;
    Ok(ok(tree))
}

/// GET /api/v1/content/:element_id/diff?from=&to=
pub async fn get_version_diff(
    State(state): State<AppState>,
    Path(element_id): Path<String>,
    Query(query): Query<DiffQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let diff = state
        .ctx
        .content
        .version_manager()
        .get_version_diff(&element_id, query.from, query.to)
        .await?;
    Ok(ok(diff))
}

/// POST /api/v1/content/:element_id/publish
pub async fn publish_version(
    State(state): State<AppState>,
    user: ActingUser,
    Path(element_id): Path<String>,
    Json(request): Json<PublishRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let content = &state.ctx.content;
    // The version must belong to the element named in the path.
    match content.get_content_by_version_id(request.version_id).await? {
        Some(version) if version.element_id == element_id => {}
        _ => {
            return Err(ApiError::NotFound(format!(
                "Version {} of '{}' not found",
                request.version_id, element_id
            )))
        }
    }

    let published = content.publish_version(request.version_id, user.id()).await?;
    Ok(ok(published))
}

/// POST /api/v1/content/:element_id/unpublish
pub async fn unpublish_content(
    State(state): State<AppState>,
    user: ActingUser,
    Path(element_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let unpublished = state
        .ctx
        .content
        .unpublish_content(&element_id, user.id())
        .await?;
    Ok(ok(UnpublishResult {
        element_id,
        unpublished,
    }))
}

/// POST /api/v1/content/:element_id/rollback
///
/// Copies the target version into a new version and publishes it.
pub async fn rollback_content(
    State(state): State<AppState>,
    user: ActingUser,
    Path(element_id): Path<String>,
    Json(request): Json<RollbackRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let version = state
        .ctx
        .content
        .rollback_content(&element_id, request.target_version, user.id())
        .await?;
    Ok(ok(version))
}

/// POST /api/v1/content/:element_id/cleanup
pub async fn cleanup_versions(
    State(state): State<AppState>,
    user: ActingUser,
    Path(element_id): Path<String>,
    Json(request): Json<CleanupVersionsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;
    let deleted = state
        .ctx
        .content
        .cleanup_versions(&element_id, request.keep_count, user.id())
        .await?;
    Ok(ok(CleanupResult {
        element_id,
        deleted,
    }))
}
