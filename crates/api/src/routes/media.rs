//! Media library routes.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use domain::models::media::{ListMediaQuery, UploadMediaRequest};
use domain::models::UploadMedia;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{created, ok};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ActingUser;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResult {
    pub id: Uuid,
    pub usage_count: i64,
}

fn media_not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Media asset {} not found", id))
}

/// Decode an upload body, accepting both bare base64 and `data:` URLs.
fn decode_upload(data: &str) -> Result<Vec<u8>, ApiError> {
    let encoded = match data.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data,
    };
    STANDARD
        .decode(encoded.trim())
        .map_err(|e| ApiError::Validation(format!("File data is not valid base64: {}", e)))
}

/// GET /api/v1/media?fileType=
pub async fn list_media(
    State(state): State<AppState>,
    Query(query): Query<ListMediaQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(ok(state.ctx.media.list_media(query.file_type).await?))
}

/// POST /api/v1/media
pub async fn upload_media(
    State(state): State<AppState>,
    user: ActingUser,
    Json(request): Json<UploadMediaRequest>,
) -> Result<impl IntoResponse, ApiError> {
    request.validate()?;
    let bytes = decode_upload(&request.data)?;

    let asset = state
        .ctx
        .media
        .upload_media(UploadMedia {
            bytes,
            filename: request.filename,
            mime_type: request.mime_type,
            alt_text: request.alt_text,
            uploaded_by: user.id(),
        })
        .await?;

    info!(media_id = %asset.id, file_type = %asset.file_type, size = asset.file_size, "Media uploaded via API");
    Ok(created(asset))
}

/// GET /api/v1/media/:id
pub async fn get_media(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let asset = state
        .ctx
        .media
        .get_media(id)
        .await?
        .ok_or_else(|| media_not_found(id))?;
    Ok(ok(asset))
}

/// DELETE /api/v1/media/:id
pub async fn delete_media(
    State(state): State<AppState>,
    user: ActingUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.ctx.media.delete_media(id, user.id()).await? {
        return Err(media_not_found(id));
    }
    Ok(ok(serde_json::json!({ "id": id, "deleted": true })))
}

/// POST /api/v1/media/:id/optimize
///
/// Returns the generated variants.
pub async fn optimize_media(
    State(state): State<AppState>,
    user: ActingUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let variants = state.ctx.media.optimize_media(id, user.id()).await?;
    Ok(ok(variants))
}

/// POST /api/v1/media/:id/usage
pub async fn increment_usage(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let usage_count = state.ctx.media.increment_usage(id).await?;
    Ok(ok(UsageResult { id, usage_count }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_base64() {
        assert_eq!(decode_upload("aGVsbG8=").unwrap(), b"hello");
    }

    #[test]
    fn test_decode_data_url() {
        assert_eq!(
            decode_upload("data:text/plain;base64,aGVsbG8=").unwrap(),
            b"hello"
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_upload("not base64!!"),
            Err(ApiError::Validation(_))
        ));
    }
}
