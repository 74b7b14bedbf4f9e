//! Configuration cache administration routes.

use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::ok;
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ActingUser;

/// Exactly one of `key` or `pattern` (a regular expression).
#[derive(Debug, Default, Deserialize)]
pub struct InvalidateRequest {
    pub key: Option<String>,
    pub pattern: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RemovedCount {
    pub removed: usize,
}

/// GET /api/v1/cache/stats
pub async fn get_stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(ok(state.ctx.cache.stats()))
}

/// POST /api/v1/cache/invalidate
pub async fn invalidate(
    State(state): State<AppState>,
    user: ActingUser,
    Json(request): Json<InvalidateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = &state.ctx;
    let removed = match (request.key, request.pattern) {
        (Some(key), None) => ctx.invalidate_cache_key(&key, user.id()).await,
        (None, Some(pattern)) => ctx.invalidate_cache_pattern(&pattern, user.id()).await?,
        _ => {
            return Err(ApiError::Validation(
                "Provide exactly one of 'key' or 'pattern'".into(),
            ))
        }
    };
    Ok(ok(RemovedCount { removed }))
}

/// POST /api/v1/cache/cleanup
pub async fn cleanup(
    State(state): State<AppState>,
    user: ActingUser,
) -> Result<impl IntoResponse, ApiError> {
    let removed = state.ctx.cleanup_cache(user.id()).await;
    Ok(ok(RemovedCount { removed }))
}

/// DELETE /api/v1/cache
pub async fn clear(
    State(state): State<AppState>,
    user: ActingUser,
) -> Result<impl IntoResponse, ApiError> {
    state.ctx.clear_cache(user.id()).await;
    info!(user_id = ?user.id(), "Configuration cache cleared via API");
    Ok(ok(serde_json::json!({ "cleared": true })))
}
