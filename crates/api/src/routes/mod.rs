//! HTTP route handlers.

pub mod cache;
pub mod content;
pub mod health;
pub mod media;
pub mod settings;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

/// Success envelope shared by every `/api/v1` endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
    })
}

pub fn created<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::CREATED, ok(data))
}
