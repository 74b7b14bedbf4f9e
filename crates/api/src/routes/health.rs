//! Health check endpoint handlers.

use axum::{extract::State, Json};
use serde::Serialize;
use sqlx::PgPool;
use std::time::Instant;

use crate::app::AppState;
use crate::error::ApiError;

fn database_unreachable() -> ApiError {
    ApiError::ServiceUnavailable("Database is unreachable".to_string())
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: DatabaseHealth,
    pub cache: CacheHealth,
}

#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    /// `postgres` or `memory`.
    pub backend: String,
    pub connected: bool,
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct CacheHealth {
    pub entries: usize,
    pub max_size: usize,
    pub hit_rate: f64,
}

/// Simple status response for liveness/readiness checks.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

async fn check_database(pool: Option<&PgPool>) -> DatabaseHealth {
    match pool {
        Some(pool) => {
            let start = Instant::now();
            let connected = sqlx::query("SELECT 1").execute(pool).await.is_ok();
            DatabaseHealth {
                backend: "postgres".to_string(),
                connected,
                latency_ms: connected.then(|| start.elapsed().as_millis() as u64),
            }
        }
        None => DatabaseHealth {
            backend: "memory".to_string(),
            connected: true,
            latency_ms: None,
        },
    }
}

/// GET /api/health
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, ApiError> {
    let database = check_database(state.pool.as_ref()).await;
    let stats = state.ctx.cache.stats();

    if !database.connected {
        return Err(database_unreachable());
    }

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        cache: CacheHealth {
            entries: stats.memory_entries,
            max_size: stats.max_size,
            hit_rate: stats.hit_rate,
        },
    }))
}

/// GET /api/health/live
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// GET /api/health/ready
///
/// Also refreshes the pool gauges when running on PostgreSQL.
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    if let Some(pool) = &state.pool {
        persistence::metrics::record_pool_metrics(pool);
    }
    if check_database(state.pool.as_ref()).await.connected {
        Ok(Json(StatusResponse {
            status: "ready".to_string(),
        }))
    } else {
        Err(database_unreachable())
    }
}
