use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use domain::AdminContext;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{cache, content, health, media, settings};

#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<AdminContext>,
    pub config: Arc<Config>,
    /// Present only when running on PostgreSQL.
    pub pool: Option<PgPool>,
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins = if config.server.cors_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(
            config
                .server
                .cors_origins
                .iter()
                .filter_map(|o| o.parse().ok()),
        )
    };
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Settings
        .route(
            "/settings",
            get(settings::list_settings)
                .post(settings::create_setting)
                .put(settings::bulk_update_settings),
        )
        .route("/settings/changes", get(settings::get_change_history))
        .route("/settings/listeners", get(settings::list_listeners))
        .route(
            "/settings/listeners/:listener_id/enable",
            post(settings::enable_listener),
        )
        .route(
            "/settings/:key",
            get(settings::get_setting)
                .put(settings::update_setting)
                .delete(settings::delete_setting),
        )
        .route("/settings/:key/validate", post(settings::validate_setting))
        .route("/settings/:key/history", get(settings::get_setting_history))
        // Content
        .route(
            "/content",
            get(content::list_content).post(content::create_content),
        )
        .route(
            "/content/versions/:version_id",
            get(content::get_version_by_id),
        )
        .route(
            "/content/:element_id",
            get(content::get_content)
                .put(content::edit_content)
                .delete(content::delete_content),
        )
        .route(
            "/content/:element_id/published",
            get(content::get_published_content),
        )
        .route(
            "/content/:element_id/history",
            get(content::get_version_history),
        )
        .route("/content/:element_id/tree", get(content::get_version_tree))
        .route("/content/:element_id/diff", get(content::get_version_diff))
        .route(
            "/content/:element_id/publish",
            post(content::publish_version),
        )
        .route(
            "/content/:element_id/unpublish",
            post(content::unpublish_content),
        )
        .route(
            "/content/:element_id/rollback",
            post(content::rollback_content),
        )
        .route(
            "/content/:element_id/cleanup",
            post(content::cleanup_versions),
        )
        // Media
        .route("/media", get(media::list_media).post(media::upload_media))
        .route(
            "/media/:id",
            get(media::get_media).delete(media::delete_media),
        )
        .route("/media/:id/optimize", post(media::optimize_media))
        .route("/media/:id/usage", post(media::increment_usage))
        // Cache
        .route("/cache", axum::routing::delete(cache::clear))
        .route("/cache/stats", get(cache::get_stats))
        .route("/cache/invalidate", post(cache::invalidate))
        .route("/cache/cleanup", post(cache::cleanup))
}

pub fn create_app(config: Config, ctx: Arc<AdminContext>, pool: Option<PgPool>) -> Router {
    let config = Arc::new(config);
    let state = AppState {
        ctx,
        config: config.clone(),
        pool,
    };

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Global middleware: bottom layers run first.
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes())
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config))
        .with_state(state)
}
