use anyhow::{Context, Result};
use domain::services::SettingsValidator;
use domain::{AdminContext, Stores};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use marketplace_admin_api::{
    app,
    config::Config,
    jobs::{CacheCleanupJob, CacheRefreshJob, JobScheduler, MetricsSnapshotJob},
    middleware,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load().context("Failed to load configuration")?;
    middleware::logging::init_logging(&config.logging)
        .context("Failed to initialize logging")?;
    middleware::init_metrics().context("Failed to install metrics recorder")?;

    info!("Starting Marketplace Admin API v{}", env!("CARGO_PKG_VERSION"));

    let (stores, pool) = if config.uses_memory_store() {
        warn!("Using in-memory stores; data is lost on restart");
        (Stores::in_memory(), None)
    } else {
        let db_config = persistence::db::DatabaseConfig::from(&config.database);
        let pool = persistence::db::create_pool(&db_config)
            .await
            .context("Failed to connect to PostgreSQL")?;

        info!("Running database migrations...");
        sqlx::migrate!("../persistence/src/migrations")
            .run(&pool)
            .await?;
        info!("Migrations completed");

        (
            persistence::pg_stores(pool.clone(), config.media.upload_dir.clone()),
            Some(pool),
        )
    };

    let ctx = Arc::new(AdminContext::new(
        stores,
        SettingsValidator::new(),
        config.admin_options(),
    ));
    let loaded = ctx.configuration.refresh_cache().await?;
    info!(settings = loaded, "Configuration cache warmed");

    let mut scheduler = JobScheduler::new();
    if config.cache.cleanup_interval_secs > 0 {
        scheduler.register(CacheCleanupJob::new(
            ctx.cache.clone(),
            config.cache.cleanup_interval_secs,
        ));
    }
    if config.cache.freshness_window_secs > 0 {
        scheduler.register(CacheRefreshJob::new(
            ctx.configuration.clone(),
            config.cache.freshness_window_secs,
        ));
    }
    scheduler.register(MetricsSnapshotJob::new(ctx.cache.clone(), pool.clone()));
    scheduler.start();

    let addr = config.socket_addr()?;
    let app = app::create_app(config, ctx.clone(), pool);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(10)).await;
    ctx.shutdown();
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
