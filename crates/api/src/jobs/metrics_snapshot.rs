//! Periodic gauge sampling for the configuration cache and, on PostgreSQL,
//! the connection pool.

use domain::models::CacheStats;
use domain::services::ConfigurationCache;
use metrics::gauge;
use sqlx::PgPool;
use std::sync::Arc;

use super::scheduler::{Job, JobFrequency};

const SAMPLE_INTERVAL_SECS: u64 = 15;

pub struct MetricsSnapshotJob {
    cache: Arc<ConfigurationCache>,
    pool: Option<PgPool>,
}

impl MetricsSnapshotJob {
    pub fn new(cache: Arc<ConfigurationCache>, pool: Option<PgPool>) -> Self {
        Self { cache, pool }
    }

    fn publish_cache(stats: &CacheStats) {
        gauge!("config_cache_entries").set(stats.memory_entries as f64);
        gauge!("config_cache_capacity").set(stats.max_size as f64);
        gauge!("config_cache_hit_rate_percent").set(stats.hit_rate);
    }
}

#[async_trait::async_trait]
impl Job for MetricsSnapshotJob {
    fn name(&self) -> &'static str {
        "metrics_snapshot"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(SAMPLE_INTERVAL_SECS)
    }

    async fn execute(&self) -> Result<(), String> {
        Self::publish_cache(&self.cache.stats());
        if let Some(pool) = &self.pool {
            persistence::metrics::record_pool_metrics(pool);
        }
        Ok(())
    }
}
