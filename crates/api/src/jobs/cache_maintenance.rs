//! Periodic cache upkeep.

use domain::services::{ConfigurationCache, ConfigurationManager};
use std::sync::Arc;
use tracing::debug;

use super::scheduler::{Job, JobFrequency};

/// Sweeps expired entries from both cache tiers.
pub struct CacheCleanupJob {
    cache: Arc<ConfigurationCache>,
    interval_secs: u64,
}

impl CacheCleanupJob {
    pub fn new(cache: Arc<ConfigurationCache>, interval_secs: u64) -> Self {
        Self {
            cache,
            interval_secs,
        }
    }
}

#[async_trait::async_trait]
impl Job for CacheCleanupJob {
    fn name(&self) -> &'static str {
        "cache_cleanup"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(self.interval_secs)
    }

    async fn execute(&self) -> Result<(), String> {
        let removed = self.cache.cleanup_expired().await;
        debug!(removed, "Expired cache entries removed");
        Ok(())
    }
}

/// Reloads every setting into the cache so cached reads stay trusted.
pub struct CacheRefreshJob {
    configuration: Arc<ConfigurationManager>,
    interval_secs: u64,
}

impl CacheRefreshJob {
    pub fn new(configuration: Arc<ConfigurationManager>, interval_secs: u64) -> Self {
        Self {
            configuration,
            interval_secs,
        }
    }
}

#[async_trait::async_trait]
impl Job for CacheRefreshJob {
    fn name(&self) -> &'static str {
        "cache_refresh"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(self.interval_secs)
    }

    async fn execute(&self) -> Result<(), String> {
        self.configuration
            .refresh_cache()
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}
