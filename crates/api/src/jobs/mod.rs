//! Background jobs.

mod cache_maintenance;
mod metrics_snapshot;
mod scheduler;

pub use cache_maintenance::{CacheCleanupJob, CacheRefreshJob};
pub use metrics_snapshot::MetricsSnapshotJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
