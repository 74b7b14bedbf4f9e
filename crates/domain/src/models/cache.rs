//! Configuration cache models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A cached value with expiry and access bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub key: String,
    pub value: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub hit_count: i64,
    pub last_accessed: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, value: serde_json::Value, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            key: key.into(),
            value,
            created_at: now,
            expires_at: now + ttl,
            hit_count: 0,
            last_accessed: now,
        }
    }

    /// An entry whose expiry is not strictly in the future is treated as absent.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub evictions: u64,
    pub memory_entries: usize,
    pub max_size: usize,
}

/// Compute `hits / (hits + misses) * 100`, or 0 when nothing was looked up.
pub fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64 * 100.0
    }
}
