//! Two-tier configuration cache.
//!
//! The memory tier is a bounded map with TTL expiry and LRU eviction. The
//! optional persistent tier is read-through and write-through; its failures
//! are logged and treated as misses so the cache never fails a caller.

use crate::error::DomainError;
use crate::models::cache::hit_rate;
use crate::models::{CacheEntry, CacheStats};
use crate::store::CacheStore;
use crate::sync::lock;
use chrono::{Duration, Utc};
use metrics::counter;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Sizing and expiry settings for [`ConfigurationCache`].
#[derive(Debug, Clone)]
pub struct CacheOptions {
    pub max_size: usize,
    pub default_ttl: Duration,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            max_size: 1000,
            default_ttl: Duration::hours(1),
        }
    }
}

struct Slot {
    entry: CacheEntry,
    /// Insertion order, used to break `last_accessed` ties on eviction.
    seq: u64,
}

#[derive(Default)]
struct MemoryTier {
    slots: HashMap<String, Slot>,
    next_seq: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

pub struct ConfigurationCache {
    memory: Mutex<MemoryTier>,
    persistent: Option<Arc<dyn CacheStore>>,
    options: CacheOptions,
}

impl ConfigurationCache {
    pub fn new(persistent: Option<Arc<dyn CacheStore>>, options: CacheOptions) -> Self {
        Self {
            memory: Mutex::new(MemoryTier::default()),
            persistent,
            options,
        }
    }

    /// Memory-only cache with default options.
    pub fn in_memory() -> Self {
        Self::new(None, CacheOptions::default())
    }

    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    /// Look up `key`, falling through to the persistent tier on a memory miss.
    pub async fn get(&self, key: &str) -> Option<serde_json::Value> {
        let now = Utc::now();
        {
            let mut guard = lock(&self.memory);
            let tier = &mut *guard;
            let expired = match tier.slots.get_mut(key) {
                Some(slot) if !slot.entry.is_expired_at(now) => {
                    slot.entry.hit_count += 1;
                    slot.entry.last_accessed = now;
                    tier.hits += 1;
                    counter!("config_cache_hits_total", "tier" => "memory").increment(1);
                    return Some(slot.entry.value.clone());
                }
                Some(_) => true,
                None => false,
            };
            if expired {
                tier.slots.remove(key);
            }
        }

        if let Some(store) = &self.persistent {
            match store.get(key).await {
                Ok(Some(mut entry)) if !entry.is_expired_at(now) => {
                    if let Err(err) = store.record_hit(key, now).await {
                        warn!(key = %key, error = %err, "Failed to record persistent cache hit");
                    }
                    entry.hit_count += 1;
                    entry.last_accessed = now;
                    let value = entry.value.clone();
                    self.insert_memory(entry);
                    lock(&self.memory).hits += 1;
                    counter!("config_cache_hits_total", "tier" => "persistent").increment(1);
                    return Some(value);
                }
                Ok(Some(_)) => {
                    if let Err(err) = store.delete(key).await {
                        warn!(key = %key, error = %err, "Failed to evict expired persistent cache entry");
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(key = %key, error = %err, "Persistent cache read failed, treating as miss");
                }
            }
        }

        lock(&self.memory).misses += 1;
        counter!("config_cache_misses_total").increment(1);
        None
    }

    /// Store `value` in both tiers. `ttl` defaults to the configured TTL.
    pub async fn set(&self, key: &str, value: serde_json::Value, ttl: Option<Duration>) {
        self.set_with(key, value, ttl, true).await
    }

    /// Store `value` in memory and, when `persist` is set, in the persistent tier.
    pub async fn set_with(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Option<Duration>,
        persist: bool,
    ) {
        let entry = CacheEntry::new(key, value, ttl.unwrap_or(self.options.default_ttl));
        if persist {
            if let Some(store) = &self.persistent {
                if let Err(err) = store.put(&entry).await {
                    warn!(key = %key, error = %err, "Persistent cache write failed");
                }
            }
        }
        self.insert_memory(entry);
    }

    fn insert_memory(&self, entry: CacheEntry) {
        let max_size = self.options.max_size.max(1);
        let mut guard = lock(&self.memory);
        let tier = &mut *guard;

        if !tier.slots.contains_key(&entry.key) && tier.slots.len() >= max_size {
            let victim = tier
                .slots
                .iter()
                .min_by(|(_, a), (_, b)| {
                    a.entry
                        .last_accessed
                        .cmp(&b.entry.last_accessed)
                        .then(a.seq.cmp(&b.seq))
                })
                .map(|(key, _)| key.clone());
            if let Some(victim) = victim {
                tier.slots.remove(&victim);
                tier.evictions += 1;
                counter!("config_cache_evictions_total").increment(1);
                debug!(key = %victim, "Evicted least recently used cache entry");
            }
        }

        let seq = tier.next_seq;
        tier.next_seq += 1;
        tier.slots.insert(entry.key.clone(), Slot { entry, seq });
    }

    /// Remove `key` from both tiers. Returns whether the memory tier held it.
    pub async fn invalidate(&self, key: &str) -> bool {
        let removed = lock(&self.memory).slots.remove(key).is_some();
        if let Some(store) = &self.persistent {
            if let Err(err) = store.delete(key).await {
                warn!(key = %key, error = %err, "Persistent cache invalidation failed");
            }
        }
        removed
    }

    /// Remove every key matching the regular expression from both tiers.
    ///
    /// Returns the number of memory entries removed.
    pub async fn invalidate_pattern(&self, pattern: &str) -> Result<usize, DomainError> {
        let re = Regex::new(pattern)
            .map_err(|e| DomainError::Validation(format!("Invalid pattern '{}': {}", pattern, e)))?;

        let removed = {
            let mut tier = lock(&self.memory);
            let before = tier.slots.len();
            tier.slots.retain(|key, _| !re.is_match(key));
            before - tier.slots.len()
        };

        if let Some(store) = &self.persistent {
            if let Err(err) = store.delete_matching(pattern).await {
                warn!(pattern = %pattern, error = %err, "Persistent cache pattern invalidation failed");
            }
        }
        debug!(pattern = %pattern, removed, "Invalidated cache entries by pattern");
        Ok(removed)
    }

    /// Drop every entry in both tiers.
    pub async fn clear(&self) {
        lock(&self.memory).slots.clear();
        if let Some(store) = &self.persistent {
            if let Err(err) = store.clear().await {
                warn!(error = %err, "Persistent cache clear failed");
            }
        }
    }

    /// Sweep expired entries from both tiers and return how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let mut removed = {
            let mut tier = lock(&self.memory);
            let before = tier.slots.len();
            tier.slots.retain(|_, slot| !slot.entry.is_expired_at(now));
            before - tier.slots.len()
        };

        if let Some(store) = &self.persistent {
            match store.delete_expired(now).await {
                Ok(count) => removed += count as usize,
                Err(err) => warn!(error = %err, "Persistent cache cleanup failed"),
            }
        }
        removed
    }

    pub fn stats(&self) -> CacheStats {
        let tier = lock(&self.memory);
        CacheStats {
            hits: tier.hits,
            misses: tier.misses,
            hit_rate: hit_rate(tier.hits, tier.misses),
            evictions: tier.evictions,
            memory_entries: tier.slots.len(),
            max_size: self.options.max_size,
        }
    }

    /// Whether the memory tier currently holds an unexpired entry for `key`.
    pub fn contains_in_memory(&self, key: &str) -> bool {
        lock(&self.memory)
            .slots
            .get(key)
            .map_or(false, |slot| !slot.entry.is_expired_at(Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryCacheStore;
    use serde_json::json;

    fn with_store(max_size: usize) -> (ConfigurationCache, Arc<MemoryCacheStore>) {
        let store = Arc::new(MemoryCacheStore::new());
        let cache = ConfigurationCache::new(
            Some(store.clone()),
            CacheOptions {
                max_size,
                ..Default::default()
            },
        );
        (cache, store)
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = ConfigurationCache::in_memory();
        cache.set("setting:currency", json!("USD"), None).await;
        assert_eq!(cache.get("setting:currency").await, Some(json!("USD")));
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.hit_rate, 100.0);
    }

    #[tokio::test]
    async fn test_zero_ttl_is_a_miss() {
        let (cache, _) = with_store(10);
        cache.set("k", json!(1), Some(Duration::zero())).await;
        assert_eq!(cache.get("k").await, None);
        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.stats().memory_entries, 0);
    }

    #[tokio::test]
    async fn test_hit_rate_zero_without_lookups() {
        let cache = ConfigurationCache::in_memory();
        assert_eq!(cache.stats().hit_rate, 0.0);
    }

    #[tokio::test]
    async fn test_persistent_tier_repopulates_memory() {
        let store = Arc::new(MemoryCacheStore::new());
        store
            .put(&CacheEntry::new("setting:a", json!(42), Duration::hours(1)))
            .await
            .unwrap();
        let cache = ConfigurationCache::new(Some(store.clone()), CacheOptions::default());

        assert!(!cache.contains_in_memory("setting:a"));
        assert_eq!(cache.get("setting:a").await, Some(json!(42)));
        assert!(cache.contains_in_memory("setting:a"));

        let stored = store.get("setting:a").await.unwrap().unwrap();
        assert_eq!(stored.hit_count, 1);
    }

    #[tokio::test]
    async fn test_memory_only_set_skips_persistent_tier() {
        let (cache, store) = with_store(10);
        cache.set_with("k", json!(1), None, false).await;
        assert!(store.is_empty());
        cache.set("j", json!(2), None).await;
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_lru_eviction_by_last_access() {
        let cache = ConfigurationCache::new(
            None,
            CacheOptions {
                max_size: 2,
                ..Default::default()
            },
        );
        cache.set("a", json!(1), None).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        cache.set("b", json!(2), None).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        // Touch "a" so "b" becomes least recently used.
        assert!(cache.get("a").await.is_some());
        cache.set("c", json!(3), None).await;

        assert!(cache.contains_in_memory("a"));
        assert!(!cache.contains_in_memory("b"));
        assert!(cache.contains_in_memory("c"));
        assert_eq!(cache.stats().evictions, 1);
        assert_eq!(cache.stats().memory_entries, 2);
    }

    #[tokio::test]
    async fn test_overwrite_does_not_evict() {
        let cache = ConfigurationCache::new(
            None,
            CacheOptions {
                max_size: 1,
                ..Default::default()
            },
        );
        cache.set("a", json!(1), None).await;
        cache.set("a", json!(2), None).await;
        assert_eq!(cache.stats().evictions, 0);
        assert_eq!(cache.get("a").await, Some(json!(2)));
    }

    #[tokio::test]
    async fn test_invalidate_removes_both_tiers() {
        let (cache, store) = with_store(10);
        cache.set("setting:a", json!(1), None).await;
        assert!(cache.invalidate("setting:a").await);
        assert!(store.is_empty());
        assert_eq!(cache.get("setting:a").await, None);
    }

    #[tokio::test]
    async fn test_invalidate_pattern() {
        let (cache, store) = with_store(10);
        cache.set("content_hero", json!(1), None).await;
        cache.set("page_cache_hero", json!(2), None).await;
        cache.set("setting:a", json!(3), None).await;

        let removed = cache.invalidate_pattern("hero$").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
        assert!(cache.contains_in_memory("setting:a"));
    }

    #[tokio::test]
    async fn test_invalid_pattern_is_rejected() {
        let cache = ConfigurationCache::in_memory();
        let err = cache.invalidate_pattern("([").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_cleanup_expired_counts_both_tiers() {
        let (cache, _store) = with_store(10);
        cache.set("old", json!(1), Some(Duration::zero())).await;
        cache.set("fresh", json!(2), None).await;
        // One expired entry in memory and one in the persistent tier.
        assert_eq!(cache.cleanup_expired().await, 2);
        assert!(cache.contains_in_memory("fresh"));
    }

    #[tokio::test]
    async fn test_persistent_failure_degrades_to_miss() {
        let cache = ConfigurationCache::new(
            Some(Arc::new(MemoryCacheStore::failing())),
            CacheOptions::default(),
        );
        assert_eq!(cache.get("missing").await, None);
        cache.set("k", json!(1), None).await;
        assert_eq!(cache.get("k").await, Some(json!(1)));
        assert!(cache.invalidate("k").await);
        assert_eq!(cache.cleanup_expired().await, 0);
    }

    #[tokio::test]
    async fn test_clear() {
        let (cache, store) = with_store(10);
        cache.set("a", json!(1), None).await;
        cache.set("b", json!(2), None).await;
        cache.clear().await;
        assert_eq!(cache.stats().memory_entries, 0);
        assert!(store.is_empty());
    }
}
