//! Caching layer for ridership data.
//!
//! Usage-by-hour figures are historical and change rarely, so responses are
//! kept for a week per stop. Failed fetches are not cached.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::realtime::RealtimeError;
use crate::ridership::{UsagePoint, UsageSource};

/// Cached usage entry.
type UsageEntry = Arc<Vec<UsagePoint>>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(7 * 24 * 60 * 60),
            max_capacity: 2000,
        }
    }
}

/// Usage source with caching, keyed by normalised stop code.
pub struct CachedUsageSource<S> {
    source: S,
    cache: MokaCache<String, UsageEntry>,
}

impl<S: UsageSource> CachedUsageSource<S> {
    pub fn new(source: S, config: &CacheConfig) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { source, cache }
    }

    /// Usage for a stop, from cache when available.
    pub async fn get_usage(&self, stop_code: &str) -> Result<UsageEntry, RealtimeError> {
        if let Some(cached) = self.cache.get(stop_code).await {
            return Ok(cached);
        }

        let entry = Arc::new(self.source.usage(stop_code).await?);
        debug!(stop_code, points = entry.len(), "caching ridership data");
        self.cache.insert(stop_code.to_string(), entry.clone()).await;

        Ok(entry)
    }

    /// Get cache statistics.
    pub fn cache_entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_cache(&self) {
        self.cache.invalidate_all();
    }
}

impl<S: UsageSource> UsageSource for CachedUsageSource<S> {
    fn usage<'a>(
        &'a self,
        stop_code: &'a str,
    ) -> BoxFuture<'a, Result<Vec<UsagePoint>, RealtimeError>> {
        Box::pin(async move { Ok(self.get_usage(stop_code).await?.as_ref().clone()) })
    }
}
