//! Session result cache for provider queries
//!
//! Successful results are memoized per (batch, query parameters) for the life
//! of the process or until cleared. Failed lookups are not stored, so the same
//! batch is queried again on the next run.

use kwtrends_common::{Batch, FetchError, QueryParams, TrendsRow};
use moka::future::Cache;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Cache key: the exact keyword group and the query it was sent with
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct CacheKey {
    pub batch: Batch,
    pub params: QueryParams,
}

impl CacheKey {
    /// Create a key for `batch` queried with `params`
    pub fn new(batch: &Batch, params: &QueryParams) -> Self {
        Self {
            batch: batch.clone(),
            params: params.clone(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}:{}:{}",
            self.batch, self.params.geo, self.params.timeframe, self.params.language
        )
    }
}

/// Cache performance metrics
#[derive(Debug, Default)]
pub struct CacheMetrics {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub invalidations: AtomicU64,
}

impl CacheMetrics {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Share of lookups answered from the cache
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed) as f64;
        let total = hits + self.misses.load(Ordering::Relaxed) as f64;
        if total > 0.0 {
            hits / total
        } else {
            0.0
        }
    }

    pub fn get_stats(&self) -> HashMap<String, u64> {
        let mut stats = HashMap::new();
        stats.insert("hits".to_string(), self.hits.load(Ordering::Relaxed));
        stats.insert("misses".to_string(), self.misses.load(Ordering::Relaxed));
        stats.insert("invalidations".to_string(), self.invalidations.load(Ordering::Relaxed));
        stats
    }
}

/// Outcome of a cache lookup
#[derive(Debug, Clone)]
pub struct CachedRows {
    pub rows: Arc<Vec<TrendsRow>>,
    /// Whether the rows came from the cache rather than the provider
    pub hit: bool,
}

/// Memoizes provider results keyed by [`CacheKey`]
#[derive(Clone)]
pub struct ResultCache {
    cache: Cache<CacheKey, Arc<Vec<TrendsRow>>>,
    metrics: Arc<CacheMetrics>,
}

impl ResultCache {
    /// Create an empty, unbounded cache without expiry
    pub fn new() -> Self {
        Self {
            cache: Cache::builder().build(),
            metrics: Arc::new(CacheMetrics::default()),
        }
    }

    /// Return the cached rows for `key`, or run `fetch` and store its result
    /// when it succeeds. Concurrent callers with the same key share one fetch.
    #[instrument(skip(self, fetch), fields(key = %key))]
    pub async fn get_or_fetch<F>(&self, key: CacheKey, fetch: F) -> Result<CachedRows, FetchError>
    where
        F: Future<Output = Result<Vec<TrendsRow>, FetchError>>,
    {
        if let Some(rows) = self.cache.get(&key).await {
            debug!("Cache hit");
            self.metrics.record_hit();
            return Ok(CachedRows { rows, hit: true });
        }

        debug!("Cache miss");
        self.metrics.record_miss();
        let rows = self
            .cache
            .try_get_with(key, async { fetch.await.map(Arc::new) })
            .await
            .map_err(|e| (*e).clone())?;

        Ok(CachedRows { rows, hit: false })
    }

    /// Cached rows for `key`, if any
    pub async fn get(&self, key: &CacheKey) -> Option<Arc<Vec<TrendsRow>>> {
        self.cache.get(key).await
    }

    /// Drop every cached result
    #[instrument(skip(self))]
    pub async fn clear(&self) {
        self.cache.run_pending_tasks().await;
        let entry_count = self.cache.entry_count();
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        self.metrics.invalidations.fetch_add(entry_count, Ordering::Relaxed);
        info!("Cleared {} cached results", entry_count);
    }

    /// Number of cached results
    pub async fn len(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    /// Whether nothing is cached
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Cache metrics
    pub fn metrics(&self) -> Arc<CacheMetrics> {
        Arc::clone(&self.metrics)
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultCache")
            .field("entries", &self.cache.entry_count())
            .field("metrics", &self.metrics)
            .finish()
    }
}
