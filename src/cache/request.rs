//! Request Cache Implementation
//!
//! Keyed cache over backend calls using Moka. An entry is keyed by the
//! operation name plus the parameter object and lives until the namespace is
//! invalidated (or an optional TTL expires).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

use super::loading::LoadingCounter;
use crate::api::{ApiError, Backend};

/// One cache namespace over a backend
pub struct RequestCache {
    /// Namespace name, used in logs
    name: String,
    /// Backend the calls are issued against
    backend: Arc<dyn Backend>,
    /// Last successful result per (operation, params) key
    entries: Cache<String, Value>,
    /// Outstanding calls issued through this namespace
    loading: LoadingCounter,
    /// Cache hit counter
    hits: AtomicU64,
    /// Cache miss counter
    misses: AtomicU64,
    /// Bumped by `invalidate_all`; a call that overlaps it is not stored
    epoch: AtomicU64,
}

impl RequestCache {
    /// Create a namespace whose entries live until invalidated
    pub fn new(name: &str, backend: Arc<dyn Backend>) -> Self {
        Self::with_ttl(name, backend, None)
    }

    /// Create a namespace with an optional upper bound on entry lifetime
    ///
    /// # Arguments
    /// * `name` - Namespace name (also the Moka cache name)
    /// * `backend` - Backend the calls go to
    /// * `ttl` - Optional time-to-live for entries
    pub fn with_ttl(name: &str, backend: Arc<dyn Backend>, ttl: Option<Duration>) -> Self {
        let mut builder = Cache::builder().name(name);
        if let Some(ttl) = ttl {
            builder = builder.time_to_live(ttl);
        }

        Self {
            name: name.to_string(),
            backend,
            entries: builder.build(),
            loading: LoadingCounter::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            epoch: AtomicU64::new(0),
        }
    }

    /// Return the stored result for this call, performing it on a miss
    ///
    /// Failed calls are not stored, and neither are results of calls that
    /// were outstanding when the namespace was invalidated. Concurrent misses
    /// for the same key each reach the backend.
    pub async fn fetch_cached<P, T>(&self, operation: &str, params: &P) -> Result<T, ApiError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let params = serde_json::to_value(params)?;
        let key = cache_key(operation, &params);

        if let Some(value) = self.entries.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(namespace = %self.name, key = %key, "Cache HIT");
            return Ok(serde_json::from_value(value)?);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        trace!(namespace = %self.name, key = %key, "Cache MISS");

        let epoch = self.epoch.load(Ordering::Acquire);
        let value = self.call(operation, params).await?;
        let result = serde_json::from_value(value.clone())?;
        if self.epoch.load(Ordering::Acquire) == epoch {
            self.entries.insert(key, value);
        } else {
            debug!(namespace = %self.name, key = %key, "Namespace invalidated during call, not storing");
        }
        Ok(result)
    }

    /// Always perform the call; nothing is read from or written to the cache
    pub async fn fetch_uncached<P, T>(&self, operation: &str, params: &P) -> Result<T, ApiError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let params = serde_json::to_value(params)?;
        let value = self.call(operation, params).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn call(&self, operation: &str, params: Value) -> Result<Value, ApiError> {
        let _loading = self.loading.start();
        self.backend.call(operation, params).await
    }

    /// Drop every entry in this namespace
    pub fn invalidate_all(&self) {
        self.log_metrics();
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.entries.invalidate_all();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        debug!(namespace = %self.name, "Invalidated request cache");
    }

    /// Whether a call issued through this namespace is outstanding
    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    /// Get cache statistics
    ///
    /// Returns (hits, misses, hit_rate)
    pub fn stats(&self) -> (u64, u64, f64) {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        (hits, misses, hit_rate)
    }

    /// Log current cache metrics
    pub fn log_metrics(&self) {
        let (hits, misses, hit_rate) = self.stats();
        debug!(
            namespace = %self.name,
            hits = hits,
            misses = misses,
            hit_rate = format!("{:.1}%", hit_rate),
            entries = self.entries.entry_count(),
            "Cache metrics"
        );
    }
}

/// Key for one call: serde_json objects serialize with sorted keys, so equal
/// parameter objects give equal keys.
fn cache_key(operation: &str, params: &Value) -> String {
    format!("{}@{}", operation, params)
}
