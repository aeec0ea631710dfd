//! TTL cache-or-compute helper shared by the request handlers.

use std::{future::Future, hash::Hash, sync::Arc, time::Duration};

use moka::future::Cache;

/// A TTL-bounded cache whose misses are filled by an async loader.
///
/// Concurrent misses for the same key share one loader run. Only successful
/// loads are stored, so a failed load is retried by the next caller.
#[derive(Clone)]
pub struct QueryCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Cache<K, V>,
}

impl<K, V> QueryCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();
        Self { inner }
    }

    /// Return the cached value for `key`, or run `loader` and cache its result.
    pub async fn get_or_load<F>(&self, key: K, loader: F) -> anyhow::Result<V>
    where
        F: Future<Output = anyhow::Result<V>>,
    {
        self.inner
            .try_get_with(key, loader)
            .await
            .map_err(|e: Arc<anyhow::Error>| anyhow::anyhow!("{:#}", e))
    }

    pub async fn invalidate(&self, key: &K) {
        self.inner.invalidate(key).await;
    }
}
