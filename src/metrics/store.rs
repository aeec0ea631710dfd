use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use log::{debug, error};

use crate::{cache::QueryCache, db::models::KeyMetric, metrics::MetricRepository};

/// Outcome of a key-metric read.
///
/// Callers that only need the value use [`MetricLookup::into_value`], which
/// folds an unavailable store into "no value".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricLookup {
    Found(String),
    NotFound,
    Unavailable,
}

impl MetricLookup {
    pub fn status(&self) -> &'static str {
        match self {
            MetricLookup::Found(_) => "found",
            MetricLookup::NotFound => "notFound",
            MetricLookup::Unavailable => "unavailable",
        }
    }

    pub fn into_value(self) -> Option<String> {
        match self {
            MetricLookup::Found(v) => Some(v),
            MetricLookup::NotFound | MetricLookup::Unavailable => None,
        }
    }
}

/// Key metrics fronted by a TTL cache.
///
/// Reads are cache-aside: a miss queries the repository once (concurrent
/// misses share the query) and caches the answer, "not found" included.
/// Repository errors are logged and never cached or returned. Writes go
/// straight to the repository and drop the affected cache entries.
///
/// A load that overlaps a write may have read the old row. Every write bumps
/// `writes`, and a load that sees the counter move while it ran drops what it
/// cached, so the next read goes back to the repository.
pub struct KeyMetricStore<R: MetricRepository> {
    repo: Arc<R>,
    values: QueryCache<String, Option<String>>,
    listing: QueryCache<(), Arc<Vec<KeyMetric>>>,
    writes: AtomicU64,
}

impl<R: MetricRepository> KeyMetricStore<R> {
    pub fn new(repo: Arc<R>, ttl: Duration, max_capacity: u64) -> Self {
        Self {
            repo,
            values: QueryCache::new(ttl, max_capacity),
            listing: QueryCache::new(ttl, 16),
            writes: AtomicU64::new(0),
        }
    }

    pub async fn lookup_metric(&self, key: &str) -> MetricLookup {
        let repo = &self.repo;
        let seen = self.writes.load(Ordering::SeqCst);
        let loaded = self
            .values
            .get_or_load(key.to_string(), async move { repo.fetch_metric(key).await })
            .await;

        if self.writes.load(Ordering::SeqCst) != seen {
            debug!("Key metric '{}' written during load, dropping cached read", key);
            self.values.invalidate(&key.to_string()).await;
        }

        match loaded {
            Ok(Some(value)) => MetricLookup::Found(value),
            Ok(None) => MetricLookup::NotFound,
            Err(e) => {
                error!("Failed to load key metric '{}': {:#}", key, e);
                MetricLookup::Unavailable
            },
        }
    }

    pub async fn get_metric(&self, key: &str) -> Option<String> {
        self.lookup_metric(key).await.into_value()
    }

    /// Every metric as a key -> value map. Empty if the store is unavailable.
    pub async fn get_all_metrics(&self) -> BTreeMap<String, String> {
        self.load_listing()
            .await
            .map(|metrics| {
                metrics
                    .iter()
                    .map(|m| (m.key.clone(), m.value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every metric sorted ascending by key. Empty if the store is unavailable.
    pub async fn get_all_metric_keys(&self) -> Vec<KeyMetric> {
        self.load_listing()
            .await
            .map(|metrics| metrics.as_ref().clone())
            .unwrap_or_default()
    }

    pub async fn set_metric(&self, key: &str, value: &str) -> bool {
        match self.repo.upsert_metric(key, value).await {
            Ok(()) => {
                self.invalidate(key).await;
                debug!("Stored key metric '{}'", key);
                true
            },
            Err(e) => {
                error!("Failed to store key metric '{}': {:#}", key, e);
                false
            },
        }
    }

    /// Returns `true` only if a stored metric was actually removed.
    pub async fn delete_metric(&self, key: &str) -> bool {
        match self.repo.remove_metric(key).await {
            Ok(deleted) => {
                if deleted {
                    self.invalidate(key).await;
                }
                deleted
            },
            Err(e) => {
                error!("Failed to delete key metric '{}': {:#}", key, e);
                false
            },
        }
    }

    async fn load_listing(&self) -> Option<Arc<Vec<KeyMetric>>> {
        let repo = &self.repo;
        let seen = self.writes.load(Ordering::SeqCst);
        let loaded = self
            .listing
            .get_or_load((), async move {
                let mut metrics = repo.fetch_all_metrics().await?;
                metrics.sort_by(|a, b| a.key.cmp(&b.key));
                Ok::<_, anyhow::Error>(Arc::new(metrics))
            })
            .await;

        if self.writes.load(Ordering::SeqCst) != seen {
            self.listing.invalidate(&()).await;
        }

        match loaded {
            Ok(metrics) => Some(metrics),
            Err(e) => {
                error!("Failed to load key metrics: {:#}", e);
                None
            },
        }
    }

    async fn invalidate(&self, key: &str) {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.values.invalidate(&key.to_string()).await;
        self.listing.invalidate(&()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicBool, AtomicUsize},
        Mutex,
    };

    #[derive(Default)]
    struct MemoryRepository {
        rows: Mutex<BTreeMap<String, String>>,
        fetches: AtomicUsize,
        failing: AtomicBool,
        latency: Option<Duration>,
        /// Delay between reading rows and returning them
        read_delay: Option<Duration>,
    }

    impl MemoryRepository {
        fn with_rows(rows: &[(&str, &str)]) -> Self {
            let repo = Self::default();
            {
                let mut map = repo.rows.lock().unwrap();
                for (k, v) in rows {
                    map.insert(k.to_string(), v.to_string());
                }
            }
            repo
        }

        async fn simulate_io(&self) -> anyhow::Result<()> {
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            if self.failing.load(Ordering::SeqCst) {
                anyhow::bail!("connection refused");
            }
            Ok(())
        }

        async fn hold_read(&self) {
            if let Some(delay) = self.read_delay {
                tokio::time::sleep(delay).await;
            }
        }
    }

    impl MetricRepository for MemoryRepository {
        async fn fetch_metric(&self, key: &str) -> anyhow::Result<Option<String>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.simulate_io().await?;
            let value = self.rows.lock().unwrap().get(key).cloned();
            self.hold_read().await;
            Ok(value)
        }

        async fn fetch_all_metrics(&self) -> anyhow::Result<Vec<KeyMetric>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.simulate_io().await?;
            // Reverse order so the store's own sorting is exercised
            let metrics: Vec<KeyMetric> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .rev()
                .map(|(k, v)| KeyMetric::new(k.as_str(), v.as_str()))
                .collect();
            self.hold_read().await;
            Ok(metrics)
        }

        async fn upsert_metric(&self, key: &str, value: &str) -> anyhow::Result<()> {
            self.simulate_io().await?;
            self.rows
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn remove_metric(&self, key: &str) -> anyhow::Result<bool> {
            self.simulate_io().await?;
            Ok(self.rows.lock().unwrap().remove(key).is_some())
        }
    }

    fn build_store(repo: MemoryRepository) -> (Arc<MemoryRepository>, KeyMetricStore<MemoryRepository>) {
        let repo = Arc::new(repo);
        let store = KeyMetricStore::new(repo.clone(), Duration::from_secs(86_400), 100);
        (repo, store)
    }

    #[tokio::test]
    async fn test_set_then_get_returns_new_value() {
        let (_, store) = build_store(MemoryRepository::default());

        // Cache the miss first; the write must not be hidden behind it
        assert_eq!(store.get_metric("x").await, None);
        assert!(store.set_metric("x", "1").await);
        assert_eq!(store.get_metric("x").await, Some("1".to_string()));

        assert!(store.set_metric("x", "2").await);
        assert_eq!(store.get_metric("x").await, Some("2".to_string()));
    }

    #[tokio::test]
    async fn test_missing_key_is_cached_not_found() {
        let (repo, store) = build_store(MemoryRepository::default());

        assert_eq!(store.get_metric("missing-key").await, None);
        assert_eq!(store.lookup_metric("missing-key").await, MetricLookup::NotFound);
        assert_eq!(repo.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_delete_reports_removal_once() {
        let (_, store) = build_store(MemoryRepository::with_rows(&[("x", "1")]));

        assert_eq!(store.get_metric("x").await, Some("1".to_string()));
        assert!(store.delete_metric("x").await);
        assert!(!store.delete_metric("x").await);
        assert_eq!(store.get_metric("x").await, None);
    }

    #[tokio::test]
    async fn test_metric_keys_sorted_ascending() {
        let (_, store) = build_store(MemoryRepository::with_rows(&[
            ("zeta", "3"),
            ("alpha", "1"),
            ("mid", "2"),
        ]));

        let keys: Vec<String> = store
            .get_all_metric_keys()
            .await
            .into_iter()
            .map(|m| m.key)
            .collect();
        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);

        let all = store.get_all_metrics().await;
        assert_eq!(all.get("mid"), Some(&"2".to_string()));
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_listing_refreshes_after_write() {
        let (_, store) = build_store(MemoryRepository::with_rows(&[("a", "1")]));

        assert_eq!(store.get_all_metrics().await.len(), 1);
        assert!(store.set_metric("b", "2").await);
        assert_eq!(store.get_all_metrics().await.len(), 2);
        assert!(store.delete_metric("a").await);
        assert_eq!(store.get_all_metric_keys().await, vec![KeyMetric::new("b", "2")]);
    }

    #[tokio::test]
    async fn test_write_during_slow_read_is_not_hidden() {
        let (_, store) = build_store(MemoryRepository {
            read_delay: Some(Duration::from_millis(100)),
            ..MemoryRepository::with_rows(&[("x", "old")])
        });

        let (in_flight, written) = tokio::join!(store.get_metric("x"), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            store.set_metric("x", "new").await
        });

        // The overlapping read saw the row before the write landed
        assert_eq!(in_flight, Some("old".to_string()));
        assert!(written);
        assert_eq!(store.get_metric("x").await, Some("new".to_string()));
    }

    #[tokio::test]
    async fn test_write_during_slow_listing_is_not_hidden() {
        let (_, store) = build_store(MemoryRepository {
            read_delay: Some(Duration::from_millis(100)),
            ..MemoryRepository::with_rows(&[("a", "1")])
        });

        let (in_flight, written) = tokio::join!(store.get_all_metrics(), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            store.set_metric("b", "2").await
        });

        assert_eq!(in_flight.len(), 1);
        assert!(written);
        assert_eq!(store.get_all_metrics().await.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_reads_share_one_query() {
        let (repo, store) = build_store(MemoryRepository {
            latency: Some(Duration::from_millis(50)),
            ..MemoryRepository::with_rows(&[("k", "v")])
        });

        let reads = (0..10).map(|_| store.get_metric("k"));
        let results = futures::future::join_all(reads).await;

        assert!(results.iter().all(|r| r.as_deref() == Some("v")));
        assert_eq!(repo.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unavailable_store_is_swallowed_and_not_cached() {
        let (repo, store) = build_store(MemoryRepository::with_rows(&[("k", "v")]));
        repo.failing.store(true, Ordering::SeqCst);

        assert_eq!(store.lookup_metric("k").await, MetricLookup::Unavailable);
        assert_eq!(store.get_metric("k").await, None);
        assert!(store.get_all_metrics().await.is_empty());
        assert!(store.get_all_metric_keys().await.is_empty());
        assert!(!store.set_metric("k", "w").await);
        assert!(!store.delete_metric("k").await);

        repo.failing.store(false, Ordering::SeqCst);
        assert_eq!(store.get_metric("k").await, Some("v".to_string()));
    }

    #[test]
    fn test_lookup_status_labels() {
        assert_eq!(MetricLookup::Found("1".to_string()).status(), "found");
        assert_eq!(MetricLookup::NotFound.status(), "notFound");
        assert_eq!(MetricLookup::Unavailable.into_value(), None);
    }
}
