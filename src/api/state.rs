use std::{sync::Arc, time::Duration};

use crate::{
    analytics::WatchtowerSummary,
    cache::QueryCache,
    config::Settings,
    db::{models::Dimension, Database, PostgresClient},
    metrics::KeyMetricStore,
};

/// Slow-changing listings cached in front of the relational store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKey {
    Dimension(Dimension),
    Zones,
}

/// Shared request state, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub db: Database,
    pub metrics: Arc<KeyMetricStore<PostgresClient>>,
    /// Watchtower summaries keyed by [`DashboardFilter::cache_key`](crate::analytics::DashboardFilter::cache_key)
    pub summaries: QueryCache<String, Arc<WatchtowerSummary>>,
    pub lookups: QueryCache<LookupKey, Arc<Vec<String>>>,
}

impl AppState {
    pub fn new(settings: Arc<Settings>, db: Database) -> Self {
        let cache = &settings.cache;
        let response_ttl = Duration::from_secs(cache.response_ttl_secs);

        let metrics = KeyMetricStore::new(
            db.postgres.clone(),
            Duration::from_secs(cache.metric_ttl_secs),
            cache.max_capacity,
        );

        Self {
            summaries: QueryCache::new(response_ttl, cache.max_capacity),
            lookups: QueryCache::new(response_ttl, 16),
            metrics: Arc::new(metrics),
            db,
            settings,
        }
    }
}
