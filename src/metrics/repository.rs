use std::future::Future;

use crate::db::{models::KeyMetric, PostgresClient};

/// Persistent storage behind [`KeyMetricStore`](super::KeyMetricStore).
pub trait MetricRepository: Send + Sync + 'static {
    fn fetch_metric(&self, key: &str) -> impl Future<Output = anyhow::Result<Option<String>>> + Send;

    /// All metrics; ordering is not relied upon.
    fn fetch_all_metrics(&self) -> impl Future<Output = anyhow::Result<Vec<KeyMetric>>> + Send;

    /// Insert or replace by key.
    fn upsert_metric(&self, key: &str, value: &str) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Returns whether a row existed.
    fn remove_metric(&self, key: &str) -> impl Future<Output = anyhow::Result<bool>> + Send;
}

impl MetricRepository for PostgresClient {
    async fn fetch_metric(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.get_key_metric(key).await
    }

    async fn fetch_all_metrics(&self) -> anyhow::Result<Vec<KeyMetric>> {
        self.get_key_metrics().await
    }

    async fn upsert_metric(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.set_key_metric(key, value).await
    }

    async fn remove_metric(&self, key: &str) -> anyhow::Result<bool> {
        self.delete_key_metric(key).await
    }
}
