use log::error;
use postgres_types::ToSql;

use crate::analytics::{ContentFilter, DimensionClause, Placeholder};
use crate::db::models::{Dimension, KeyMetric, SkuContent};
use crate::db::postgres::PostgresClient;

impl PostgresClient {
    // ==================== KEY METRICS ====================

    /// Get a single metric value by key
    pub async fn get_key_metric(&self, key: &str) -> anyhow::Result<Option<String>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt("SELECT value FROM key_metrics WHERE key = $1", &[&key])
            .await?;

        Ok(row.map(|r| r.get("value")))
    }

    /// Get all metrics ordered by key
    pub async fn get_key_metrics(&self) -> anyhow::Result<Vec<KeyMetric>> {
        let client = self.pool.get().await?;
        let rows = client
            .query("SELECT key, value FROM key_metrics ORDER BY key ASC", &[])
            .await?;

        Ok(rows
            .iter()
            .map(|row| KeyMetric {
                key: row.get("key"),
                value: row.get("value"),
            })
            .collect())
    }

    /// Insert or update a metric
    pub async fn set_key_metric(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let client = self.pool.get().await?;
        let query = r#"
            INSERT INTO key_metrics (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET
                value = EXCLUDED.value
        "#;

        client
            .execute(query, &[&key, &value])
            .await
            .map_err(|e| {
                error!("Failed to upsert key metric {}: {:?}", key, e);
                e
            })?;

        Ok(())
    }

    /// Delete a metric, returning whether a row was removed
    pub async fn delete_key_metric(&self, key: &str) -> anyhow::Result<bool> {
        let client = self.pool.get().await?;
        let deleted = client
            .execute("DELETE FROM key_metrics WHERE key = $1", &[&key])
            .await?;

        Ok(deleted > 0)
    }

    // ==================== DIMENSIONS ====================

    /// Distinct non-empty values of a dimension table, sorted
    pub async fn get_dimension_values(&self, dimension: Dimension) -> anyhow::Result<Vec<String>> {
        let client = self.pool.get().await?;
        let column = dimension.column();
        let query = format!(
            "SELECT DISTINCT {col} FROM {table} WHERE {col} IS NOT NULL AND {col} <> '' ORDER BY {col}",
            col = column,
            table = dimension.table()
        );

        let rows = client.query(&query, &[]).await?;
        Ok(rows.iter().map(|row| row.get(column)).collect())
    }

    // ==================== PERFORMANCE MARKETING ====================

    /// Distinct ad-performance zones, sorted
    pub async fn get_zones(&self) -> anyhow::Result<Vec<String>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT DISTINCT zone FROM rb_zone_ad_performance \
                 WHERE zone IS NOT NULL AND zone <> '' ORDER BY zone",
                &[],
            )
            .await?;

        Ok(rows.iter().map(|row| row.get("zone")).collect())
    }

    // ==================== CONTENT ====================

    /// SKU listing content for the given platform/brand
    pub async fn get_sku_content(&self, filter: &ContentFilter) -> anyhow::Result<Vec<SkuContent>> {
        let client = self.pool.get().await?;
        let clause = DimensionClause::build(
            &[(&filter.platform, "platform"), (&filter.brand, "brand")],
            Placeholder::Numbered(1),
        );

        let query = format!(
            r#"
            SELECT
                sku_id, sku_name, brand, platform,
                image_count::int4 AS image_count,
                rating::float8 AS rating,
                review_count::int4 AS review_count,
                has_description
            FROM rca_sku_dim
            WHERE TRUE{}
            ORDER BY brand, sku_name
            "#,
            clause.sql
        );

        let params: Vec<&(dyn ToSql + Sync)> = clause
            .values
            .iter()
            .map(|v| v as &(dyn ToSql + Sync))
            .collect();

        let rows = client.query(&query, &params).await?;
        Ok(rows.iter().map(row_to_sku_content).collect())
    }
}

// ==================== HELPER FUNCTIONS ====================

fn row_to_sku_content(row: &tokio_postgres::Row) -> SkuContent {
    SkuContent {
        sku_id: row.get("sku_id"),
        sku_name: row.get("sku_name"),
        brand: row.get("brand"),
        platform: row.get("platform"),
        image_count: row.get("image_count"),
        rating: row.get("rating"),
        review_count: row.get("review_count"),
        has_description: row.get("has_description"),
    }
}
