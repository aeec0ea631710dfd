//! Aggregate queries over the ClickHouse fact tables.
//!
//! - `rb_pdp_olap`: one row per SKU / location / platform / day with sales,
//!   ad spend and an availability flag
//! - `rb_kw`: one row per keyword search impression with its rank and
//!   sponsored flag

use anyhow::Context;
use clickhouse::query::Query;

use crate::analytics::{AvailabilityFilter, DashboardFilter, DateRange, DimensionClause, Placeholder};
use crate::db::{
    clickhouse::ClickhouseClient,
    models::{AvailabilityCell, MonthlyOfftake, PeriodTotals, SearchShare},
};

fn bind_values(mut query: Query, values: &[String]) -> Query {
    for value in values {
        query = query.bind(value.as_str());
    }
    query
}

fn sales_clause(filter: &DashboardFilter) -> DimensionClause {
    DimensionClause::build(
        &[
            (&filter.platform, "platform"),
            (&filter.brand, "brand"),
            (&filter.location, "location"),
        ],
        Placeholder::Positional,
    )
}

/// SQL text with its `?` values in bind order.
#[derive(Debug)]
struct Statement {
    sql: String,
    values: Vec<String>,
}

fn search_share_statement(filter: &DashboardFilter, range: &DateRange, rank_window: u32) -> Statement {
    let brand_match = if filter.brand.is_all() { "1" } else { "brand = ?" };
    let clause = DimensionClause::build(
        &[(&filter.platform, "platform"), (&filter.location, "location")],
        Placeholder::Positional,
    );

    let sql = format!(
        r#"
        SELECT
            countIf({brand}) AS brand_impressions,
            count() AS total_impressions,
            countIf({brand} AND is_sponsored = 0) AS brand_organic,
            countIf(is_sponsored = 0) AS total_organic,
            countIf({brand} AND is_sponsored = 1) AS brand_paid,
            countIf(is_sponsored = 1) AS total_paid
        FROM rb_kw
        WHERE crawl_date BETWEEN toDate(?) AND toDate(?)
          AND search_rank <= {rank_window}{dims}
        "#,
        brand = brand_match,
        rank_window = rank_window,
        dims = clause.sql
    );

    // Placeholders appear in text order: brand (once per countIf), dates, dimensions
    let mut values = Vec::new();
    if !filter.brand.is_all() {
        values.extend(std::iter::repeat(filter.brand.as_str().to_string()).take(3));
    }
    let (start, end) = range.bounds();
    values.push(start);
    values.push(end);
    values.extend(clause.values);

    Statement { sql, values }
}

impl ClickhouseClient {
    /// Offtake, ad spend and availability totals for one period
    pub async fn get_period_totals(
        &self,
        filter: &DashboardFilter,
        range: &DateRange,
    ) -> anyhow::Result<PeriodTotals> {
        let clause = sales_clause(filter);
        let sql = format!(
            r#"
            SELECT
                toFloat64(sum(sales)) AS offtake,
                toFloat64(sum(ad_spend)) AS ad_spend,
                countIf(is_available = 1) AS available,
                count() AS listings
            FROM rb_pdp_olap
            WHERE date BETWEEN toDate(?) AND toDate(?){}
            "#,
            clause.sql
        );

        let (start, end) = range.bounds();
        let query = self.client.query(&sql).bind(start).bind(end);

        bind_values(query, &clause.values)
            .fetch_one::<PeriodTotals>()
            .await
            .with_context(|| format!("Failed to load period totals for {}..{}", range.start, range.end))
    }

    /// Brand share of keyword impressions ranked within `rank_window`.
    ///
    /// The brand is the numerator, not a filter: the denominator is every
    /// impression on the selected platform/location.
    pub async fn get_search_share(
        &self,
        filter: &DashboardFilter,
        range: &DateRange,
        rank_window: u32,
    ) -> anyhow::Result<SearchShare> {
        let statement = search_share_statement(filter, range, rank_window);

        bind_values(self.client.query(&statement.sql), &statement.values)
            .fetch_one::<SearchShare>()
            .await
            .with_context(|| format!("Failed to load search share for {}..{}", range.start, range.end))
    }

    /// Offtake and ad spend per calendar month within `range`, oldest first.
    /// Months without sales are absent.
    pub async fn get_monthly_offtake(
        &self,
        filter: &DashboardFilter,
        range: &DateRange,
    ) -> anyhow::Result<Vec<MonthlyOfftake>> {
        let clause = sales_clause(filter);
        let sql = format!(
            r#"
            SELECT
                formatDateTime(toStartOfMonth(date), '%Y-%m') AS month,
                toFloat64(sum(sales)) AS offtake,
                toFloat64(sum(ad_spend)) AS ad_spend
            FROM rb_pdp_olap
            WHERE date BETWEEN toDate(?) AND toDate(?){}
            GROUP BY month
            ORDER BY month
            "#,
            clause.sql
        );

        let (start, end) = range.bounds();
        let query = self.client.query(&sql).bind(start).bind(end);

        bind_values(query, &clause.values)
            .fetch_all::<MonthlyOfftake>()
            .await
            .context("Failed to load monthly offtake")
    }

    /// Availability counts per brand / SKU / city / day over the last `day_range` days
    pub async fn get_availability_cells(
        &self,
        filter: &AvailabilityFilter,
    ) -> anyhow::Result<Vec<AvailabilityCell>> {
        let clause = DimensionClause::build(
            &[(&filter.platform, "platform"), (&filter.brand, "brand")],
            Placeholder::Positional,
        );

        let sql = format!(
            r#"
            SELECT
                brand,
                sku_id,
                anyLast(sku_name) AS product_name,
                location AS city,
                toString(date) AS day,
                countIf(is_available = 1) AS available,
                count() AS listings
            FROM rb_pdp_olap
            WHERE date > today() - ?{}
            GROUP BY brand, sku_id, city, day
            ORDER BY brand, sku_id, city, day
            "#,
            clause.sql
        );

        let query = self.client.query(&sql).bind(filter.day_range);

        bind_values(query, &clause.values)
            .fetch_all::<AvailabilityCell>()
            .await
            .with_context(|| format!("Failed to load availability for last {} days", filter.day_range))
    }
}
