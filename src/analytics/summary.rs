//! Watchtower summary: headline KPIs for the selected period against the
//! prior period and the same period a year earlier, plus a monthly trend.

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::analytics::{
    delta::{safe_div, MetricDelta},
    filter::DashboardFilter,
    period::{month_buckets, DateRange},
};
use crate::db::{
    models::{MonthlyOfftake, PeriodTotals, SearchShare},
    Database,
};
use crate::utils::{format_currency, format_multiplier, format_percent};

/// Raw aggregates for one period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodSnapshot {
    pub range: DateRange,
    pub totals: PeriodTotals,
    pub search: SearchShare,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryPeriods {
    pub current: DateRange,
    pub previous: DateRange,
    pub year_ago: DateRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetrics {
    pub offtake: MetricDelta,
    pub ad_spend: MetricDelta,
    pub roas: MetricDelta,
    pub osa: MetricDelta,
    pub drr: MetricDelta,
    pub share_of_search: MetricDelta,
    pub organic_sos: MetricDelta,
    pub paid_sos: MetricDelta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// `YYYY-MM`
    pub month: String,
    pub offtake: f64,
    pub ad_spend: f64,
    pub roas: f64,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchtowerSummary {
    pub filters: DashboardFilter,
    pub periods: SummaryPeriods,
    pub metrics: SummaryMetrics,
    pub trend: Vec<TrendPoint>,
}

/// Query both periods' aggregates and the trend concurrently, then assemble.
pub async fn build_summary(
    db: &Database,
    filter: &DashboardFilter,
    rank_window: u32,
) -> anyhow::Result<WatchtowerSummary> {
    let current = filter.range;
    let previous = current.previous();
    let year_ago = current.year_ago();
    let trend_range = DateRange::trailing_months(current.end, filter.months);

    let ch = &db.clickhouse;
    let (cur_totals, prev_totals, yoy_totals, cur_search, prev_search, yoy_search, monthly) = futures::try_join!(
        ch.get_period_totals(filter, &current),
        ch.get_period_totals(filter, &previous),
        ch.get_period_totals(filter, &year_ago),
        ch.get_search_share(filter, &current, rank_window),
        ch.get_search_share(filter, &previous, rank_window),
        ch.get_search_share(filter, &year_ago, rank_window),
        ch.get_monthly_offtake(filter, &trend_range),
    )?;

    Ok(assemble_summary(
        filter,
        PeriodSnapshot {
            range: current,
            totals: cur_totals,
            search: cur_search,
        },
        PeriodSnapshot {
            range: previous,
            totals: prev_totals,
            search: prev_search,
        },
        PeriodSnapshot {
            range: year_ago,
            totals: yoy_totals,
            search: yoy_search,
        },
        &monthly,
    ))
}

pub fn assemble_summary(
    filter: &DashboardFilter,
    current: PeriodSnapshot,
    previous: PeriodSnapshot,
    year_ago: PeriodSnapshot,
    monthly: &[MonthlyOfftake],
) -> WatchtowerSummary {
    let periods = [&current, &previous, &year_ago];
    let metrics = SummaryMetrics {
        offtake: delta(periods, |p| p.totals.offtake, format_currency),
        ad_spend: delta(periods, |p| p.totals.ad_spend, format_currency),
        roas: delta(periods, |p| p.totals.roas(), format_multiplier),
        osa: delta(periods, |p| p.totals.osa(), format_percent),
        drr: delta(periods, |p| p.totals.drr(p.range.days()), format_currency),
        share_of_search: delta(periods, |p| p.search.overall(), format_percent),
        organic_sos: delta(periods, |p| p.search.organic(), format_percent),
        paid_sos: delta(periods, |p| p.search.paid(), format_percent),
    };

    WatchtowerSummary {
        filters: filter.clone(),
        periods: SummaryPeriods {
            current: current.range,
            previous: previous.range,
            year_ago: year_ago.range,
        },
        metrics,
        trend: fill_trend(filter, monthly),
    }
}

/// Evaluate `metric` on [current, previous, year-ago] and display the current value.
fn delta(
    periods: [&PeriodSnapshot; 3],
    metric: impl Fn(&PeriodSnapshot) -> f64,
    display: fn(f64) -> String,
) -> MetricDelta {
    let [current, previous, year_ago] = periods.map(metric);
    MetricDelta::new(current, previous, year_ago, display(current))
}

/// One point per month of the trend window; months without sales are zero.
fn fill_trend(filter: &DashboardFilter, monthly: &[MonthlyOfftake]) -> Vec<TrendPoint> {
    let by_month: FxHashMap<&str, &MonthlyOfftake> =
        monthly.iter().map(|m| (m.month.as_str(), m)).collect();

    month_buckets(filter.range.end, filter.months)
        .into_iter()
        .map(|month| {
            let (offtake, ad_spend) = by_month
                .get(month.as_str())
                .map(|m| (m.offtake, m.ad_spend))
                .unwrap_or((0.0, 0.0));
            TrendPoint {
                month,
                offtake,
                ad_spend,
                roas: safe_div(offtake, ad_spend),
                display: format_currency(offtake),
            }
        })
        .collect()
}
