//! Aggregate rows read from the ClickHouse fact tables.

use clickhouse::Row;
use serde::Deserialize;

use crate::analytics::{safe_div, safe_pct};

/// Sales and availability totals for one period (`rb_pdp_olap`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Row, Deserialize)]
pub struct PeriodTotals {
    pub offtake: f64,
    pub ad_spend: f64,
    /// SKU-location-day listings that were purchasable
    pub available: u64,
    pub listings: u64,
}

impl PeriodTotals {
    /// Return on ad spend
    pub fn roas(&self) -> f64 {
        safe_div(self.offtake, self.ad_spend)
    }

    /// On-shelf availability %
    pub fn osa(&self) -> f64 {
        safe_pct(self.available as f64, self.listings as f64)
    }

    /// Daily run rate over a period of `days`
    pub fn drr(&self, days: i64) -> f64 {
        safe_div(self.offtake, days as f64)
    }
}

/// Keyword impression counts inside the ranked window for one period (`rb_kw`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Row, Deserialize)]
pub struct SearchShare {
    pub brand_impressions: u64,
    pub total_impressions: u64,
    pub brand_organic: u64,
    pub total_organic: u64,
    pub brand_paid: u64,
    pub total_paid: u64,
}

impl SearchShare {
    pub fn overall(&self) -> f64 {
        safe_pct(self.brand_impressions as f64, self.total_impressions as f64)
    }

    pub fn organic(&self) -> f64 {
        safe_pct(self.brand_organic as f64, self.total_organic as f64)
    }

    pub fn paid(&self) -> f64 {
        safe_pct(self.brand_paid as f64, self.total_paid as f64)
    }
}

/// Offtake for one calendar month, `month` formatted `YYYY-MM`.
#[derive(Debug, Clone, PartialEq, Row, Deserialize)]
pub struct MonthlyOfftake {
    pub month: String,
    pub offtake: f64,
    pub ad_spend: f64,
}

/// Availability counts for one brand / SKU / city / day.
#[derive(Debug, Clone, PartialEq, Eq, Row, Deserialize)]
pub struct AvailabilityCell {
    pub brand: String,
    pub sku_id: String,
    pub product_name: String,
    pub city: String,
    /// `YYYY-MM-DD`
    pub day: String,
    pub available: u64,
    pub listings: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_ratios() {
        let totals = PeriodTotals {
            offtake: 3000.0,
            ad_spend: 600.0,
            available: 90,
            listings: 120,
        };
        assert_eq!(totals.roas(), 5.0);
        assert_eq!(totals.osa(), 75.0);
        assert_eq!(totals.drr(30), 100.0);
    }

    #[test]
    fn test_empty_period_is_zero_not_nan() {
        let totals = PeriodTotals::default();
        assert_eq!(totals.roas(), 0.0);
        assert_eq!(totals.osa(), 0.0);
        assert_eq!(SearchShare::default().overall(), 0.0);
    }
}
