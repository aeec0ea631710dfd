//! Safe arithmetic for KPI ratios and period-over-period deltas.

use serde::Serialize;

use crate::utils::format_change;

/// Divide, returning 0 when the denominator is zero or the result is not finite.
#[inline]
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let result = numerator / denominator;
    if result.is_finite() {
        result
    } else {
        0.0
    }
}

/// `part` as a percentage of `whole`, 0 when `whole` is zero.
#[inline]
pub fn safe_pct(part: f64, whole: f64) -> f64 {
    safe_div(part, whole) * 100.0
}

/// Percentage change from `previous` to `current`.
///
/// Returns `None` when there is no base to compare against (`previous == 0`).
/// A negative base is measured by magnitude so that moving from -10 to -5
/// reads as an improvement.
pub fn pct_change(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
        return None;
    }
    Some((current - previous) / previous.abs() * 100.0)
}

/// A KPI value with its prior-period and year-ago comparisons.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDelta {
    pub value: f64,
    pub previous: f64,
    pub year_ago: f64,
    /// Change against the immediately preceding period of equal length
    pub mom_change: Option<f64>,
    pub yoy_change: Option<f64>,
    pub display: String,
    pub mom_display: String,
    pub yoy_display: String,
}

impl MetricDelta {
    pub fn new(value: f64, previous: f64, year_ago: f64, display: String) -> Self {
        let mom_change = pct_change(value, previous);
        let yoy_change = pct_change(value, year_ago);
        Self {
            value,
            previous,
            year_ago,
            mom_change,
            yoy_change,
            display,
            mom_display: format_change(mom_change),
            yoy_display: format_change(yoy_change),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_div_zero_denominator() {
        assert_eq!(safe_div(10.0, 0.0), 0.0);
        assert_eq!(safe_div(0.0, 0.0), 0.0);
        assert_eq!(safe_div(10.0, 4.0), 2.5);
    }

    #[test]
    fn test_safe_pct() {
        assert_eq!(safe_pct(25.0, 200.0), 12.5);
        assert_eq!(safe_pct(5.0, 0.0), 0.0);
    }

    #[test]
    fn test_pct_change() {
        assert_eq!(pct_change(150.0, 100.0), Some(50.0));
        assert_eq!(pct_change(50.0, 100.0), Some(-50.0));
        assert_eq!(pct_change(10.0, 0.0), None);
        assert_eq!(pct_change(-5.0, -10.0), Some(50.0));
    }

    #[test]
    fn test_metric_delta_changes() {
        let delta = MetricDelta::new(120.0, 100.0, 0.0, "120".to_string());
        assert_eq!(delta.mom_change, Some(20.0));
        assert_eq!(delta.yoy_change, None);
        assert_eq!(delta.mom_display, "+20.0%");
        assert_eq!(delta.yoy_display, "-");
    }
}
