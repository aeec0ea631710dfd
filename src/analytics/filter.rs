//! Dashboard filters and the SQL fragments they render to.
//!
//! Query parameters are never rejected: missing or malformed values fall back
//! to their defaults, and any dimension set to `All` (or left empty) is simply
//! not filtered on.

use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize, Serializer};

use crate::analytics::period::DateRange;
use crate::config::AnalyticsSettings;

pub const ALL: &str = "All";

const MAX_MONTHS: u32 = 24;
const MAX_DAY_RANGE: u32 = 90;

/// A dimension filter value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Selection::All,
            Some(v) if v.eq_ignore_ascii_case(ALL) => Selection::All,
            Some(v) => Selection::Only(v.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Selection::All => ALL,
            Selection::Only(v) => v,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

impl Serialize for Selection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Bind placeholder style of the target store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// ClickHouse `?`
    Positional,
    /// Postgres `$n`, numbering from the given index
    Numbered(usize),
}

/// ` AND col = ?` conditions for every filtered dimension, plus the values to bind in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimensionClause {
    pub sql: String,
    pub values: Vec<String>,
}

impl DimensionClause {
    pub fn build(columns: &[(&Selection, &str)], placeholder: Placeholder) -> Self {
        let mut clause = DimensionClause::default();

        for (selection, column) in columns {
            if let Selection::Only(value) = selection {
                let marker = match placeholder {
                    Placeholder::Positional => "?".to_string(),
                    Placeholder::Numbered(start) => format!("${}", start + clause.values.len()),
                };
                clause.sql.push_str(&format!(" AND {} = {}", column, marker));
                clause.values.push(value.clone());
            }
        }

        clause
    }
}

/// Raw `/api/watchtower/summary` query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQuery {
    pub platform: Option<String>,
    pub brand: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub months: Option<String>,
}

/// Fully resolved dashboard filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardFilter {
    pub platform: Selection,
    pub brand: Selection,
    pub location: Selection,
    pub range: DateRange,
    /// Length of the monthly trend
    pub months: u32,
}

impl DashboardQuery {
    pub fn resolve(&self, today: NaiveDate, defaults: &AnalyticsSettings) -> DashboardFilter {
        let end = parse_date("endDate", self.end_date.as_deref()).unwrap_or(today);
        let range = match parse_date("startDate", self.start_date.as_deref()) {
            Some(start) => DateRange::new(start, end),
            None => DateRange::ending_on(end, defaults.default_period_days),
        };

        DashboardFilter {
            platform: Selection::parse(self.platform.as_deref()),
            brand: Selection::parse(self.brand.as_deref()),
            location: Selection::parse(self.location.as_deref()),
            range,
            months: parse_bounded(
                "months",
                self.months.as_deref(),
                defaults.default_months,
                MAX_MONTHS,
            ),
        }
    }
}

impl DashboardFilter {
    /// Stable key for response caching.
    pub fn cache_key(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}",
            self.platform.as_str(),
            self.brand.as_str(),
            self.location.as_str(),
            self.range.start,
            self.range.end,
            self.months
        )
    }
}

/// Raw `/api/availability-analysis/brand-sku-city-day` query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub day_range: Option<String>,
    pub platform: Option<String>,
    pub brand: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityFilter {
    pub day_range: u32,
    pub platform: Selection,
    pub brand: Selection,
}

impl AvailabilityQuery {
    pub fn resolve(&self, defaults: &AnalyticsSettings) -> AvailabilityFilter {
        AvailabilityFilter {
            day_range: parse_bounded(
                "dayRange",
                self.day_range.as_deref(),
                defaults.default_day_range,
                MAX_DAY_RANGE,
            ),
            platform: Selection::parse(self.platform.as_deref()),
            brand: Selection::parse(self.brand.as_deref()),
        }
    }
}

/// `/api/content-analysis` query string.
#[derive(Debug, Default, Deserialize)]
pub struct ContentQuery {
    pub platform: Option<String>,
    pub brand: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentFilter {
    pub platform: Selection,
    pub brand: Selection,
}

impl ContentQuery {
    pub fn resolve(&self) -> ContentFilter {
        ContentFilter {
            platform: Selection::parse(self.platform.as_deref()),
            brand: Selection::parse(self.brand.as_deref()),
        }
    }
}

/// Accepts `YYYY-MM-DD` or an ISO timestamp starting with one.
fn parse_date(name: &str, raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    let date_part = raw.get(..10).unwrap_or(raw);
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            warn!("Ignoring malformed {} '{}': {}", name, raw, e);
            None
        },
    }
}

fn parse_bounded(name: &str, raw: Option<&str>, default: u32, max: u32) -> u32 {
    let value = match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => default,
        Some(s) => s.parse::<u32>().unwrap_or_else(|e| {
            warn!("Ignoring malformed {} '{}': {}", name, s, e);
            default
        }),
    };
    value.clamp(1, max)
}
