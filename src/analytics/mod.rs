//! Dashboard analytics.
//!
//! Every KPI follows the same pattern: aggregate the current period, the
//! equal-length prior period and the year-ago period with the same filter,
//! then compare with safe division.

pub mod availability;
pub mod content;
pub mod delta;
pub mod filter;
pub mod period;
pub mod summary;

pub use availability::{pivot_availability, AvailabilityGrid, AvailabilityRow};
pub use content::{analyze_content, ContentAnalysis, ContentCheck};
pub use delta::{pct_change, safe_div, safe_pct, MetricDelta};
pub use filter::{
    AvailabilityFilter, AvailabilityQuery, ContentFilter, ContentQuery, DashboardFilter,
    DashboardQuery, DimensionClause, Placeholder, Selection, ALL,
};
pub use period::{month_buckets, DateRange};
pub use summary::{build_summary, WatchtowerSummary};
