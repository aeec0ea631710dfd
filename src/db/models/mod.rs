mod content;
mod dimension;
mod fact;
mod key_metric;

pub use content::SkuContent;
pub use dimension::Dimension;
pub use fact::{AvailabilityCell, MonthlyOfftake, PeriodTotals, SearchShare};
pub use key_metric::KeyMetric;
