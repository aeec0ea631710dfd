//! Reporting periods: current, prior and year-ago ranges plus month buckets.

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::Serialize;

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, swapping the bounds if they arrive reversed.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// The `days` days ending on `end` (inclusive).
    pub fn ending_on(end: NaiveDate, days: u32) -> Self {
        let span = i64::from(days.max(1)) - 1;
        Self::new(end - Duration::days(span), end)
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// The equal-length range immediately preceding this one.
    pub fn previous(&self) -> Self {
        let end = self.start - Duration::days(1);
        let start = end - Duration::days(self.days() - 1);
        Self { start, end }
    }

    /// The same calendar dates one year earlier. Feb 29 maps to Feb 28.
    pub fn year_ago(&self) -> Self {
        Self {
            start: shift_back_one_year(self.start),
            end: shift_back_one_year(self.end),
        }
    }

    /// From the first day of the month `months - 1` months before `end`, through `end`.
    pub fn trailing_months(end: NaiveDate, months: u32) -> Self {
        let first = first_of_month(end)
            .checked_sub_months(Months::new(months.max(1) - 1))
            .unwrap_or(end);
        Self { start: first, end }
    }

    /// Start and end as `YYYY-MM-DD`, the format bound into SQL.
    pub fn bounds(&self) -> (String, String) {
        (self.start.to_string(), self.end.to_string())
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn shift_back_one_year(date: NaiveDate) -> NaiveDate {
    // chrono clamps to the last valid day of the target month
    date.checked_sub_months(Months::new(12)).unwrap_or(date)
}

/// Month labels (`YYYY-MM`) for the `months` months ending with `end`'s month, oldest first.
pub fn month_buckets(end: NaiveDate, months: u32) -> Vec<String> {
    let first = first_of_month(end);
    (0..months.max(1))
        .rev()
        .filter_map(|back| first.checked_sub_months(Months::new(back)))
        .map(|d| d.format("%Y-%m").to_string())
        .collect()
}
