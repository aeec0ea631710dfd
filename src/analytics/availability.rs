//! Brand × SKU × city × day on-shelf availability grid.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::analytics::{delta::safe_pct, filter::AvailabilityFilter};
use crate::db::models::AvailabilityCell;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRow {
    pub brand: String,
    pub sku_id: String,
    pub sku_name: String,
    pub city: String,
    /// OSA % keyed by `YYYY-MM-DD`; days without listings are absent
    pub cells: BTreeMap<String, f64>,
    /// OSA % over all listings of the row
    pub average: f64,
    #[serde(skip)]
    available: u64,
    #[serde(skip)]
    listings: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityGrid {
    pub filters: AvailabilityFilter,
    /// Column labels, ascending
    pub days: Vec<String>,
    pub rows: Vec<AvailabilityRow>,
}

pub fn pivot_availability(filter: &AvailabilityFilter, cells: Vec<AvailabilityCell>) -> AvailabilityGrid {
    let mut days = BTreeSet::new();
    let mut index: FxHashMap<(String, String, String), usize> = FxHashMap::default();
    let mut rows: Vec<AvailabilityRow> = Vec::new();

    for cell in cells {
        days.insert(cell.day.clone());

        let key = (cell.brand.clone(), cell.sku_id.clone(), cell.city.clone());
        let position = *index.entry(key).or_insert_with(|| {
            rows.push(AvailabilityRow {
                brand: cell.brand.clone(),
                sku_id: cell.sku_id.clone(),
                sku_name: cell.product_name.clone(),
                city: cell.city.clone(),
                cells: BTreeMap::new(),
                average: 0.0,
                available: 0,
                listings: 0,
            });
            rows.len() - 1
        });

        let row = &mut rows[position];
        row.available += cell.available;
        row.listings += cell.listings;
        row.cells.insert(
            cell.day,
            safe_pct(cell.available as f64, cell.listings as f64),
        );
    }

    for row in &mut rows {
        row.average = safe_pct(row.available as f64, row.listings as f64);
    }

    rows.sort_by(|a, b| {
        (&a.brand, &a.sku_id, &a.city).cmp(&(&b.brand, &b.sku_id, &b.city))
    });

    AvailabilityGrid {
        filters: filter.clone(),
        days: days.into_iter().collect(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::filter::Selection;

    fn cell(brand: &str, sku: &str, city: &str, day: &str, available: u64, listings: u64) -> AvailabilityCell {
        AvailabilityCell {
            brand: brand.to_string(),
            sku_id: sku.to_string(),
            product_name: format!("{} {}", brand, sku),
            city: city.to_string(),
            day: day.to_string(),
            available,
            listings,
        }
    }

    fn filter() -> AvailabilityFilter {
        AvailabilityFilter {
            day_range: 7,
            platform: Selection::All,
            brand: Selection::All,
        }
    }

    #[test]
    fn test_pivot_groups_and_averages() {
        let grid = pivot_availability(
            &filter(),
            vec![
                cell("Amul", "S2", "Pune", "2024-03-02", 1, 2),
                cell("Amul", "S1", "Delhi", "2024-03-01", 3, 4),
                cell("Amul", "S1", "Delhi", "2024-03-02", 1, 4),
            ],
        );

        assert_eq!(grid.days, vec!["2024-03-01", "2024-03-02"]);
        assert_eq!(grid.rows.len(), 2);

        let first = &grid.rows[0];
        assert_eq!(first.sku_id, "S1");
        assert_eq!(first.cells.get("2024-03-01"), Some(&75.0));
        assert_eq!(first.cells.get("2024-03-02"), Some(&25.0));
        assert_eq!(first.average, 50.0);

        let second = &grid.rows[1];
        assert_eq!(second.city, "Pune");
        assert_eq!(second.cells.get("2024-03-01"), None);
    }

    #[test]
    fn test_empty_input() {
        let grid = pivot_availability(&filter(), vec![]);
        assert!(grid.days.is_empty());
        assert!(grid.rows.is_empty());
    }
}
