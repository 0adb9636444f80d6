use crate::{Sheet, ROUTE};

/// Derive the working subset of `sheet` for one route partition.
///
/// A row matches when its `Route` cell's display form equals `route`, so both
/// numeric and text route columns work. Row order is preserved and the same
/// input always yields the same output. A sheet with no `Route` column is
/// returned unchanged (no filtering).
pub fn filter_by_route(sheet: &Sheet, route: &str) -> Sheet {
    let Some(col) = sheet.column_index(ROUTE) else {
        return sheet.clone();
    };
    let mut filtered = Sheet::new(sheet.name.clone(), sheet.columns.clone());
    for row in &sheet.rows {
        if row.get(col).is_some_and(|cell| cell.display() == route) {
            filtered.rows.push(row.clone());
        }
    }
    filtered
}
