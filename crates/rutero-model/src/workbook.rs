use serde::{Deserialize, Serialize};

use crate::Sheet;

/// An ordered collection of named sheets loaded from one durable file.
///
/// Sheet names are unique within a workbook; sheet order is preserved across
/// a load/save cycle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Create a new empty workbook.
    pub fn new() -> Self {
        Self { sheets: Vec::new() }
    }

    /// Append a sheet, keeping insertion order.
    pub fn push_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    /// Look up a sheet by exact name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Mutable lookup by exact name.
    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }

    /// Select the working sheet: the first sheet whose name contains `marker`
    /// case-insensitively, falling back to the first sheet when no name
    /// matches. `None` only for a workbook with no sheets at all.
    pub fn select_by_marker(&self, marker: &str) -> Option<&Sheet> {
        let marker = marker.to_uppercase();
        self.sheets
            .iter()
            .find(|s| s.name.to_uppercase().contains(&marker))
            .or_else(|| self.sheets.first())
    }
}
