use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CellValue;

/// Unique merge key for client rows.
pub const CUSTOMER_CODE: &str = "Customer Code";
/// Client display name column.
pub const CUSTOMER_NAME: &str = "Customer Full Name";
/// Client address column.
pub const ADDRESS: &str = "Address";
/// Optional route partition column.
pub const ROUTE: &str = "Route";

/// A column the caller requires is not part of the sheet schema.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("column `{missing_column}` is not present in the sheet")]
pub struct SchemaError {
    pub missing_column: String,
}

/// One named table: an ordered column schema plus data rows.
///
/// Row cells are positionally aligned with `columns`. Column order and row
/// order are significant for round-tripping and must be preserved by codecs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Create an empty sheet with a fixed column schema.
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// True when the sheet holds no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `name` in the column schema.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Like [`Sheet::column_index`] but a missing column is an error.
    pub fn require_column(&self, name: &str) -> Result<usize, SchemaError> {
        self.column_index(name).ok_or_else(|| SchemaError {
            missing_column: name.to_string(),
        })
    }

    /// Append a data row, padding short rows with empty cells so every row is
    /// at least as wide as the column schema. Wider rows are kept as-is.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        if row.len() < self.columns.len() {
            row.resize(self.columns.len(), CellValue::Empty);
        }
        self.rows.push(row);
    }

    /// Cell at `(row, column-name)`, if both exist.
    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.get(col)
    }

    /// Display form of the cell, or an empty string when the row or column is
    /// absent. Convenience for presentation fields that tolerate gaps.
    pub fn display_value(&self, row: usize, column: &str) -> String {
        self.value(row, column)
            .map(CellValue::display)
            .unwrap_or_default()
    }

    /// Display form of a row's merge key.
    pub fn key_of(&self, row: usize) -> Result<String, SchemaError> {
        let col = self.require_column(CUSTOMER_CODE)?;
        Ok(self
            .rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(CellValue::display)
            .unwrap_or_default())
    }

    /// Locate the row whose merge key displays as `code`.
    pub fn find_by_key(&self, code: &str) -> Result<Option<usize>, SchemaError> {
        let col = self.require_column(CUSTOMER_CODE)?;
        Ok(self
            .rows
            .iter()
            .position(|row| row.get(col).is_some_and(|cell| cell.display() == code)))
    }

    /// Merge-key values that appear more than once.
    ///
    /// Duplicate keys break merge-by-key semantics; loaders treat a non-empty
    /// result as a malformed workbook. A sheet without the key column reports
    /// no duplicates.
    pub fn duplicate_keys(&self) -> Vec<String> {
        let Some(col) = self.column_index(CUSTOMER_CODE) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        let mut dupes = Vec::new();
        for row in &self.rows {
            let Some(cell) = row.get(col) else { continue };
            if cell.is_empty() {
                continue;
            }
            let key = cell.display();
            if !seen.insert(key.clone()) && !dupes.contains(&key) {
                dupes.push(key);
            }
        }
        dupes
    }
}
