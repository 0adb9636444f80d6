use std::collections::HashMap;

use rutero_fs::FileFingerprint;
use rutero_model::{filter_by_route, Sheet, CUSTOMER_CODE};

use crate::{LoadError, SaveError, StoreConfig};

/// Result of a successful load: the route-filtered working sheet and the
/// name of the workbook sheet it came from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadedSheet {
    pub sheet: Sheet,
    pub sheet_name: String,
}

/// Durable access to the workbook file.
///
/// Only the filtered working sheet is ever cached by callers; the full
/// workbook is deliberately re-read on every save so that external edits to
/// other sheets and other routes are never overwritten from a stale copy.
/// A [`FileFingerprint`] captured at load (and refreshed after each save)
/// closes the remaining lost-update window: a save against a file that
/// changed underneath the session aborts with
/// [`SaveError::ConcurrentModification`].
#[derive(Debug)]
pub struct SheetStore {
    config: StoreConfig,
    fingerprint: Option<FileFingerprint>,
}

impl SheetStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            fingerprint: None,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Load the working sheet: pick the sheet matching the configured name
    /// marker (first sheet as fallback), apply the route filter, and snapshot
    /// the file fingerprint.
    ///
    /// Duplicate merge keys in the selected sheet break merge-by-key
    /// semantics and are reported as [`LoadError::Malformed`].
    pub fn load(&mut self) -> Result<LoadedSheet, LoadError> {
        let path = self.config.workbook_path.clone();
        let workbook = rutero_xlsx::read_workbook(&path).map_err(LoadError::from_read)?;

        let Some(full) = workbook.select_by_marker(&self.config.sheet_marker) else {
            return Err(LoadError::Malformed {
                path,
                reason: "workbook has no sheets".to_string(),
            });
        };

        let dupes = full.duplicate_keys();
        if !dupes.is_empty() {
            return Err(LoadError::Malformed {
                path,
                reason: format!(
                    "duplicate customer codes in sheet `{}`: {dupes:?}",
                    full.name
                ),
            });
        }

        let working = filter_by_route(full, &self.config.route);
        let sheet_name = full.name.clone();

        self.fingerprint =
            Some(
                FileFingerprint::capture(&path).map_err(|source| LoadError::Io {
                    path: path.clone(),
                    source,
                })?,
            );

        log::debug!(
            "loaded {} working rows from sheet `{sheet_name}`",
            working.rows.len()
        );
        Ok(LoadedSheet {
            sheet: working,
            sheet_name,
        })
    }

    /// Degrade-to-empty load for display surfaces: any failure yields an
    /// empty sheet and empty name, after logging the typed error. Callers
    /// that need to distinguish failures use [`SheetStore::load`] directly.
    pub fn load_or_empty(&mut self) -> LoadedSheet {
        match self.load() {
            Ok(loaded) => loaded,
            Err(err) => {
                log::warn!("workbook load failed, showing no data: {err}");
                LoadedSheet::default()
            }
        }
    }

    /// Merge `working` into the workbook on disk and rewrite it atomically.
    ///
    /// The full workbook is re-read first; rows of the target sheet that are
    /// outside the working subset, and every other sheet, are rewritten
    /// exactly as read. One save is O(workbook size) regardless of how small
    /// the mutation was.
    pub fn save(&mut self, working: &Sheet, sheet_name: &str) -> Result<(), SaveError> {
        let path = self.config.workbook_path.clone();

        if let Some(fingerprint) = &self.fingerprint {
            let unchanged =
                fingerprint
                    .matches(&path)
                    .map_err(|source| SaveError::Fingerprint {
                        path: path.clone(),
                        source,
                    })?;
            if !unchanged {
                return Err(SaveError::ConcurrentModification { path });
            }
        }

        let mut workbook =
            rutero_xlsx::read_workbook(&path).map_err(|source| SaveError::Read { source })?;
        let full = workbook
            .sheet_mut(sheet_name)
            .ok_or_else(|| SaveError::SheetMissing {
                path: path.clone(),
                sheet: sheet_name.to_string(),
            })?;
        merge_rows(full, working)?;

        rutero_xlsx::write_workbook(&workbook, &path)
            .map_err(|source| SaveError::Write { source })?;

        self.fingerprint = Some(FileFingerprint::capture(&path).map_err(|source| {
            SaveError::Fingerprint {
                path: path.clone(),
                source,
            }
        })?);

        log::debug!(
            "merged {} working rows into sheet `{sheet_name}`",
            working.rows.len()
        );
        Ok(())
    }
}

/// Merge working rows into the full sheet by customer code.
///
/// Matching full rows get every working column updated in place; full rows
/// outside the working subset are untouched. The merge is all-or-nothing:
/// unmatched working rows fail the whole save before anything is applied.
fn merge_rows(full: &mut Sheet, working: &Sheet) -> Result<(), SaveError> {
    if working.rows.is_empty() {
        return Ok(());
    }

    let full_key = full.require_column(CUSTOMER_CODE)?;
    let working_key = working.require_column(CUSTOMER_CODE)?;

    let mut index: HashMap<String, usize> = HashMap::with_capacity(full.rows.len());
    for (i, row) in full.rows.iter().enumerate() {
        if let Some(cell) = row.get(full_key) {
            index.insert(cell.display(), i);
        }
    }

    // Column pairing and match detection up front so nothing is half-applied.
    let mut column_pairs = Vec::with_capacity(working.columns.len());
    for (w_col, name) in working.columns.iter().enumerate() {
        let f_col = full.require_column(name)?;
        column_pairs.push((w_col, f_col));
    }

    let mut matches = Vec::with_capacity(working.rows.len());
    let mut unmatched = Vec::new();
    for row in &working.rows {
        let key = row
            .get(working_key)
            .map(|cell| cell.display())
            .unwrap_or_default();
        match index.get(&key) {
            Some(&i) => matches.push(i),
            None => unmatched.push(key),
        }
    }
    if !unmatched.is_empty() {
        return Err(SaveError::UnmatchedRows {
            sheet: full.name.clone(),
            codes: unmatched,
        });
    }

    for (working_row, &full_row) in working.rows.iter().zip(&matches) {
        for &(w_col, f_col) in &column_pairs {
            if let Some(value) = working_row.get(w_col) {
                full.rows[full_row][f_col] = value.clone();
            }
        }
    }
    Ok(())
}
