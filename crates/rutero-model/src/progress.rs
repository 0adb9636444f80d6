use serde::{Deserialize, Serialize};

use crate::{CellValue, Sheet};

/// Per-flag classification against the load-time snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagState {
    /// Flag is unset in the current state.
    Missing,
    /// Flag was already set when the session loaded.
    Stocked,
    /// Flag was set during this session.
    SoldThisSession,
}

/// Per-row completion: flags set vs. flags possible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

impl Progress {
    /// Completion in `[0, 1]`; defined as 0 when there are no flag columns.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.done as f64 / self.total as f64
        }
    }
}

/// Columns holding a 0/1 product flag: any column whose name contains
/// `marker`. Column order is preserved. The schema is fixed for a sheet's
/// lifetime, so callers may compute this once and cache it.
pub fn flag_columns(sheet: &Sheet, marker: &str) -> Vec<String> {
    sheet
        .columns
        .iter()
        .filter(|c| c.contains(marker))
        .cloned()
        .collect()
}

/// Completion of one row over the given flag columns.
pub fn progress(sheet: &Sheet, row: usize, flags: &[String]) -> Progress {
    let done = flags
        .iter()
        .filter(|col| sheet.value(row, col).is_some_and(CellValue::is_set))
        .count();
    Progress {
        done,
        total: flags.len(),
    }
}

/// Three-way flag classification.
///
/// Current unset is always `Missing` regardless of the snapshot; a set flag
/// is `Stocked` when it was already set at load time and `SoldThisSession`
/// otherwise.
pub fn classify(current: &CellValue, original: &CellValue) -> FlagState {
    if !current.is_set() {
        FlagState::Missing
    } else if original.is_set() {
        FlagState::Stocked
    } else {
        FlagState::SoldThisSession
    }
}

/// Aggregate completion over the whole sheet as a percentage in `[0, 100]`,
/// 0 when there is nothing to count.
pub fn coverage(sheet: &Sheet, flags: &[String]) -> f64 {
    let total = flags.len() * sheet.rows.len();
    if total == 0 {
        return 0.0;
    }
    let done: usize = (0..sheet.rows.len())
        .map(|row| progress(sheet, row, flags).done)
        .sum();
    done as f64 / total as f64 * 100.0
}

/// Count of flags set now that were unset in the load-time snapshot.
///
/// `current` is a working copy of `original`, so rows pair up positionally;
/// rows beyond the snapshot's length contribute nothing.
pub fn sold_today(current: &Sheet, original: &Sheet, flags: &[String]) -> usize {
    let mut sold = 0;
    for row in 0..current.rows.len().min(original.rows.len()) {
        for col in flags {
            let now = current.value(row, col).is_some_and(CellValue::is_set);
            let before = original.value(row, col).is_some_and(CellValue::is_set);
            if now && !before {
                sold += 1;
            }
        }
    }
    sold
}
