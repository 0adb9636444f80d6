use std::io;
use std::path::PathBuf;

use rutero_model::SchemaError;
use rutero_xlsx::{ReadError, WriteError};

/// Failure while loading the working sheet.
///
/// Unlike the save path, callers may degrade a load failure to an empty
/// display state — but the typed error is always surfaced first so it can be
/// logged or alerted on, never swallowed.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("workbook `{path}` is missing")]
    Missing { path: PathBuf },
    #[error("workbook `{path}` is malformed: {reason}")]
    Malformed { path: PathBuf, reason: String },
    #[error("failed to read workbook `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LoadError {
    /// Classify a codec read failure: a missing file and plain I/O keep
    /// their identity, anything else means the file's contents are bad.
    pub(crate) fn from_read(err: ReadError) -> Self {
        match err {
            ReadError::Missing { path } => LoadError::Missing { path },
            err => match err.into_io() {
                Ok((path, source)) => LoadError::Io { path, source },
                Err(err) => LoadError::Malformed {
                    path: err_path(&err),
                    reason: err.to_string(),
                },
            },
        }
    }
}

fn err_path(err: &ReadError) -> PathBuf {
    match err {
        ReadError::Missing { path }
        | ReadError::Open { path, .. }
        | ReadError::Sheet { path, .. } => path.clone(),
    }
}

/// Failure while saving the working sheet back into the workbook.
///
/// Saves carry the user's transactional intent, so every failure is reported;
/// nothing on this path is ever degraded silently.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// The workbook changed on disk since the session loaded it. Saving
    /// would overwrite the external edit, so the save is refused.
    #[error("workbook `{path}` changed on disk since it was loaded")]
    ConcurrentModification { path: PathBuf },
    /// The sheet targeted by the save no longer exists in the workbook.
    #[error("sheet `{sheet}` is missing from workbook `{path}`")]
    SheetMissing { path: PathBuf, sheet: String },
    /// Working rows whose merge key has no match in the full sheet. These
    /// indicate data corruption and are reported rather than dropped or
    /// inserted.
    #[error("working rows {codes:?} have no match in sheet `{sheet}`")]
    UnmatchedRows { sheet: String, codes: Vec<String> },
    /// Either side of the merge lacks the merge-key column.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("failed to re-read workbook before saving: {source}")]
    Read {
        #[source]
        source: ReadError,
    },
    #[error("failed to write workbook: {source}")]
    Write {
        #[source]
        source: WriteError,
    },
    #[error("failed to stat workbook `{path}`: {source}")]
    Fingerprint {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure surfaced by the session's dashboard operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no client with code `{code}`")]
    NotFound { code: String },
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Save(#[from] SaveError),
}
