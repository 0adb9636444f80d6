//! Filesystem helpers shared by the rutero workspace crates.
//!
//! Two concerns live here:
//! - atomic file replacement: write to a temp file in the destination
//!   directory, flush + `sync_all`, rename into place, so a failed save can
//!   never leave a half-written workbook behind
//! - [`FileFingerprint`]: a cheap `(len, mtime)` snapshot used to detect that
//!   the workbook changed on disk between a load and a save

use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::time::SystemTime;

use tempfile::NamedTempFile;

/// Failure during an atomic replace: either the surrounding file plumbing or
/// the caller's writer closure.
#[derive(Debug)]
pub enum ReplaceError<E> {
    Io(io::Error),
    Writer(E),
}

impl<E> From<io::Error> for ReplaceError<E> {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl<E: std::fmt::Display> std::fmt::Display for ReplaceError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplaceError::Io(err) => write!(f, "io error: {err}"),
            ReplaceError::Writer(err) => write!(f, "write error: {err}"),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for ReplaceError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReplaceError::Io(err) => Some(err),
            ReplaceError::Writer(err) => Some(err),
        }
    }
}

fn parent_dir_or_dot(path: &Path) -> &Path {
    // `Path::parent` returns `Some("")` for bare relative file names like
    // `foo.xlsx`; treat that as the current directory.
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Atomically replace `dest` with a file produced at a temp path.
///
/// `write_fn` receives a temp path in the same directory as `dest` (avoids
/// cross-device renames) and must create the complete file there; libraries
/// that only offer `save(path)` APIs fit this shape directly. The temp file
/// already exists when `write_fn` runs, so writers should truncate it.
///
/// If `write_fn` fails, `dest` is left untouched.
pub fn atomic_replace<E>(
    dest: impl AsRef<Path>,
    write_fn: impl FnOnce(&Path) -> Result<(), E>,
) -> Result<(), ReplaceError<E>> {
    let dest = dest.as_ref();
    let dir = parent_dir_or_dot(dest);
    fs::create_dir_all(dir)?;

    let tmp = NamedTempFile::new_in(dir)?;
    let tmp_path = tmp.into_temp_path();
    write_fn(&tmp_path).map_err(ReplaceError::Writer)?;

    File::open(&tmp_path)?.sync_all()?;
    replace_file(&tmp_path, dest)?;

    // Best-effort: sync directory metadata after the rename. The file is
    // already in place, so a failure here is not a write failure.
    let _ = sync_parent_dir(dest);

    // `tmp_path` drops here; its cleanup is a no-op since the file was moved.
    Ok(())
}

/// Rename with replace semantics.
///
/// On Unix `rename` replaces the destination atomically. Windows `rename`
/// refuses to overwrite, so the destination is removed first; the resulting
/// window is acceptable because the store is single-writer by contract.
fn replace_file(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    if to.exists() {
        fs::remove_file(to)?;
    }
    fs::rename(from, to)
}

#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> io::Result<()> {
    File::open(parent_dir_or_dot(path))?.sync_all()
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> io::Result<()> {
    // Directory handles cannot be fsynced portably elsewhere.
    Ok(())
}

/// Cheap identity snapshot of a file, used for optimistic concurrency checks:
/// capture at load, compare before save, abort the save on mismatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileFingerprint {
    len: u64,
    modified: Option<SystemTime>,
}

impl FileFingerprint {
    /// Snapshot `path`'s current length and modification time.
    pub fn capture(path: impl AsRef<Path>) -> io::Result<Self> {
        let meta = fs::metadata(path)?;
        Ok(Self {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }

    /// True when `path` still matches this snapshot.
    pub fn matches(&self, path: impl AsRef<Path>) -> io::Result<bool> {
        Ok(Self::capture(path)? == *self)
    }
}
