//! `.xlsx` codec between [`rutero_model::Workbook`] and the durable file.
//!
//! Reading uses `calamine`; the first worksheet row is the column header,
//! every following row is data. Writing regenerates the whole package with
//! `rust_xlsxwriter` and lands through [`rutero_fs::atomic_replace`], so a
//! failed save never corrupts the destination workbook.
//!
//! Preserved across a read/write cycle: sheet names, sheet order, column
//! order within a sheet, and row order.

use std::io;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, Reader, Xlsx};
use rutero_fs::ReplaceError;
use rutero_model::{CellValue, Sheet, Workbook};

/// Failure while reading a workbook file into the model.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("workbook `{path}` does not exist")]
    Missing { path: PathBuf },
    #[error("failed to open workbook `{path}`: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::XlsxError,
    },
    #[error("failed to read sheet `{sheet}` from `{path}`: {source}")]
    Sheet {
        path: PathBuf,
        sheet: String,
        #[source]
        source: calamine::XlsxError,
    },
}

impl ReadError {
    /// True when the underlying cause is plain I/O rather than a problem
    /// with the file's contents.
    pub fn is_io(&self) -> bool {
        match self {
            ReadError::Missing { .. } => false,
            ReadError::Open { source, .. } | ReadError::Sheet { source, .. } => {
                matches!(source, calamine::XlsxError::Io(_))
            }
        }
    }

    /// Split out failures whose underlying cause is plain I/O, for callers
    /// that classify read errors into their own taxonomy.
    pub fn into_io(self) -> Result<(PathBuf, io::Error), Self> {
        match self {
            ReadError::Open {
                path,
                source: calamine::XlsxError::Io(source),
            }
            | ReadError::Sheet {
                path,
                source: calamine::XlsxError::Io(source),
                ..
            } => Ok((path, source)),
            err => Err(err),
        }
    }
}

/// Failure while writing the model back out.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("failed to build workbook for `{path}`: {source}")]
    Build {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },
    #[error("failed to replace `{path}`: {source}")]
    Replace {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Read every sheet of the workbook at `path`.
pub fn read_workbook(path: impl AsRef<Path>) -> Result<Workbook, ReadError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ReadError::Missing {
            path: path.to_path_buf(),
        });
    }
    let mut xlsx: Xlsx<_> = open_workbook(path).map_err(|source| ReadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let names: Vec<String> = xlsx.sheet_names().to_owned();
    let mut workbook = Workbook::new();
    for name in names {
        let range = xlsx
            .worksheet_range(&name)
            .map_err(|source| ReadError::Sheet {
                path: path.to_path_buf(),
                sheet: name.clone(),
                source,
            })?;
        workbook.push_sheet(sheet_from_range(name, &range));
    }
    Ok(workbook)
}

/// Write every sheet of `workbook` to `path`, atomically.
pub fn write_workbook(workbook: &Workbook, path: impl AsRef<Path>) -> Result<(), WriteError> {
    let path = path.as_ref();
    rutero_fs::atomic_replace(path, |tmp| {
        let mut out = rust_xlsxwriter::Workbook::new();
        for sheet in &workbook.sheets {
            let ws = out.add_worksheet();
            ws.set_name(&sheet.name)?;
            for (col, header) in sheet.columns.iter().enumerate() {
                ws.write_string(0, col as u16, header)?;
            }
            for (r, row) in sheet.rows.iter().enumerate() {
                for (c, cell) in row.iter().enumerate() {
                    write_cell(ws, (r + 1) as u32, c as u16, cell)?;
                }
            }
        }
        out.save(tmp)?;
        Ok(())
    })
    .map_err(|err| match err {
        ReplaceError::Io(source) => WriteError::Replace {
            path: path.to_path_buf(),
            source,
        },
        ReplaceError::Writer(source) => WriteError::Build {
            path: path.to_path_buf(),
            source,
        },
    })
}

fn sheet_from_range(name: String, range: &calamine::Range<Data>) -> Sheet {
    let mut rows = range.rows();
    let columns = match rows.next() {
        Some(header) => header.iter().map(|c| cell_value(c).display()).collect(),
        None => Vec::new(),
    };
    let mut sheet = Sheet::new(name, columns);
    for row in rows {
        sheet.push_row(row.iter().map(cell_value).collect());
    }
    sheet
}

fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Float(v) => CellValue::Number(*v),
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) => CellValue::Text(s.clone()),
        // Serial dates keep their numeric form; the store treats them as
        // opaque scalars.
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

fn write_cell(
    ws: &mut rust_xlsxwriter::Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    match value {
        CellValue::Empty => Ok(()),
        CellValue::Number(v) => ws.write_number(row, col, *v).map(|_| ()),
        CellValue::Text(s) => ws.write_string(row, col, s).map(|_| ()),
        CellValue::Bool(b) => ws.write_boolean(row, col, *b).map(|_| ()),
    }
}
