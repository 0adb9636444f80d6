//! `rutero-model` defines the in-memory data structures for a route sales
//! workbook: scalar cell values, ordered sheets, the multi-sheet workbook,
//! plus the pure route-partition and progress computations layered on top.
//!
//! The crate is intentionally I/O-free so it can be reused by:
//! - the `.xlsx` codec (`rutero-xlsx`)
//! - the store / session layer (`rutero-store`)
//! - any presentation boundary via `serde` (JSON-safe schema)

mod progress;
mod route;
mod sheet;
mod value;
mod workbook;

pub use progress::{classify, coverage, flag_columns, progress, sold_today, FlagState, Progress};
pub use route::filter_by_route;
pub use sheet::{Sheet, SchemaError, ADDRESS, CUSTOMER_CODE, CUSTOMER_NAME, ROUTE};
pub use value::CellValue;
pub use workbook::Workbook;
