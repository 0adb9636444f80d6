//! Workbook-backed sales route store.
//!
//! The store owns the read-filter-display-toggle-write cycle of a route
//! dashboard: load a multi-sheet workbook, expose one route's partition of
//! the working sheet, track which flags were set this session, and flush
//! every mutation back into the full workbook without disturbing other
//! sheets or other routes' rows.
//!
//! Layers, leaf to root:
//! - [`SheetStore`] — durable load and merge-save against the workbook file
//! - [`Session`] — the `original` vs `current` snapshot pair, the toggle
//!   mutation protocol, and the presentation-facing dashboard API
//!
//! Presentation (rendering, routing, widgets) is deliberately out of scope;
//! [`Session`] exposes plain data and a change-notification hook instead.

mod config;
mod error;
mod session;
mod store;

pub use config::{StoreConfig, ROUTE_ENV, WORKBOOK_ENV};
pub use error::{LoadError, SaveError, StoreError};
pub use session::{
    Change, ChangeListener, ClientRecord, ClientSummary, CoverageSummary, FlagEntry, FlushMode,
    Session,
};
pub use store::{LoadedSheet, SheetStore};
