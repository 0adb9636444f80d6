use std::env;
use std::path::PathBuf;

/// Environment variable naming the workbook file.
pub const WORKBOOK_ENV: &str = "RUTERO_WORKBOOK";
/// Environment variable selecting the route partition.
pub const ROUTE_ENV: &str = "RUTERO_ROUTE";

const DEFAULT_WORKBOOK: &str = "Copia de LISTADO ACCIONES Q1.xlsx";
const DEFAULT_SHEET_MARKER: &str = "BIT";
const DEFAULT_FLAG_MARKER: &str = "Bits";
const DEFAULT_ROUTE: &str = "8087";

/// Store configuration: where the workbook lives and how its schema is
/// interpreted.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Path of the durable workbook file.
    pub workbook_path: PathBuf,
    /// Case-insensitive substring selecting the working sheet by name;
    /// falls back to the first sheet when nothing matches.
    pub sheet_marker: String,
    /// Substring identifying product flag columns.
    pub flag_marker: String,
    /// Route partition value, compared against the `Route` cell's display
    /// form so numeric and text route columns both work.
    pub route: String,
}

impl StoreConfig {
    /// Configuration for `workbook_path` with the domain defaults for sheet
    /// marker, flag marker, and route.
    pub fn new(workbook_path: impl Into<PathBuf>) -> Self {
        Self {
            workbook_path: workbook_path.into(),
            sheet_marker: DEFAULT_SHEET_MARKER.to_string(),
            flag_marker: DEFAULT_FLAG_MARKER.to_string(),
            route: DEFAULT_ROUTE.to_string(),
        }
    }

    /// Configuration from the process environment: `RUTERO_WORKBOOK` for the
    /// file path and `RUTERO_ROUTE` for the partition, with the same defaults
    /// as [`StoreConfig::new`] when unset.
    pub fn from_env() -> Self {
        let mut config = Self::new(
            env::var_os(WORKBOOK_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKBOOK)),
        );
        if let Ok(route) = env::var(ROUTE_ENV) {
            config.route = route;
        }
        config
    }

    /// Override the route partition.
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = route.into();
        self
    }

    /// Override the working-sheet name marker.
    pub fn with_sheet_marker(mut self, marker: impl Into<String>) -> Self {
        self.sheet_marker = marker.into();
        self
    }

    /// Override the flag-column marker.
    pub fn with_flag_marker(mut self, marker: impl Into<String>) -> Self {
        self.flag_marker = marker.into();
        self
    }
}
