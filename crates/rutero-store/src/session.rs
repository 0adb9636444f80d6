use serde::Serialize;

use rutero_model::{
    classify, coverage, flag_columns, progress, sold_today, CellValue, FlagState, Sheet, ADDRESS,
    CUSTOMER_CODE, CUSTOMER_NAME,
};

use crate::{LoadError, LoadedSheet, SheetStore, StoreConfig, StoreError};

/// When toggles reach the workbook file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlushMode {
    /// Every toggle performs one full save cycle before returning. This is
    /// the default contract; each mutation costs a re-read and rewrite of
    /// the whole workbook.
    #[default]
    Immediate,
    /// Toggles mutate in memory only; [`Session::flush`] persists them in
    /// one save cycle.
    Deferred,
}

/// State-changed notification emitted after a successful mutation.
///
/// The session itself stays rerun-agnostic: subscribers decide what to
/// re-derive or re-render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Change {
    /// One flag changed and (in immediate mode) was persisted.
    Flag {
        code: String,
        column: String,
        value: bool,
    },
    /// The whole working state was replaced; re-derive everything.
    Reloaded,
}

/// Subscriber callback for [`Change`] notifications.
pub type ChangeListener = Box<dyn FnMut(&Change) + Send>;

/// One row of the client list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClientSummary {
    pub code: String,
    pub name: String,
    pub address: String,
    pub done: usize,
    pub total: usize,
}

/// One flag of a client record, classified against the load-time snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FlagEntry {
    pub column: String,
    pub state: FlagState,
}

/// Full detail view of one client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClientRecord {
    pub code: String,
    pub name: String,
    pub address: String,
    pub flags: Vec<FlagEntry>,
}

/// Aggregate dashboard figures.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CoverageSummary {
    pub client_count: usize,
    pub sold_today: usize,
    pub coverage_percent: f64,
}

/// Session state for one route: the mutable working sheet, the immutable
/// load-time snapshot it is compared against, and the store that persists
/// mutations.
///
/// This is the explicit owner of what the original dashboard kept in hidden
/// framework session globals. It lives for the process (or until
/// [`Session::reload`]); neither snapshot is ever persisted — only the
/// working sheet's values flow back into the workbook.
pub struct Session {
    store: SheetStore,
    sheet_name: String,
    current: Sheet,
    original: Sheet,
    /// Last state known to be on disk; rollback target for deferred flushes.
    persisted: Sheet,
    flags: Vec<String>,
    flush_mode: FlushMode,
    dirty: bool,
    listeners: Vec<ChangeListener>,
}

impl Session {
    /// Open a session by loading the working sheet from the workbook.
    pub fn open(config: StoreConfig) -> Result<Self, LoadError> {
        let mut store = SheetStore::new(config);
        let loaded = store.load()?;
        Ok(Self::from_loaded(store, loaded))
    }

    /// Open with the degrade-to-empty policy: a load failure yields a
    /// session over no data (already logged by the store) instead of an
    /// error. Display surfaces treat the empty session as "no data
    /// available".
    pub fn open_or_empty(config: StoreConfig) -> Self {
        let mut store = SheetStore::new(config);
        let loaded = store.load_or_empty();
        Self::from_loaded(store, loaded)
    }

    fn from_loaded(store: SheetStore, loaded: LoadedSheet) -> Self {
        let flags = flag_columns(&loaded.sheet, &store.config().flag_marker);
        Self {
            store,
            sheet_name: loaded.sheet_name,
            original: loaded.sheet.clone(),
            persisted: loaded.sheet.clone(),
            current: loaded.sheet,
            flags,
            flush_mode: FlushMode::default(),
            dirty: false,
            listeners: Vec::new(),
        }
    }

    /// Name of the workbook sheet this session works on.
    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// True when the session holds no data (empty load or degraded open).
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Flag columns of the working sheet, in column order. Computed once at
    /// open/reload; the schema is fixed for the sheet's lifetime.
    pub fn flag_columns(&self) -> &[String] {
        &self.flags
    }

    pub fn flush_mode(&self) -> FlushMode {
        self.flush_mode
    }

    pub fn set_flush_mode(&mut self, mode: FlushMode) {
        self.flush_mode = mode;
    }

    /// Subscribe to state-changed notifications.
    pub fn subscribe(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }

    fn notify(&mut self, change: Change) {
        for listener in &mut self.listeners {
            listener(&change);
        }
    }

    /// Client list, optionally filtered by a case-insensitive query matched
    /// against name and code. Order follows the working sheet.
    pub fn list_clients(&self, query: Option<&str>) -> Vec<ClientSummary> {
        let query = query.map(str::to_lowercase).filter(|q| !q.is_empty());
        let mut out = Vec::new();
        for row in 0..self.current.rows.len() {
            let code = self.current.display_value(row, CUSTOMER_CODE);
            let name = self.current.display_value(row, CUSTOMER_NAME);
            if let Some(q) = &query {
                if !name.to_lowercase().contains(q) && !code.to_lowercase().contains(q) {
                    continue;
                }
            }
            let p = progress(&self.current, row, &self.flags);
            out.push(ClientSummary {
                code,
                name,
                address: self.current.display_value(row, ADDRESS),
                done: p.done,
                total: p.total,
            });
        }
        out
    }

    /// Detail record for one client, with each flag classified against the
    /// load-time snapshot.
    pub fn get_client(&self, code: &str) -> Result<ClientRecord, StoreError> {
        let row = self
            .current
            .find_by_key(code)
            .map_err(StoreError::Schema)?
            .ok_or_else(|| StoreError::NotFound {
                code: code.to_string(),
            })?;
        let original_row = self.original.find_by_key(code).ok().flatten();

        let empty = CellValue::Empty;
        let mut flags = Vec::with_capacity(self.flags.len());
        for column in &self.flags {
            let now = self.current.value(row, column).unwrap_or(&empty);
            let before = original_row
                .and_then(|r| self.original.value(r, column))
                .unwrap_or(&empty);
            flags.push(FlagEntry {
                column: column.clone(),
                state: classify(now, before),
            });
        }

        Ok(ClientRecord {
            code: self.current.display_value(row, CUSTOMER_CODE),
            name: self.current.display_value(row, CUSTOMER_NAME),
            address: self.current.display_value(row, ADDRESS),
            flags,
        })
    }

    /// Set one client's flag to an explicit value (1 = placed, 0 = not
    /// placed; setting back to 0 is the undo path).
    ///
    /// In immediate mode the change is persisted before this returns; on a
    /// save failure the in-memory cell is rolled back so the displayed state
    /// never diverges from the file, and the error is returned. An unknown
    /// code is an error, never a silent no-op.
    pub fn toggle_flag(&mut self, code: &str, column: &str, value: bool) -> Result<(), StoreError> {
        let row = self
            .current
            .find_by_key(code)
            .map_err(StoreError::Schema)?
            .ok_or_else(|| StoreError::NotFound {
                code: code.to_string(),
            })?;
        let col = self.current.require_column(column)?;

        let previous = self.current.rows[row][col].clone();
        self.current.rows[row][col] = CellValue::Number(if value { 1.0 } else { 0.0 });

        match self.flush_mode {
            FlushMode::Immediate => {
                if let Err(err) = self.store.save(&self.current, &self.sheet_name) {
                    self.current.rows[row][col] = previous;
                    return Err(err.into());
                }
                self.persisted = self.current.clone();
                self.dirty = false;
            }
            FlushMode::Deferred => {
                self.dirty = true;
            }
        }

        self.notify(Change::Flag {
            code: code.to_string(),
            column: column.to_string(),
            value,
        });
        Ok(())
    }

    /// True when deferred toggles have not reached the file yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Persist deferred toggles in one save cycle.
    ///
    /// On failure the working sheet rolls back to the last persisted state
    /// (same no-divergence rule as immediate toggles) and subscribers are
    /// told to re-derive.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }
        match self.store.save(&self.current, &self.sheet_name) {
            Ok(()) => {
                self.persisted = self.current.clone();
                self.dirty = false;
                Ok(())
            }
            Err(err) => {
                self.current = self.persisted.clone();
                self.dirty = false;
                self.notify(Change::Reloaded);
                Err(err.into())
            }
        }
    }

    /// Aggregate dashboard figures for the working sheet.
    pub fn coverage_summary(&self) -> CoverageSummary {
        CoverageSummary {
            client_count: self.current.rows.len(),
            sold_today: sold_today(&self.current, &self.original, &self.flags),
            coverage_percent: coverage(&self.current, &self.flags),
        }
    }

    /// Discard both snapshots and re-load from the workbook file.
    pub fn reload(&mut self) -> Result<(), LoadError> {
        let loaded = self.store.load()?;
        self.sheet_name = loaded.sheet_name;
        self.flags = flag_columns(&loaded.sheet, &self.store.config().flag_marker);
        self.original = loaded.sheet.clone();
        self.persisted = loaded.sheet.clone();
        self.current = loaded.sheet;
        self.dirty = false;
        self.notify(Change::Reloaded);
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("sheet_name", &self.sheet_name)
            .field("clients", &self.current.rows.len())
            .field("flush_mode", &self.flush_mode)
            .field("dirty", &self.dirty)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
