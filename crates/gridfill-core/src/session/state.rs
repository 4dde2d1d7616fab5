use gridfill_engine::{SheetId, Workbook};

use crate::error::Result;
use crate::model::{Cell, Grid, MIN_COLS, MIN_ROWS};
use crate::storage::KeyValueStore;
use crate::surface::GridSurface;

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "spreadsheetData";
/// Name of the formula-engine sheet backing the grid.
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub storage_key: String,
    pub min_rows: usize,
    pub min_cols: usize,
    pub sheet_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            min_rows: MIN_ROWS,
            min_cols: MIN_COLS,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }
}

/// Formula bar state.
///
/// Idle until the first selection; from then on it always targets the most
/// recently selected cell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormulaBar {
    pub(crate) active: Option<(usize, usize)>,
    pub(crate) input: String,
}

impl FormulaBar {
    pub fn is_editing(&self) -> bool {
        self.active.is_some()
    }

    /// The `(row, col)` the bar submits to.
    pub fn active(&self) -> Option<(usize, usize)> {
        self.active
    }

    pub fn input(&self) -> &str {
        &self.input
    }
}

/// The authoritative cell model and the services it synchronizes.
///
/// Everything is owned for the lifetime of the application session: build
/// one with [`Session::open`], drop it (or call [`Session::into_parts`]) to
/// tear it down.
pub struct Session<S: GridSurface, K: KeyValueStore> {
    pub(crate) config: SessionConfig,
    pub(crate) grid: Grid,
    pub(crate) surface: S,
    pub(crate) store: K,
    pub(crate) workbook: Workbook,
    pub(crate) sheet: SheetId,
    pub(crate) bar: FormulaBar,
}

impl<S: GridSurface, K: KeyValueStore> Session<S, K> {
    /// Create a session with a blank grid.
    ///
    /// This constructor does not touch storage or the surface; see [`Session::load`].
    pub fn new(config: SessionConfig, surface: S, store: K, mut workbook: Workbook) -> Result<Self> {
        let sheet = match workbook.sheet_id(&config.sheet_name) {
            Some(id) => id,
            None => workbook.add_sheet(&config.sheet_name)?,
        };
        let grid = Grid::blank(config.min_rows, config.min_cols);

        Ok(Session {
            config,
            grid,
            surface,
            store,
            workbook,
            sheet,
            bar: FormulaBar::default(),
        })
    }

    /// Create a session and load the persisted snapshot into it.
    pub fn open(config: SessionConfig, surface: S, store: K, workbook: Workbook) -> Result<Self> {
        let mut session = Self::new(config, surface, store, workbook)?;
        session.load();
        Ok(session)
    }

    /// Tear the session down, handing back its services.
    pub fn into_parts(self) -> (S, K, Workbook) {
        (self.surface, self.store, self.workbook)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.grid.get(row, col)
    }

    pub fn selection(&self) -> Option<(usize, usize)> {
        self.bar.active
    }

    pub fn formula_bar(&self) -> &FormulaBar {
        &self.bar
    }

    /// Replace the formula bar's pending input (typing in the bar).
    pub fn set_input(&mut self, text: &str) {
        if self.bar.is_editing() {
            self.bar.input = text.to_string();
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Direct access for surface hosts. Edits made here must be reported
    /// through [`Session::on_grid_change`].
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    pub fn sheet(&self) -> SheetId {
        self.sheet
    }
}
