use gridfill_engine::Address;

use super::Session;
use crate::model::{CellValue, Grid};
use crate::snapshot;
use crate::storage::KeyValueStore;
use crate::surface::GridSurface;

impl<S: GridSurface, K: KeyValueStore> Session<S, K> {
    /// Read the persisted snapshot and project it into the surface.
    ///
    /// A missing key, a storage failure or an unreadable snapshot all fall
    /// back to a blank grid at the minimum bounds.
    pub fn load(&mut self) {
        let key = self.config.storage_key.clone();
        let mut grid = match self.store.get(&key) {
            Ok(Some(text)) => match snapshot::decode(&text) {
                Ok(grid) => {
                    log::info!(
                        "loaded snapshot {:?} ({} x {})",
                        key,
                        grid.row_count(),
                        grid.col_count()
                    );
                    grid
                }
                Err(e) => {
                    log::warn!("ignoring unreadable snapshot {:?}: {}", key, e);
                    self.blank_grid()
                }
            },
            Ok(None) => {
                log::info!("no snapshot stored under {:?}, starting blank", key);
                self.blank_grid()
            }
            Err(e) => {
                log::error!("failed to read snapshot {:?}: {}", key, e);
                self.blank_grid()
            }
        };
        grid.ensure_size(self.config.min_rows, self.config.min_cols);
        self.install(grid);
    }

    /// Serialize the authoritative grid under the storage key.
    ///
    /// Failures are logged and reported as `false`; the in-memory state is
    /// unaffected either way.
    pub fn persist(&mut self) -> bool {
        let text = match snapshot::encode(&self.grid) {
            Ok(text) => text,
            Err(e) => {
                log::error!("failed to serialize snapshot: {}", e);
                return false;
            }
        };
        match self.store.set(&self.config.storage_key, &text) {
            Ok(()) => {
                log::debug!("persisted {} bytes", text.len());
                true
            }
            Err(e) => {
                log::error!(
                    "failed to persist snapshot {:?}: {}",
                    self.config.storage_key,
                    e
                );
                false
            }
        }
    }

    fn blank_grid(&self) -> Grid {
        Grid::blank(self.config.min_rows, self.config.min_cols)
    }

    /// Replace the grid, re-registering its contents with the formula engine.
    fn install(&mut self, mut grid: Grid) {
        let old: Vec<Address> = self
            .grid
            .iter()
            .filter(|(_, _, cell)| !cell.is_blank())
            .map(|(row, col, _)| self.addr(row, col))
            .collect();
        for addr in old {
            if let Err(e) = self.workbook.clear(addr) {
                log::warn!("could not clear {:?} before reload: {}", addr, e);
            }
        }

        let mut formulas = Vec::new();
        for (row, col, cell) in grid.iter() {
            let addr = self.addr(row, col);
            match &cell.formula {
                Some(text) => formulas.push((row, col, text.clone())),
                None if cell.value.is_blank() => {}
                None => {
                    if let Err(e) = self.workbook.set_value(addr, cell.value.to_engine_value()) {
                        log::warn!("could not load value at ({}, {}): {}", row, col, e);
                    }
                }
            }
        }

        let mut live = Vec::with_capacity(formulas.len());
        for (row, col, text) in formulas {
            let addr = self.addr(row, col);
            let expr = text.strip_prefix('=').unwrap_or(&text);
            match self.workbook.set_formula(addr, expr) {
                Ok(_) => live.push((row, col)),
                Err(e) => {
                    log::warn!(
                        "stored formula {:?} at ({}, {}) no longer registers, keeping its value: {}",
                        text,
                        row,
                        col,
                        e
                    );
                    if let Some(cell) = grid.get_mut(row, col) {
                        cell.formula = None;
                        if let Err(e) = self.workbook.set_value(addr, cell.value.to_engine_value()) {
                            log::warn!("could not load value at ({}, {}): {}", row, col, e);
                        }
                    }
                }
            }
        }

        for (row, col) in live {
            let value = CellValue::from(self.workbook.value(self.addr(row, col)));
            if let Some(cell) = grid.get_mut(row, col) {
                cell.value = value;
            }
        }

        self.grid = grid;
        self.bar = Default::default();
        self.surface.load_display(self.grid.values());
    }

    pub(crate) fn addr(&self, row: usize, col: usize) -> Address {
        Address::new(self.sheet, row, col)
    }
}
