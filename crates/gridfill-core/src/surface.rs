//! The grid surface: whatever renders the grid and reports user gestures.
//!
//! The surface keeps its own display-only copy of the values. The session
//! writes to it after every mutation of the authoritative model; the
//! surface's host reports gestures back through
//! [`Session::select`](crate::Session::select),
//! [`Session::on_grid_change`](crate::Session::on_grid_change) and
//! [`Session::before_autofill`](crate::Session::before_autofill).

use crate::model::CellValue;

pub trait GridSurface {
    /// Displayed value at `(row, col)`, `None` outside the surface.
    fn display(&self, row: usize, col: usize) -> Option<CellValue>;

    /// Overwrite one displayed value, growing the surface if needed.
    fn set_display(&mut self, row: usize, col: usize, value: CellValue);

    /// Every displayed value, row-major.
    fn display_data(&self) -> Vec<Vec<CellValue>>;

    /// Replace the whole display.
    fn load_display(&mut self, data: Vec<Vec<CellValue>>);
}

/// In-memory display buffer. The terminal UI renders one of these.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayBuffer {
    rows: Vec<Vec<CellValue>>,
    cols: usize,
}

impl DisplayBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.cols
    }

    /// Text to render at `(row, col)`; empty outside the buffer.
    pub fn text(&self, row: usize, col: usize) -> String {
        self.display(row, col)
            .map(|v| v.display_text())
            .unwrap_or_default()
    }

    fn grow(&mut self, rows: usize, cols: usize) {
        if cols > self.cols {
            self.cols = cols;
            for row in &mut self.rows {
                row.resize(cols, CellValue::blank());
            }
        }
        if rows > self.rows.len() {
            self.rows.resize(rows, vec![CellValue::blank(); self.cols]);
        }
    }
}

impl GridSurface for DisplayBuffer {
    fn display(&self, row: usize, col: usize) -> Option<CellValue> {
        self.rows.get(row)?.get(col).cloned()
    }

    fn set_display(&mut self, row: usize, col: usize, value: CellValue) {
        self.grow(row + 1, col + 1);
        self.rows[row][col] = value;
    }

    fn display_data(&self) -> Vec<Vec<CellValue>> {
        self.rows.clone()
    }

    fn load_display(&mut self, data: Vec<Vec<CellValue>>) {
        self.cols = data.iter().map(Vec::len).max().unwrap_or(0);
        self.rows = data;
        let cols = self.cols;
        for row in &mut self.rows {
            row.resize(cols, CellValue::blank());
        }
    }
}
