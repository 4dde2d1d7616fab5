use super::{Cell, CellValue};

/// Rows allocated for a fresh grid.
pub const MIN_ROWS: usize = 100;
/// Columns allocated for a fresh grid.
pub const MIN_COLS: usize = 50;

/// Row-major, rectangular table of cells.
///
/// Reads outside the bounds return `None`; writes outside the bounds grow
/// the table so it stays rectangular.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
    cols: usize,
}

impl Grid {
    pub fn blank(rows: usize, cols: usize) -> Grid {
        Grid {
            rows: vec![vec![Cell::blank(); cols]; rows],
            cols,
        }
    }

    /// Build a grid from possibly ragged rows, padding short rows with blanks.
    pub fn from_rows(mut rows: Vec<Vec<Cell>>) -> Grid {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(cols, Cell::blank());
        }
        Grid { rows, cols }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row)?.get(col)
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        self.rows.get_mut(row)?.get_mut(col)
    }

    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.ensure_size(row + 1, col + 1);
        self.rows[row][col] = cell;
    }

    /// Grow (never shrink) to at least `rows` x `cols`.
    pub fn ensure_size(&mut self, rows: usize, cols: usize) {
        if cols > self.cols {
            self.cols = cols;
            for row in &mut self.rows {
                row.resize(cols, Cell::blank());
            }
        }
        if rows > self.rows.len() {
            self.rows.resize(rows, vec![Cell::blank(); self.cols]);
        }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Every cell with its position, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Cell)> {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(r, row)| row.iter().enumerate().map(move |(c, cell)| (r, c, cell)))
    }

    /// Display projection: values only, no formula metadata.
    pub fn values(&self) -> Vec<Vec<CellValue>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|c| c.value.clone()).collect())
            .collect()
    }
}

impl Default for Grid {
    fn default() -> Self {
        Grid::blank(MIN_ROWS, MIN_COLS)
    }
}
