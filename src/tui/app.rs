//! Application state and logic.
//!
//! [`App`] wraps the [`Session`] with the state only the terminal needs:
//! cursor, viewport, the edit buffer and an in-progress fill drag. The app
//! operates in different [`Mode`]s, similar to Vim's modal editing.

use gridfill_core::{
    AutofillDecision, AutofillRequest, CellRef, CellValue, DisplayBuffer, GridChange, GridSurface,
    KeyValueStore, Session, SubmitOutcome,
};
use std::collections::HashMap;

use crate::config::{MAX_COL_WIDTH, MIN_COL_WIDTH};

/// The session type the terminal UI drives.
pub type AppSession = Session<DisplayBuffer, Box<dyn KeyValueStore>>;

/// Modal editing state for the application.
///
/// - [`Normal`](Mode::Normal): navigate the grid
/// - [`Edit`](Mode::Edit): type into the formula bar
/// - [`Select`](Mode::Select): choose autofill source rows in one column
/// - [`Fill`](Mode::Fill): drag the fill handle down to the final row
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Edit,
    Select,
    Fill,
}

pub struct App {
    pub session: AppSession,
    /// Current cursor position (column)
    pub cursor_col: usize,
    /// Current cursor position (row)
    pub cursor_row: usize,
    /// Viewport offset (column)
    pub viewport_col: usize,
    /// Viewport offset (row)
    pub viewport_row: usize,
    /// Number of visible columns
    pub visible_cols: usize,
    /// Number of visible rows
    pub visible_rows: usize,
    pub mode: Mode,
    /// Edit buffer for the formula bar
    pub edit_buffer: String,
    /// Cursor position within edit buffer (byte offset)
    pub edit_cursor: usize,
    /// First source row of the selection or drag
    pub fill_anchor: usize,
    /// Last source row, fixed once the drag starts
    pub fill_source_end: usize,
    pub status_message: String,
    /// Default column width for display
    pub col_width: usize,
    /// Per-column widths (column index -> width)
    pub column_widths: HashMap<usize, usize>,
}

impl App {
    pub fn new(session: AppSession, col_width: usize) -> Self {
        let mut app = App {
            session,
            cursor_col: 0,
            cursor_row: 0,
            viewport_col: 0,
            viewport_row: 0,
            visible_cols: 10,
            visible_rows: 20,
            mode: Mode::Normal,
            edit_buffer: String::new(),
            edit_cursor: 0,
            fill_anchor: 0,
            fill_source_end: 0,
            status_message: String::new(),
            col_width,
            column_widths: HashMap::new(),
        };
        app.select_current();
        app
    }

    pub fn max_rows(&self) -> usize {
        self.session.surface().row_count()
    }

    pub fn max_cols(&self) -> usize {
        self.session.surface().col_count()
    }

    pub fn current_cell_ref(&self) -> CellRef {
        CellRef::new(self.cursor_row, self.cursor_col)
    }

    /// Text the grid shows at `(row, col)`.
    pub fn cell_display(&self, row: usize, col: usize) -> String {
        self.session.surface().text(row, col)
    }

    /// Move the cursor by delta, clamping to the grid.
    ///
    /// While choosing autofill rows only vertical movement applies, and a
    /// fill drag never moves above its source.
    pub fn move_cursor(&mut self, dx: i32, dy: i32) {
        let dx = match self.mode {
            Mode::Select | Mode::Fill => 0,
            Mode::Normal | Mode::Edit => dx,
        };
        let max_col = self.max_cols().saturating_sub(1) as i64;
        let max_row = self.max_rows().saturating_sub(1) as i64;
        self.cursor_col = (self.cursor_col as i64 + dx as i64).clamp(0, max_col) as usize;
        self.cursor_row = (self.cursor_row as i64 + dy as i64).clamp(0, max_row) as usize;
        if self.mode == Mode::Fill {
            self.cursor_row = self.cursor_row.max(self.fill_source_end);
        }
        self.update_viewport();
        if self.mode == Mode::Normal {
            self.select_current();
        }
    }

    /// Move to `(row, col)`, e.g. from a mouse click.
    pub fn goto(&mut self, row: usize, col: usize) {
        self.cursor_row = row.min(self.max_rows().saturating_sub(1));
        self.cursor_col = col.min(self.max_cols().saturating_sub(1));
        self.update_viewport();
        self.select_current();
    }

    /// Update viewport to keep cursor visible
    pub fn update_viewport(&mut self) {
        if self.cursor_col < self.viewport_col {
            self.viewport_col = self.cursor_col;
        } else if self.cursor_col >= self.viewport_col + self.visible_cols {
            self.viewport_col = self.cursor_col - self.visible_cols + 1;
        }

        if self.cursor_row < self.viewport_row {
            self.viewport_row = self.cursor_row;
        } else if self.cursor_row >= self.viewport_row + self.visible_rows {
            self.viewport_row = self.cursor_row - self.visible_rows + 1;
        }
    }

    fn select_current(&mut self) {
        self.session.select(self.cursor_row, self.cursor_col);
    }

    /// Start editing the formula bar. With `initial`, typing replaces the
    /// cell's contents; otherwise the current input is loaded.
    pub fn enter_edit_mode(&mut self, initial: Option<char>) {
        self.select_current();
        self.edit_buffer = match initial {
            Some(c) => c.to_string(),
            None => self.session.formula_bar().input().to_string(),
        };
        self.edit_cursor = self.edit_buffer.len();
        self.session.set_input(&self.edit_buffer);
        self.status_message.clear();
        self.mode = Mode::Edit;
    }

    pub fn cancel_edit(&mut self) {
        self.mode = Mode::Normal;
        self.edit_buffer.clear();
        self.edit_cursor = 0;
        self.select_current();
    }

    /// Submit the edit buffer to the active cell.
    pub fn commit_edit(&mut self) {
        let text = std::mem::take(&mut self.edit_buffer);
        self.edit_cursor = 0;
        self.mode = Mode::Normal;
        let cell = self.current_cell_ref();

        self.session.set_input(&text);
        self.status_message = match self.session.submit(&text) {
            SubmitOutcome::Ignored => String::new(),
            SubmitOutcome::Literal => String::new(),
            SubmitOutcome::Formula(value) => format!("{} = {}", cell, value),
            SubmitOutcome::Rejected(e) => format!("Error: {}: {}", cell, e),
        };
        self.select_current();
    }

    /// Blank the current cell the way a direct grid edit would.
    pub fn clear_current_cell(&mut self) {
        let (row, col) = (self.cursor_row, self.cursor_col);
        self.session
            .surface_mut()
            .set_display(row, col, CellValue::blank());
        self.session.on_grid_change(&[GridChange {
            row,
            col,
            value: CellValue::blank(),
        }]);
        self.select_current();
    }

    /// Begin choosing autofill source rows at the cursor.
    pub fn enter_select_mode(&mut self) {
        self.fill_anchor = self.cursor_row;
        self.mode = Mode::Select;
        self.status_message = "Select source rows, then f to fill".to_string();
    }

    /// Fix the source rows and start dragging the fill handle.
    pub fn start_fill(&mut self) {
        if self.mode != Mode::Select {
            return;
        }
        let (start, end) = self.source_rows();
        self.fill_anchor = start;
        self.fill_source_end = end;
        self.cursor_row = end;
        self.update_viewport();
        self.mode = Mode::Fill;
        self.status_message = "Move down to the last row to fill, Enter to apply".to_string();
    }

    /// Source rows `(first, last)` of the current selection or drag.
    pub fn source_rows(&self) -> (usize, usize) {
        match self.mode {
            Mode::Fill => (self.fill_anchor, self.fill_source_end),
            _ => (
                self.fill_anchor.min(self.cursor_row),
                self.fill_anchor.max(self.cursor_row),
            ),
        }
    }

    /// Rows to highlight in the cursor's column, if choosing a fill.
    pub fn highlighted_rows(&self) -> Option<(usize, usize)> {
        match self.mode {
            Mode::Select => Some(self.source_rows()),
            Mode::Fill => Some((self.fill_anchor, self.cursor_row)),
            Mode::Normal | Mode::Edit => None,
        }
    }

    /// Release the fill handle on the cursor row.
    pub fn commit_fill(&mut self) {
        if self.mode != Mode::Fill {
            return;
        }
        let (start, end) = self.source_rows();
        let request = AutofillRequest::new(self.cursor_col, start, end, self.cursor_row);
        self.status_message = match self.session.before_autofill(request) {
            AutofillDecision::Accept(fill) if fill.is_empty() => "Nothing to fill".to_string(),
            AutofillDecision::Accept(fill) => format!("Filled {} cells", fill.len()),
            AutofillDecision::Reject(reason) => format!("Error: autofill rejected: {}", reason),
        };
        self.mode = Mode::Normal;
        self.select_current();
    }

    pub fn cancel_fill(&mut self) {
        self.mode = Mode::Normal;
        self.status_message.clear();
        self.select_current();
    }

    pub fn get_column_width(&self, col: usize) -> usize {
        *self.column_widths.get(&col).unwrap_or(&self.col_width)
    }

    pub fn set_column_width(&mut self, width: usize) {
        let width = width.clamp(MIN_COL_WIDTH, MAX_COL_WIDTH);
        self.column_widths.insert(self.cursor_col, width);
    }

    pub fn increase_column_width(&mut self) {
        let current = self.get_column_width(self.cursor_col);
        self.set_column_width(current + 2);
    }

    pub fn decrease_column_width(&mut self) {
        let current = self.get_column_width(self.cursor_col);
        self.set_column_width(current.saturating_sub(2));
    }
}
