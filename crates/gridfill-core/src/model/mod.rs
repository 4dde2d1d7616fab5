//! Authoritative cell model.

mod cell;
mod grid;

pub use cell::{Cell, CellValue};
pub use grid::{Grid, MIN_COLS, MIN_ROWS};
