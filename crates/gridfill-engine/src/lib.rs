//! gridfill_engine - Formula engine backed by Rhai.
//!
//! A [`Workbook`] holds named sheets. Formulas are registered per cell,
//! compiled once, and recalculated whenever a cell they read changes.

pub(crate) mod builtins;
pub mod engine;
pub mod error;
pub mod workbook;

pub use engine::{Address, CellRef, SheetId, Value};
pub use error::{EngineError, Result};
pub use workbook::Workbook;
