//! Cell model synchronization (UI-agnostic).
//!
//! [`Session`] owns the authoritative grid and mediates between the formula
//! bar, the formula engine, the grid surface and local storage.

mod io;
mod ops;
mod state;

pub use ops::{CellInput, GridChange, SubmitOutcome};
pub use state::{
    DEFAULT_SHEET_NAME, DEFAULT_STORAGE_KEY, FormulaBar, Session, SessionConfig,
};
