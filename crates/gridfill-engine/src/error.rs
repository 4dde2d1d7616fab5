//! Error types for the formula engine.

use thiserror::Error;

use crate::engine::{CellRef, SheetId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Unknown sheet {0:?}")]
    UnknownSheet(SheetId),

    #[error("Sheet already exists: {0}")]
    DuplicateSheet(String),

    #[error("Invalid sheet name: {0:?}")]
    InvalidSheetName(String),

    #[error("Empty formula")]
    EmptyFormula,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Circular reference: {}", format_path(.0))]
    CircularReference(Vec<CellRef>),
}

fn format_path(path: &[CellRef]) -> String {
    path.iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub type Result<T> = std::result::Result<T, EngineError>;
