//! Formula engine building blocks.
//!
//! - [`CellRef`], [`Address`], [`SheetId`] - Cell addressing (A1 notation ↔ row/col)
//! - [`Value`] - Literal and computed cell values
//! - [`extract_dependencies`] - Parse formula dependencies
//! - [`detect_cycle`] - Circular dependency detection
//! - [`preprocess_formula`] - Rewrite references for Rhai evaluation
//! - [`create_engine`] - Create a Rhai engine with built-in functions

mod cell_ref;
mod cycle;
mod deps;
mod preprocess;
mod value;

use dashmap::DashMap;
use std::sync::Arc;

pub use cell_ref::{Address, CellRef, SheetId};
pub use cycle::detect_cycle;
pub use deps::{extract_dependencies, parse_range};
pub use preprocess::preprocess_formula;
pub use value::{ERROR_CODE, Value, format_number};

pub use rhai::{AST, Dynamic};

/// Current value of every non-blank cell, shared with the Rhai built-ins.
/// DashMap is internally sharded; the Arc makes clones cheap.
pub type ValueMap = Arc<DashMap<Address, Value>>;

/// Rhai operations one evaluation may perform before it is aborted.
pub const MAX_OPERATIONS: u64 = 1_000_000;
pub const MAX_STRING_SIZE: usize = 1_048_576;
pub const MAX_ARRAY_SIZE: usize = 100_000;
pub const MAX_MAP_SIZE: usize = 100_000;
pub const MAX_EXPR_DEPTH: usize = 64;
pub const MAX_FUNCTION_EXPR_DEPTH: usize = 32;

/// Create a Rhai engine with built-ins reading from `values`.
///
/// Evaluation is bounded: a formula that runs past the limits fails, and
/// the cell shows an error value.
pub fn create_engine(values: ValueMap) -> rhai::Engine {
    let mut engine = rhai::Engine::new();
    engine.set_max_operations(MAX_OPERATIONS);
    engine.set_max_string_size(MAX_STRING_SIZE);
    engine.set_max_array_size(MAX_ARRAY_SIZE);
    engine.set_max_map_size(MAX_MAP_SIZE);
    engine.set_max_expr_depths(MAX_EXPR_DEPTH, MAX_FUNCTION_EXPR_DEPTH);
    crate::builtins::register_builtins(&mut engine, values);
    engine
}
