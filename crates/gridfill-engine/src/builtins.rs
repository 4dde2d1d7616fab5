//! Built-in spreadsheet functions (Rust) and their metadata.
//!
//! Conventions:
//! - Spreadsheet-facing range functions are written `SUM(A1:B5)` and are
//!   rewritten to ALLCAPS Rhai functions (`SUM_RANGE`) by preprocessing.
//! - If you add a new range function, update `RANGE_BUILTINS` and register
//!   its implementation in `register_builtins`.

use crate::engine::{Address, SheetId, Value, ValueMap};
use regex::Regex;
use rhai::{Dynamic, Engine, EvalAltResult, Position};
use std::sync::OnceLock;

pub struct RangeBuiltin {
    pub sheet_name: &'static str,
    pub rhai_name: &'static str,
}

pub const RANGE_BUILTINS: &[RangeBuiltin] = &[
    RangeBuiltin { sheet_name: "SUM", rhai_name: "SUM_RANGE" },
    RangeBuiltin { sheet_name: "AVG", rhai_name: "AVG_RANGE" },
    RangeBuiltin { sheet_name: "AVERAGE", rhai_name: "AVG_RANGE" },
    RangeBuiltin { sheet_name: "COUNT", rhai_name: "COUNT_RANGE" },
    RangeBuiltin { sheet_name: "MIN", rhai_name: "MIN_RANGE" },
    RangeBuiltin { sheet_name: "MAX", rhai_name: "MAX_RANGE" },
];

/// Regex that matches range calls like `SUM(A1:B5)` (function names are case-insensitive).
///
/// Captures:
/// - group 1: function name (e.g. `SUM`)
/// - group 2: start cell ref (e.g. `A1`)
/// - group 3: end cell ref (e.g. `B5`)
pub fn range_fn_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let names = RANGE_BUILTINS
            .iter()
            .map(|b| b.sheet_name)
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(
            r"(?i)\b({})\(\s*([A-Za-z]+[0-9]+)\s*:\s*([A-Za-z]+[0-9]+)\s*\)",
            names
        ))
        .expect("built-in range regex must compile")
    })
}

pub fn range_rhai_name(sheet_name: &str) -> Option<&'static str> {
    RANGE_BUILTINS
        .iter()
        .find(|b| b.sheet_name.eq_ignore_ascii_case(sheet_name))
        .map(|b| b.rhai_name)
}

fn invalid_arg(message: &str) -> Box<EvalAltResult> {
    EvalAltResult::ErrorRuntime(message.into(), Position::NONE).into()
}

fn to_usize(value: i64, label: &str) -> Result<usize, Box<EvalAltResult>> {
    usize::try_from(value).map_err(|_| invalid_arg(&format!("{} must be >= 0", label)))
}

fn to_sheet(value: i64) -> Result<SheetId, Box<EvalAltResult>> {
    u32::try_from(value)
        .map(SheetId)
        .map_err(|_| invalid_arg("sheet must be >= 0"))
}

fn error_ref(addr: &Address) -> Box<EvalAltResult> {
    invalid_arg(&format!(
        "referenced cell {} holds an error",
        crate::engine::CellRef::new(addr.row, addr.col)
    ))
}

/// Numeric values of a rectangular range. Errors inside the range propagate.
fn range_numbers(
    values: &ValueMap,
    sheet: i64,
    r1: i64,
    c1: i64,
    r2: i64,
    c2: i64,
) -> Result<Vec<f64>, Box<EvalAltResult>> {
    let sheet = to_sheet(sheet)?;
    let (r1, r2) = (to_usize(r1, "row")?, to_usize(r2, "row")?);
    let (c1, c2) = (to_usize(c1, "col")?, to_usize(c2, "col")?);
    let (min_row, max_row) = (r1.min(r2), r1.max(r2));
    let (min_col, max_col) = (c1.min(c2), c1.max(c2));

    let mut found: Vec<(Address, f64)> = Vec::new();
    for entry in values.iter() {
        let addr = entry.key();
        if addr.sheet != sheet
            || addr.row < min_row
            || addr.row > max_row
            || addr.col < min_col
            || addr.col > max_col
        {
            continue;
        }
        match entry.value() {
            Value::Error(_) => return Err(error_ref(addr)),
            v => {
                if let Some(n) = v.as_number() {
                    found.push((*addr, n));
                }
            }
        }
    }
    // Deterministic summation order regardless of map iteration order.
    found.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(found.into_iter().map(|(_, n)| n).collect())
}

fn round_to(x: f64, digits: i64) -> f64 {
    let factor = 10f64.powi(digits.clamp(-15, 15) as i32);
    (x * factor).round() / factor
}

/// Register all built-in functions into the Rhai engine.
pub fn register_builtins(engine: &mut Engine, values: ValueMap) {
    // CELL(sheet, row, col): value of a cell; blanks read as 0.
    let cell_values = values.clone();
    engine.register_fn(
        "CELL",
        move |sheet: i64, row: i64, col: i64| -> Result<Dynamic, Box<EvalAltResult>> {
            let addr = Address::new(to_sheet(sheet)?, to_usize(row, "row")?, to_usize(col, "col")?);
            let Some(value) = cell_values.get(&addr) else {
                return Ok(Dynamic::from(0.0_f64));
            };
            value.to_dynamic().ok_or_else(|| error_ref(&addr))
        },
    );

    let sum_values = values.clone();
    engine.register_fn(
        "SUM_RANGE",
        move |s: i64, r1: i64, c1: i64, r2: i64, c2: i64| -> Result<f64, Box<EvalAltResult>> {
            Ok(range_numbers(&sum_values, s, r1, c1, r2, c2)?.iter().sum())
        },
    );

    let avg_values = values.clone();
    engine.register_fn(
        "AVG_RANGE",
        move |s: i64, r1: i64, c1: i64, r2: i64, c2: i64| -> Result<f64, Box<EvalAltResult>> {
            let nums = range_numbers(&avg_values, s, r1, c1, r2, c2)?;
            if nums.is_empty() {
                return Err(invalid_arg("AVG of a range with no numbers"));
            }
            Ok(nums.iter().sum::<f64>() / nums.len() as f64)
        },
    );

    let count_values = values.clone();
    engine.register_fn(
        "COUNT_RANGE",
        move |s: i64, r1: i64, c1: i64, r2: i64, c2: i64| -> Result<f64, Box<EvalAltResult>> {
            Ok(range_numbers(&count_values, s, r1, c1, r2, c2)?.len() as f64)
        },
    );

    let min_values = values.clone();
    engine.register_fn(
        "MIN_RANGE",
        move |s: i64, r1: i64, c1: i64, r2: i64, c2: i64| -> Result<f64, Box<EvalAltResult>> {
            let nums = range_numbers(&min_values, s, r1, c1, r2, c2)?;
            Ok(nums.into_iter().reduce(f64::min).unwrap_or(0.0))
        },
    );

    let max_values = values;
    engine.register_fn(
        "MAX_RANGE",
        move |s: i64, r1: i64, c1: i64, r2: i64, c2: i64| -> Result<f64, Box<EvalAltResult>> {
            let nums = range_numbers(&max_values, s, r1, c1, r2, c2)?;
            Ok(nums.into_iter().reduce(f64::max).unwrap_or(0.0))
        },
    );

    // Scalar helpers. Rhai does not coerce arguments for native functions,
    // so each takes both INT and FLOAT overloads.
    engine.register_fn("ABS", |x: f64| -> f64 { x.abs() });
    engine.register_fn("ABS", |x: i64| -> f64 { (x as f64).abs() });
    engine.register_fn("SQRT", |x: f64| -> f64 { x.sqrt() });
    engine.register_fn("SQRT", |x: i64| -> f64 { (x as f64).sqrt() });
    engine.register_fn("POW", |base: f64, exp: f64| -> f64 { base.powf(exp) });
    engine.register_fn("POW", |base: f64, exp: i64| -> f64 { base.powf(exp as f64) });
    engine.register_fn("POW", |base: i64, exp: f64| -> f64 { (base as f64).powf(exp) });
    engine.register_fn("POW", |base: i64, exp: i64| -> f64 { (base as f64).powf(exp as f64) });
    engine.register_fn("ROUND", |x: f64| -> f64 { x.round() });
    engine.register_fn("ROUND", |x: i64| -> f64 { x as f64 });
    engine.register_fn("ROUND", round_to);
    engine.register_fn("ROUND", |x: i64, digits: i64| -> f64 { round_to(x as f64, digits) });
}
