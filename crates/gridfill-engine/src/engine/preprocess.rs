//! Formula preprocessing.
//!
//! Before a formula can be compiled by Rhai, spreadsheet references are
//! rewritten into calls to the registered built-ins:
//!
//! - `A1` → `CELL(sheet, 0, 0)`
//! - `SUM(A1:B5)` → `SUM_RANGE(sheet, 0, 0, 4, 1)` (rows first)
//!
//! String literals are left untouched.

use super::cell_ref::{CellRef, SheetId};
use super::deps::{cell_refs, mask_string_literals, parse_range_bounds};

/// Rewrite references in `formula` (without the leading `=`) for evaluation on `sheet`.
pub fn preprocess_formula(formula: &str, sheet: SheetId) -> String {
    let masked = mask_string_literals(formula);
    let mut edits: Vec<(std::ops::Range<usize>, String)> = Vec::new();

    for caps in crate::builtins::range_fn_re().captures_iter(&masked) {
        let Some(whole) = caps.get(0) else { continue };
        let Some(rhai_name) = crate::builtins::range_rhai_name(&caps[1]) else {
            continue;
        };
        let Some((start, end)) = parse_range_bounds(&caps[2], &caps[3]) else {
            continue;
        };
        edits.push((
            whole.range(),
            format!(
                "{}({}, {}, {}, {}, {})",
                rhai_name, sheet.0, start.row, start.col, end.row, end.col
            ),
        ));
    }

    for m in cell_refs(&masked) {
        if edits.iter().any(|(r, _)| r.contains(&m.start())) {
            continue;
        }
        if let Some(cr) = CellRef::parse(m.as_str()) {
            edits.push((m.range(), format!("CELL({}, {}, {})", sheet.0, cr.row, cr.col)));
        }
    }

    edits.sort_by_key(|(r, _)| r.start);
    let mut out = String::with_capacity(formula.len() + edits.len() * 16);
    let mut cursor = 0;
    for (range, replacement) in edits {
        out.push_str(&formula[cursor..range.start]);
        out.push_str(&replacement);
        cursor = range.end;
    }
    out.push_str(&formula[cursor..]);
    out
}
