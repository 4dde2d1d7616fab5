//! Dependency extraction from formula strings.
//!
//! Finds every cell a formula reads, so the workbook can maintain its
//! reverse-dependency map and reject circular references.
//!
//! Handles:
//! - Simple cell references: `A1`, `b2`
//! - Range references in range functions: `SUM(A1:B5)`
//! - Ignores references inside string literals and names used as calls (`LOG10(x)`)

use regex::{Match, Regex};
use std::ops::Range;
use std::sync::OnceLock;

use super::cell_ref::CellRef;

pub(crate) const MAX_DEPENDENCY_RANGE_CELLS: usize = 1_000_000;

/// Extract all cell references from a formula as dependencies.
/// Duplicates are kept; callers that need a set dedupe.
pub fn extract_dependencies(formula: &str) -> Vec<CellRef> {
    let masked = mask_string_literals(formula);
    let mut deps = Vec::new();
    let mut covered: Vec<Range<usize>> = Vec::new();

    for caps in crate::builtins::range_fn_re().captures_iter(&masked) {
        let whole = caps.get(0).map(|m| m.range()).unwrap_or_default();
        covered.push(whole);
        if let Some((start, end)) = parse_range_bounds(&caps[2], &caps[3]) {
            deps.extend(expand_range(start, end));
        }
    }

    for m in cell_refs(&masked) {
        if covered.iter().any(|r| r.contains(&m.start())) {
            continue;
        }
        if let Some(cr) = CellRef::parse(m.as_str()) {
            deps.push(cr);
        }
    }

    deps
}

/// Every `A1`-shaped token in `masked` that is not immediately called like a function.
pub(crate) fn cell_refs(masked: &str) -> impl Iterator<Item = Match<'_>> {
    cell_ref_re()
        .find_iter(masked)
        .filter(move |m| !masked[m.end()..].starts_with('('))
}

fn cell_ref_re() -> &'static Regex {
    static CELL_RE: OnceLock<Regex> = OnceLock::new();
    CELL_RE.get_or_init(|| {
        Regex::new(r"\b[A-Za-z]+[0-9]+\b").expect("dependency cell reference regex must compile")
    })
}

/// Normalized corners of a range given its two textual endpoints.
pub(crate) fn parse_range_bounds(start: &str, end: &str) -> Option<(CellRef, CellRef)> {
    let a = CellRef::parse(start.trim())?;
    let b = CellRef::parse(end.trim())?;
    Some((
        CellRef::new(a.row.min(b.row), a.col.min(b.col)),
        CellRef::new(a.row.max(b.row), a.col.max(b.col)),
    ))
}

fn expand_range(start: CellRef, end: CellRef) -> Vec<CellRef> {
    let row_count = end.row - start.row + 1;
    let col_count = end.col - start.col + 1;
    match row_count.checked_mul(col_count) {
        Some(n) if n <= MAX_DEPENDENCY_RANGE_CELLS => {}
        _ => return Vec::new(),
    }

    let mut cells = Vec::with_capacity(row_count * col_count);
    for row in start.row..=end.row {
        for col in start.col..=end.col {
            cells.push(CellRef::new(row, col));
        }
    }
    cells
}

/// Replace the contents of string and character literals with spaces,
/// keeping byte offsets identical to the input.
pub(crate) fn mask_string_literals(script: &str) -> String {
    let mut out = String::with_capacity(script.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for ch in script.chars() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                    push_blank(&mut out, ch);
                } else if ch == '\\' {
                    escaped = true;
                    push_blank(&mut out, ch);
                } else if ch == q {
                    quote = None;
                    out.push(ch);
                } else {
                    push_blank(&mut out, ch);
                }
            }
            None => {
                if matches!(ch, '"' | '\'' | '`') {
                    quote = Some(ch);
                }
                out.push(ch);
            }
        }
    }

    out
}

fn push_blank(out: &mut String, ch: char) {
    for _ in 0..ch.len_utf8() {
        out.push(' ');
    }
}

/// Parse a cell range like "A1:B5" into its normalized corners.
pub fn parse_range(range: &str) -> Option<(CellRef, CellRef)> {
    let (start, end) = range.split_once(':')?;
    parse_range_bounds(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_dependencies_skips_over_limit_ranges() {
        let deps = extract_dependencies("SUM(A1:A1000001)+B2");
        assert_eq!(deps, vec![CellRef::new(1, 1)]);
    }

    #[test]
    fn test_extract_dependencies_ignores_strings_and_calls() {
        let deps = extract_dependencies("\"A1\" + LOG10(B2)");
        assert_eq!(deps, vec![CellRef::new(1, 1)]);
    }

    #[test]
    fn test_mask_keeps_byte_offsets() {
        let script = "\"héllo\" + A1";
        let masked = mask_string_literals(script);
        assert_eq!(masked.len(), script.len());
        assert!(masked.ends_with("+ A1"));
    }

    #[test]
    fn test_parse_range_normalizes_corners() {
        let (start, end) = parse_range("B5:A1").unwrap();
        assert_eq!(start, CellRef::new(0, 0));
        assert_eq!(end, CellRef::new(4, 1));
        assert!(parse_range("A1").is_none());
    }
}
