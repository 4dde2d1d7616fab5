//! Persisted snapshot format.
//!
//! Version 1 (written):
//!
//! ```json
//! { "version": 1, "cells": [[{ "value": 2, "formula": "=1+1" }, ...], ...] }
//! ```
//!
//! Version 0 (read only) is a bare row-major array of raw values with no
//! formula metadata. It is migrated to version 1 on load.

use serde::{Deserialize, Serialize};

use crate::error::{GridfillError, Result};
use crate::model::{Cell, CellValue, Grid};

pub const SNAPSHOT_VERSION: u64 = 1;

#[derive(Serialize)]
struct SnapshotOut<'a> {
    version: u64,
    cells: &'a [Vec<Cell>],
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotV1 {
    #[allow(dead_code)]
    version: u64,
    cells: Vec<Vec<Cell>>,
}

pub fn encode(grid: &Grid) -> Result<String> {
    Ok(serde_json::to_string(&SnapshotOut {
        version: SNAPSHOT_VERSION,
        cells: grid.rows(),
    })?)
}

pub fn decode(text: &str) -> Result<Grid> {
    let json: serde_json::Value = serde_json::from_str(text)?;

    if json.is_array() {
        let values: Vec<Vec<CellValue>> = serde_json::from_value(json)?;
        let rows = values
            .into_iter()
            .map(|row| row.into_iter().map(Cell::literal).collect())
            .collect();
        return Ok(Grid::from_rows(rows));
    }

    if !json.is_object() {
        return Err(GridfillError::InvalidSnapshot(
            "expected an object or an array".to_string(),
        ));
    }

    let version = json
        .get("version")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| GridfillError::InvalidSnapshot("missing version".to_string()))?;
    if version != SNAPSHOT_VERSION {
        return Err(GridfillError::UnsupportedSnapshotVersion(version));
    }
    let snapshot: SnapshotV1 = serde_json::from_value(json)?;
    Ok(Grid::from_rows(snapshot.cells))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_keeps_formulas() {
        let mut grid = Grid::blank(2, 2);
        grid.set(0, 0, Cell::literal("hello"));
        grid.set(1, 1, Cell::computed(CellValue::from(2.0), "=1+1"));

        let text = encode(&grid).unwrap();
        assert!(text.starts_with(r#"{"version":1,"cells":"#));
        assert_eq!(decode(&text).unwrap(), grid);
    }

    #[test]
    fn bare_array_is_version_zero() {
        let grid = decode(r#"[[1, "a"], ["", null, 3]]"#).unwrap();
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.col_count(), 3);
        assert_eq!(grid.get(0, 0), Some(&Cell::literal(1.0)));
        assert_eq!(grid.get(0, 2), Some(&Cell::blank()));
        assert_eq!(grid.get(1, 2), Some(&Cell::literal(3.0)));
        assert!(grid.iter().all(|(_, _, c)| c.formula.is_none()));
    }

    #[test]
    fn rejects_unknown_versions_and_shapes() {
        assert!(matches!(
            decode(r#"{"version":7,"cells":[]}"#),
            Err(GridfillError::UnsupportedSnapshotVersion(7))
        ));
        assert!(matches!(
            decode(r#"{"cells":[]}"#),
            Err(GridfillError::InvalidSnapshot(_))
        ));
        assert!(matches!(decode("42"), Err(GridfillError::InvalidSnapshot(_))));
        assert!(matches!(decode("{not json"), Err(GridfillError::Json(_))));
    }
}
