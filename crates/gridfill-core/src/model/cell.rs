//! Cell values and the `{value, formula}` cell record.

use gridfill_engine::Value;
use gridfill_engine::engine::format_number;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A displayed cell value: the grid only ever shows text or numbers.
///
/// Finite numbers serialize as JSON numbers. JSON has no infinity or NaN,
/// so those are written as `{"float": "inf" | "-inf" | "nan"}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged, from = "RawCellValue")]
pub enum CellValue {
    Number(#[serde(serialize_with = "serialize_number")] f64),
    Text(String),
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct NonFinite {
    float: String,
}

impl NonFinite {
    fn new(n: f64) -> NonFinite {
        let float = if n.is_nan() {
            "nan"
        } else if n > 0.0 {
            "inf"
        } else {
            "-inf"
        };
        NonFinite {
            float: float.to_string(),
        }
    }

    fn value(&self) -> Option<f64> {
        match self.float.as_str() {
            "inf" => Some(f64::INFINITY),
            "-inf" => Some(f64::NEG_INFINITY),
            "nan" => Some(f64::NAN),
            _ => None,
        }
    }
}

fn serialize_number<S: Serializer>(n: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if n.is_finite() {
        serializer.serialize_f64(*n)
    } else {
        NonFinite::new(*n).serialize(serializer)
    }
}

/// Everything a stored grid may contain. Cells that were never filled come
/// back as `null` from some grid surfaces.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCellValue {
    Number(f64),
    Text(String),
    Bool(bool),
    NonFinite(NonFinite),
    Null,
}

impl From<RawCellValue> for CellValue {
    fn from(raw: RawCellValue) -> Self {
        match raw {
            RawCellValue::Number(n) => CellValue::Number(n),
            RawCellValue::Text(s) => CellValue::Text(s),
            RawCellValue::Bool(b) => CellValue::Text(b.to_string()),
            RawCellValue::NonFinite(nf) => match nf.value() {
                Some(n) => CellValue::Number(n),
                None => CellValue::blank(),
            },
            RawCellValue::Null => CellValue::blank(),
        }
    }
}

impl CellValue {
    pub fn blank() -> CellValue {
        CellValue::Text(String::new())
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.is_empty())
    }

    /// Text shown in the grid and in the formula bar.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
        }
    }

    /// Loose numeric coercion used by autofill.
    ///
    /// Blank or whitespace-only text is `0`; other text must parse as a
    /// decimal float once trimmed. NaN never counts as a number.
    pub fn to_number(&self) -> Option<f64> {
        let n = match self {
            CellValue::Number(n) => *n,
            CellValue::Text(s) => {
                let t = s.trim();
                if t.is_empty() {
                    0.0
                } else {
                    t.parse::<f64>().ok()?
                }
            }
        };
        (!n.is_nan()).then_some(n)
    }

    /// The literal handed to the formula engine for this value.
    pub fn to_engine_value(&self) -> Value {
        match self {
            CellValue::Number(n) => Value::Number(*n),
            CellValue::Text(s) => Value::from_input(s),
        }
    }
}

impl From<Value> for CellValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(n) => CellValue::Number(n),
            Value::Text(s) => CellValue::Text(s),
            Value::Empty => CellValue::blank(),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::blank()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

/// A cell of the authoritative model.
///
/// When `formula` is set it holds the full input including the leading `=`,
/// and `value` is the last value the formula engine computed for it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct Cell {
    pub value: CellValue,
    #[serde(default)]
    pub formula: Option<String>,
}

impl Cell {
    pub fn blank() -> Cell {
        Cell::default()
    }

    pub fn literal(value: impl Into<CellValue>) -> Cell {
        Cell {
            value: value.into(),
            formula: None,
        }
    }

    pub fn computed(value: CellValue, formula: &str) -> Cell {
        Cell {
            value,
            formula: Some(formula.to_string()),
        }
    }

    /// What the formula bar shows for this cell.
    pub fn input_text(&self) -> String {
        match &self.formula {
            Some(f) => f.clone(),
            None => self.value.display_text(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.formula.is_none() && self.value.is_blank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_number_follows_loose_coercion() {
        assert_eq!(CellValue::from(" 12 ").to_number(), Some(12.0));
        assert_eq!(CellValue::from("").to_number(), Some(0.0));
        assert_eq!(CellValue::from("-0.5").to_number(), Some(-0.5));
        assert_eq!(CellValue::from(3.0).to_number(), Some(3.0));
        assert_eq!(CellValue::from("x").to_number(), None);
        assert_eq!(CellValue::from("NaN").to_number(), None);
        assert_eq!(CellValue::from(f64::NAN).to_number(), None);
    }

    #[test]
    fn deserializes_raw_grid_values() {
        let values: Vec<CellValue> = serde_json::from_str(r#"[1.5, "a", null, true]"#).unwrap();
        assert_eq!(
            values,
            vec![
                CellValue::Number(1.5),
                CellValue::from("a"),
                CellValue::blank(),
                CellValue::from("true"),
            ]
        );
    }

    #[test]
    fn serializes_untagged() {
        let json = serde_json::to_string(&vec![CellValue::from(2.0), CellValue::from("b")]).unwrap();
        assert_eq!(json, r#"[2.0,"b"]"#);
    }

    #[test]
    fn input_text_prefers_formula() {
        let cell = Cell::computed(CellValue::from(2.0), "=1+1");
        assert_eq!(cell.input_text(), "=1+1");
        assert_eq!(Cell::literal(14.0).input_text(), "14");
    }

    #[test]
    fn non_finite_numbers_round_trip() {
        let values = vec![
            CellValue::from(f64::INFINITY),
            CellValue::from(f64::NEG_INFINITY),
            CellValue::from("inf"),
            CellValue::from(1.5),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[{"float":"inf"},{"float":"-inf"},"inf",1.5]"#);
        let back: Vec<CellValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);

        let json = serde_json::to_string(&CellValue::from(f64::NAN)).unwrap();
        assert_eq!(json, r#"{"float":"nan"}"#);
        let back: CellValue = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, CellValue::Number(n) if n.is_nan()));
    }
}
