//! Computed cell values and their display formatting.

use rhai::Dynamic;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code shown for formulas that fail at evaluation time.
pub const ERROR_CODE: &str = "#ERROR!";

/// A value held by (or computed for) a workbook cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum Value {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    Error(String),
}

impl Value {
    /// Classify literal user input.
    /// - blank -> Empty
    /// - parses as a float -> Number
    /// - `TRUE` / `FALSE` (any case) -> Bool
    /// - otherwise -> Text (untrimmed)
    pub fn from_input(input: &str) -> Value {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Value::Empty;
        }
        if let Ok(n) = trimmed.parse::<f64>() {
            if !n.is_nan() {
                return Value::Number(n);
            }
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }
        Value::Text(input.to_string())
    }

    /// Convert a Rhai evaluation result.
    pub fn from_dynamic(value: &Dynamic) -> Value {
        if value.is_unit() {
            Value::Empty
        } else if let Ok(n) = value.as_float() {
            Value::Number(n)
        } else if let Ok(n) = value.as_int() {
            Value::Number(n as f64)
        } else if let Ok(b) = value.as_bool() {
            Value::Bool(b)
        } else if let Ok(s) = value.clone().into_string() {
            Value::Text(s)
        } else if let Ok(c) = value.as_char() {
            Value::Text(c.to_string())
        } else {
            Value::Error(ERROR_CODE.to_string())
        }
    }

    /// Convert to a Rhai value for use inside formulas.
    /// Empty cells read as `0`; errors have no Rhai counterpart.
    pub fn to_dynamic(&self) -> Option<Dynamic> {
        match self {
            Value::Empty => Some(Dynamic::from(0.0_f64)),
            Value::Number(n) => Some(Dynamic::from(*n)),
            Value::Text(s) => Some(Dynamic::from(s.clone())),
            Value::Bool(b) => Some(Dynamic::from(*b)),
            Value::Error(_) => None,
        }
    }

    /// Numeric view used by range functions; text, booleans and blanks are skipped.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Text(s) => f.write_str(s),
            Value::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            Value::Error(code) => f.write_str(code),
        }
    }
}

/// Format a number for display: integral values drop the fraction,
/// everything else uses the shortest round-trip representation.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "#NAN!".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "#INF!" } else { "-#INF!" }.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_input_classifies_literals() {
        assert_eq!(Value::from_input(""), Value::Empty);
        assert_eq!(Value::from_input("   "), Value::Empty);
        assert_eq!(Value::from_input(" 42 "), Value::Number(42.0));
        assert_eq!(Value::from_input("-1.5"), Value::Number(-1.5));
        assert_eq!(Value::from_input("true"), Value::Bool(true));
        assert_eq!(Value::from_input("hello"), Value::Text("hello".to_string()));
        assert_eq!(Value::from_input("NaN"), Value::Text("NaN".to_string()));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(-14.0), "-14");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(f64::INFINITY), "#INF!");
    }

    #[test]
    fn test_from_dynamic() {
        assert_eq!(Value::from_dynamic(&Dynamic::UNIT), Value::Empty);
        assert_eq!(Value::from_dynamic(&Dynamic::from(2_i64)), Value::Number(2.0));
        assert_eq!(
            Value::from_dynamic(&Dynamic::from("x".to_string())),
            Value::Text("x".to_string())
        );
    }
}
