use std::fmt;

use serde::{Deserialize, Serialize};

/// Scalar value held in one sheet cell.
///
/// The enum uses an explicit `{type, value}` tagged layout for stable
/// serialization across process boundaries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    /// Empty / unset cell value.
    Empty,
    /// IEEE-754 double precision number.
    Number(f64),
    /// Plain string.
    Text(String),
    /// Boolean.
    Bool(bool),
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl CellValue {
    /// Returns true if the value is [`CellValue::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Binary-flag interpretation of the cell: numbers compare against zero,
    /// booleans map directly, text must literally read `1`.
    pub fn is_set(&self) -> bool {
        match self {
            CellValue::Number(n) => *n != 0.0,
            CellValue::Bool(b) => *b,
            CellValue::Text(s) => s.trim() == "1",
            CellValue::Empty => false,
        }
    }

    /// Display form used for key and route comparison.
    ///
    /// Integral numbers render without a decimal point so a numeric customer
    /// code of `1234.0` compares equal to the text form `"1234"`.
    pub fn display(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            CellValue::Text(s) => f.write_str(s),
            CellValue::Bool(true) => f.write_str("TRUE"),
            CellValue::Bool(false) => f.write_str("FALSE"),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}
