//! Scalar store values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A value held by the [`Store`](crate::Store): text or a number.
///
/// Numbers without a fractional part display as integers (`3`, not `3.0`).
/// In config files a string literal deserializes as `Text` and any numeric
/// literal as `Number`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

/// Largest magnitude displayed without a decimal point.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

impl Value {
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    /// Interpret user-entered `text` with the same kind as `self`.
    ///
    /// A number keeps its kind when `text` parses as one; everything else
    /// becomes `Text`.
    #[must_use]
    pub fn coerce_like(&self, text: &str) -> Value {
        match self {
            Self::Number(_) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map_or_else(|| Self::Text(text.to_owned()), Self::Number),
            Self::Text(_) => Self::Text(text.to_owned()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER => {
                write!(f, "{}", *n as i64)
            }
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_numbers_display_without_fraction() {
        assert_eq!(Value::from(3).to_string(), "3");
        assert_eq!(Value::from(-2.0).to_string(), "-2");
        assert_eq!(Value::from(0.0).to_string(), "0");
    }

    #[test]
    fn fractional_numbers_keep_fraction() {
        assert_eq!(Value::from(1.5).to_string(), "1.5");
    }

    #[test]
    fn text_displays_verbatim() {
        assert_eq!(Value::from("hello").to_string(), "hello");
    }

    #[test]
    fn coerce_like_number() {
        let current = Value::from(1);
        assert_eq!(current.coerce_like(" 42 "), Value::Number(42.0));
        assert_eq!(current.coerce_like("abc"), Value::from("abc"));
        assert_eq!(current.coerce_like("NaN"), Value::from("NaN"));
    }

    #[test]
    fn coerce_like_text_keeps_text() {
        assert_eq!(Value::from("x").coerce_like("42"), Value::from("42"));
    }

    #[test]
    fn deserializes_untagged() {
        let n: Value = serde_json::from_str("3").unwrap();
        assert_eq!(n, Value::Number(3.0));
        let s: Value = serde_json::from_str("\"three\"").unwrap();
        assert_eq!(s, Value::from("three"));
    }
}
