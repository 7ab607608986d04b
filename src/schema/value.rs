//! Cell values held by node and edge tables.
//!
//! Workbook cells are loosely typed, so every cell is one of a small set of
//! primitives. Extra columns keep whatever primitive they were loaded with.

use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Missing cells: nulls and blank text.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric view used by summary statistics; text is parsed leniently.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) if f.is_finite() => Some(*f),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        }
    }

    /// Text used for display and as a comparison key (ids, sort keys, CSV cells).
    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) if x.is_finite() => write!(f, "{}", x),
            Value::Float(_) => Ok(()),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// JSON form: primitives pass through, NaN/inf floats become "".
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(x) if x.is_finite() => serializer.serialize_f64(*x),
            Value::Float(_) => serializer.serialize_str(""),
            Value::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blank_text_counts_as_missing() {
        assert!(Value::Null.is_missing());
        assert!(Value::from("   ").is_missing());
        assert!(!Value::from("N1").is_missing());
        assert!(!Value::Int(0).is_missing());
    }

    #[test]
    fn json_form_follows_primitive_rules() {
        let values = vec![
            Value::Null,
            Value::Bool(true),
            Value::Int(3),
            Value::Float(0.5),
            Value::Float(f64::NAN),
            Value::from("x"),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[null,true,3,0.5,"","x"]"#);
    }

    #[test]
    fn numeric_view_parses_text() {
        assert_eq!(Value::from(" 0.8 ").as_f64(), Some(0.8));
        assert_eq!(Value::from("high").as_f64(), None);
        assert_eq!(Value::Int(1).as_f64(), Some(1.0));
        assert_eq!(Value::Null.as_f64(), None);
    }
}
