//! Type tags, scalar values and column vectors

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ColumnarError;

/// Column type tag.
///
/// The serialized spellings (`int`, `float`, `string`) are part of the
/// on-disk metadata format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// int32, 4 bytes little-endian
    Int,
    /// float64, 8 bytes little-endian
    Float,
    /// u32 little-endian length prefix + UTF-8 bytes
    String,
}

impl ColumnType {
    /// Returns the metadata spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::String => "string",
        }
    }

    /// Encoded width for fixed-width types
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            ColumnType::Int => Some(4),
            ColumnType::Float => Some(8),
            ColumnType::String => None,
        }
    }

    /// Returns whether `value` can be stored under this tag
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ColumnType::Int, Value::Int(v)) => i32::try_from(*v).is_ok(),
            (ColumnType::Float, Value::Float(_)) => true,
            (ColumnType::String, Value::Str(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = ColumnarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(ColumnType::Int),
            "float" => Ok(ColumnType::Float),
            "string" => Ok(ColumnType::String),
            other => Err(ColumnarError::UnsupportedType(format!(
                "unknown type tag '{}'",
                other
            ))),
        }
    }
}

/// Column name to type tag
pub type Schema = BTreeMap<String, ColumnType>;

/// A scalar cell value.
///
/// `Null` is never stored; it only appears as the result of an aggregate
/// over zero rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Returns the type tag this value naturally belongs to
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            Value::Null => None,
            Value::Int(_) => Some(ColumnType::Int),
            Value::Float(_) => Some(ColumnType::Float),
            Value::Str(_) => Some(ColumnType::String),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view; ints widen to f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Native ordering between two values of the same type.
    ///
    /// Floats use IEEE semantics, so any comparison involving NaN yields
    /// `None`. Values of different types are unordered.
    pub fn partial_cmp_native(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Str(a), Value::Str(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

/// A named column vector. Position in a dataset is storage order.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Builds a column from anything convertible to `Value`
    pub fn from_values<T: Into<Value>>(name: impl Into<String>, values: impl IntoIterator<Item = T>) -> Self {
        Self::new(name, values.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tag_spellings() {
        for tag in [ColumnType::Int, ColumnType::Float, ColumnType::String] {
            assert_eq!(tag.as_str().parse::<ColumnType>().unwrap(), tag);
            let json = serde_json::to_string(&tag).unwrap();
            assert_eq!(json, format!("\"{}\"", tag.as_str()));
        }
    }

    #[test]
    fn test_unknown_tag_is_unsupported() {
        let err = "bool".parse::<ColumnType>().unwrap_err();
        assert!(matches!(err, ColumnarError::UnsupportedType(_)));
    }

    #[test]
    fn test_int_tag_rejects_out_of_range() {
        assert!(ColumnType::Int.accepts(&Value::Int(i32::MAX as i64)));
        assert!(!ColumnType::Int.accepts(&Value::Int(i32::MAX as i64 + 1)));
        assert!(!ColumnType::Int.accepts(&Value::Float(1.0)));
        assert!(!ColumnType::String.accepts(&Value::Null));
    }

    #[test]
    fn test_native_ordering() {
        assert_eq!(
            Value::from(3).partial_cmp_native(&Value::from(5)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::from("b").partial_cmp_native(&Value::from("a")),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Value::Float(f64::NAN).partial_cmp_native(&Value::Float(1.0)),
            None
        );
        assert_eq!(Value::from(1).partial_cmp_native(&Value::from("1")), None);
    }
}
