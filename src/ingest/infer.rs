//! Column type inference for text input

use crate::codec::{ColumnType, Value};

/// Picks the narrowest type every value parses as: `int` (32-bit), then
/// `float`, then `string`. Values are trimmed first. An empty column is
/// `int`.
pub fn infer_type<S: AsRef<str>>(values: &[S]) -> ColumnType {
    if values.iter().all(|v| v.as_ref().trim().parse::<i32>().is_ok()) {
        ColumnType::Int
    } else if values.iter().all(|v| v.as_ref().trim().parse::<f64>().is_ok()) {
        ColumnType::Float
    } else {
        ColumnType::String
    }
}

/// Converts raw text cells to `column_type`.
///
/// Returns `None` if any cell fails to parse; strings always convert and
/// keep their untrimmed text.
pub fn convert_values(raw: &[String], column_type: ColumnType) -> Option<Vec<Value>> {
    match column_type {
        ColumnType::Int => raw
            .iter()
            .map(|v| v.trim().parse::<i32>().ok().map(Value::from))
            .collect(),
        ColumnType::Float => raw
            .iter()
            .map(|v| v.trim().parse::<f64>().ok().map(Value::Float))
            .collect(),
        ColumnType::String => Some(raw.iter().cloned().map(Value::Str).collect()),
    }
}
