//! Predicate evaluation

use crate::codec::{ColumnType, Value};
use crate::errors::{ColumnarError, ColumnarResult};

use super::ast::CompareOp;

/// Converts a raw predicate literal to the column's declared type.
///
/// String literals lose one layer of matching `'` or `"` quotes; anything
/// else is kept verbatim.
///
/// # Errors
///
/// `ValueCast` if an int or float literal does not parse.
pub fn cast_literal(literal: &str, column_type: ColumnType) -> ColumnarResult<Value> {
    let cast_err = || ColumnarError::ValueCast {
        literal: literal.to_string(),
        target: column_type.to_string(),
    };

    match column_type {
        ColumnType::Int => literal.parse::<i64>().map(Value::Int).map_err(|_| cast_err()),
        ColumnType::Float => literal.parse::<f64>().map(Value::Float).map_err(|_| cast_err()),
        ColumnType::String => Ok(Value::Str(strip_quotes(literal).to_string())),
    }
}

fn strip_quotes(literal: &str) -> &str {
    for quote in ['\'', '"'] {
        if literal.len() >= 2 && literal.starts_with(quote) && literal.ends_with(quote) {
            return &literal[1..literal.len() - 1];
        }
    }
    literal
}

/// Indices of the cells satisfying `cell op literal`, in row order
pub fn matching_rows(values: &[Value], op: CompareOp, literal: &Value) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, cell)| op.matches(cell.partial_cmp_native(literal)))
        .map(|(idx, _)| idx)
        .collect()
}

/// Returns the cell at `row`.
///
/// # Errors
///
/// `CorruptData` if the column is shorter than the row index.
pub fn cell_at(values: &[Value], row: usize) -> ColumnarResult<Value> {
    values.get(row).cloned().ok_or_else(|| {
        ColumnarError::CorruptData(format!(
            "row {} out of range for column of {} rows",
            row,
            values.len()
        ))
    })
}

/// Gathers `values` at the surviving row indices
pub fn select_rows(values: &[Value], rows: &[usize]) -> ColumnarResult<Vec<Value>> {
    rows.iter().map(|&idx| cell_at(values, idx)).collect()
}
