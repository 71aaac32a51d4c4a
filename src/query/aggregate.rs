//! Aggregate functions over one (filtered) column

use std::cmp::Ordering;

use crate::codec::{ColumnType, Value};
use crate::errors::{ColumnarError, ColumnarResult};

use super::ast::AggregateFunc;

/// Computes `func` over `values`, which all carry `column_type`.
///
/// Empty input gives `COUNT` 0, `SUM` 0 (or 0.0) and `Null` for the rest.
///
/// # Errors
///
/// `UnsupportedAggregate` for `SUM`/`AVG` over a string column.
pub fn compute(func: AggregateFunc, column_type: ColumnType, values: &[Value]) -> ColumnarResult<Value> {
    if column_type == ColumnType::String && matches!(func, AggregateFunc::Sum | AggregateFunc::Avg) {
        return Err(ColumnarError::UnsupportedAggregate(format!(
            "{} is not defined for string columns",
            func
        )));
    }

    Ok(match func {
        AggregateFunc::Count => Value::Int(values.len() as i64),
        AggregateFunc::Sum => sum(column_type, values),
        AggregateFunc::Avg => avg(values),
        AggregateFunc::Min => extreme(values, Ordering::Less),
        AggregateFunc::Max => extreme(values, Ordering::Greater),
    })
}

fn sum(column_type: ColumnType, values: &[Value]) -> Value {
    if column_type == ColumnType::Int {
        let mut total: i64 = 0;
        for value in values {
            match total.checked_add(value.as_i64().unwrap_or(0)) {
                Some(next) => total = next,
                None => return Value::Float(values.iter().filter_map(Value::as_f64).sum()),
            }
        }
        return Value::Int(total);
    }
    Value::Float(values.iter().filter_map(Value::as_f64).sum())
}

fn avg(values: &[Value]) -> Value {
    if values.is_empty() {
        return Value::Null;
    }
    let total: f64 = values.iter().filter_map(Value::as_f64).sum();
    Value::Float(total / values.len() as f64)
}

/// Smallest (`Less`) or largest (`Greater`) value under a total order
fn extreme(values: &[Value], want: Ordering) -> Value {
    let mut best: Option<&Value> = None;
    for value in values {
        best = match best {
            Some(current) if total_cmp(value, current) != want => Some(current),
            _ => Some(value),
        };
    }
    best.cloned().unwrap_or(Value::Null)
}

fn total_cmp(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Float(x), Value::Float(y)) => x.total_cmp(y),
        _ => a.partial_cmp_native(b).unwrap_or(Ordering::Equal),
    }
}
