//! CSV to column conversion

use std::io;
use std::path::Path;

use crate::codec::{Column, ColumnType, Schema};
use crate::errors::{ColumnarError, ColumnarResult};
use crate::observability::Logger;
use crate::storage::{ColumnarWriter, WriteOptions, WriteSummary};

use super::infer::{convert_values, infer_type};

/// Reads a CSV file with a header row into typed columns.
///
/// Each column's type is inferred from all of its cells. A column whose
/// cells then fail to convert is stored as `string`.
///
/// # Errors
///
/// - `Io` if the file cannot be read or is not UTF-8
/// - `SchemaMismatch` if there is no header or a row has the wrong
///   number of fields
pub fn read_csv(path: &Path) -> ColumnarResult<(Vec<Column>, Schema)> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| csv_error(path, e))?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.is_empty() {
        return Err(ColumnarError::SchemaMismatch(format!(
            "{} has no header row",
            path.display()
        )));
    }

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, e))?;
        for (cells, field) in raw.iter_mut().zip(record.iter()) {
            cells.push(field.to_string());
        }
    }

    let mut columns = Vec::with_capacity(headers.len());
    let mut schema = Schema::new();
    for (name, cells) in headers.into_iter().zip(raw) {
        let inferred = infer_type(&cells);
        let (column_type, values) = match convert_values(&cells, inferred) {
            Some(values) => (inferred, values),
            None => (
                ColumnType::String,
                convert_values(&cells, ColumnType::String).unwrap_or_default(),
            ),
        };
        schema.insert(name.clone(), column_type);
        columns.push(Column::new(name, values));
    }

    Ok((columns, schema))
}

/// Converts a CSV file into a columnar artifact at `destination`
pub fn csv_to_columnar(
    csv_path: &Path,
    destination: &Path,
    options: &WriteOptions,
) -> ColumnarResult<WriteSummary> {
    let (columns, schema) = read_csv(csv_path)?;
    let summary = ColumnarWriter::new(options.clone()).write(destination, &columns, &schema)?;

    let types: Vec<String> = columns
        .iter()
        .filter_map(|c| schema.get(&c.name).map(|t| format!("{}:{}", c.name, t)))
        .collect();
    Logger::info(
        "CSV_INGESTED",
        &[
            ("source", &csv_path.display().to_string()),
            ("destination", &summary.path.display().to_string()),
            ("num_rows", &summary.num_rows.to_string()),
            ("columns", &types.join(",")),
        ],
    );
    Ok(summary)
}

fn csv_error(path: &Path, err: csv::Error) -> ColumnarError {
    let line = err.position().map(|p| p.line());
    match err.into_kind() {
        csv::ErrorKind::Io(source) => ColumnarError::io_at_path("Failed to read", path, source),
        csv::ErrorKind::UnequalLengths { expected_len, len, .. } => {
            ColumnarError::SchemaMismatch(format!(
                "{} line {}: expected {} fields, found {}",
                path.display(),
                line.map(|l| l.to_string()).unwrap_or_else(|| "?".into()),
                expected_len,
                len
            ))
        }
        other => ColumnarError::io_at_path(
            "Failed to parse",
            path,
            io::Error::new(io::ErrorKind::InvalidData, format!("{:?}", other)),
        ),
    }
}
