//! CSV Ingestion Tests
//!
//! Header order becomes storage order; each column gets the narrowest
//! type all of its cells parse as.

use colstore::codec::{ColumnType, Value};
use colstore::ingest::{csv_to_columnar, infer_type, read_csv};
use colstore::storage::{ColumnarReader, WriteOptions};
use colstore::ColumnarError;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn sample_csv() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/sample.csv")
}

#[test]
fn test_sample_schema_inference() {
    let (columns, schema) = read_csv(&sample_csv()).unwrap();

    let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "name", "age", "salary", "department"]);

    assert_eq!(schema["id"], ColumnType::Int);
    assert_eq!(schema["name"], ColumnType::String);
    assert_eq!(schema["age"], ColumnType::Int);
    assert_eq!(schema["salary"], ColumnType::Float);
    assert_eq!(schema["department"], ColumnType::String);
    assert!(columns.iter().all(|c| c.len() == 7));
}

#[test]
fn test_convert_and_read_back() {
    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("sample.col");

    let summary = csv_to_columnar(&sample_csv(), &dest, &WriteOptions::compressed()).unwrap();
    assert_eq!(summary.num_rows, 7);
    assert_eq!(summary.num_columns, 5);
    assert_eq!(summary.bytes_written, fs::metadata(&dest).unwrap().len());

    let reader = ColumnarReader::open(&dest).unwrap();
    assert_eq!(reader.column_type("salary"), Some(ColumnType::Float));
    let salary = reader.read_column("salary").unwrap();
    assert_eq!(salary[0], Value::Float(75000.5));
    assert_eq!(salary[2], Value::Float(91000.75));
}

#[test]
fn test_mixed_column_falls_back_to_string() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("mixed.csv");
    fs::write(&path, "code,qty\nA1,1\n22,2.5\n").unwrap();

    let (columns, schema) = read_csv(&path).unwrap();
    assert_eq!(schema["code"], ColumnType::String);
    assert_eq!(schema["qty"], ColumnType::Float);
    assert_eq!(columns[0].values, vec![Value::from("A1"), Value::from("22")]);
}

#[test]
fn test_infer_type_order() {
    assert_eq!(infer_type(&["1", "2"]), ColumnType::Int);
    assert_eq!(infer_type(&["1", "2.0"]), ColumnType::Float);
    assert_eq!(infer_type(&["1", "x"]), ColumnType::String);
}

#[test]
fn test_duplicate_headers_rejected_by_writer() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("dup.csv");
    fs::write(&path, "a,a\n1,2\n").unwrap();

    let err = csv_to_columnar(&path, &temp_dir.path().join("out.col"), &WriteOptions::default())
        .unwrap_err();
    assert!(matches!(err, ColumnarError::SchemaMismatch(_)));
}

#[test]
fn test_ragged_csv_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("ragged.csv");
    fs::write(&path, "a,b\n1,2\n3,4,5\n").unwrap();

    assert!(matches!(read_csv(&path), Err(ColumnarError::SchemaMismatch(_))));
}
