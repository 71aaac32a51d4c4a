//! Query Execution Tests
//!
//! Runs the query engine over artifacts built from tests/data/sample.csv:
//! - Filters return matching rows in storage order
//! - Aggregates produce one row labelled FUNC(arg)
//! - Every layout answers identically
//! - Malformed queries fail with typed errors

use colstore::codec::Value;
use colstore::ingest::csv_to_columnar;
use colstore::query::{explain, QueryEngine, Row};
use colstore::storage::{ColumnarReader, WriteOptions};
use colstore::ColumnarError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn sample_csv() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/sample.csv")
}

fn build(temp_dir: &TempDir, name: &str, options: WriteOptions) -> ColumnarReader {
    let dest = temp_dir.path().join(name);
    csv_to_columnar(&sample_csv(), &dest, &options).unwrap();
    ColumnarReader::open(&dest).unwrap()
}

fn column_of(rows: &[Row], label: &str) -> Vec<Value> {
    rows.iter()
        .map(|row| row.get(label).cloned().unwrap_or(Value::Null))
        .collect()
}

fn strings(values: &[&str]) -> Vec<Value> {
    values.iter().map(|v| Value::from(*v)).collect()
}

// =============================================================================
// Filters
// =============================================================================

#[test]
fn test_age_filter_returns_rows_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let reader = build(&temp_dir, "people.col", WriteOptions::single_file());

    let rows = QueryEngine::new(&reader)
        .execute("SELECT name FROM people WHERE age > 35")
        .unwrap();

    assert_eq!(column_of(&rows, "name"), strings(&["Charlie", "Evan", "George"]));
}

#[test]
fn test_department_filter_with_quoted_literal() {
    let temp_dir = TempDir::new().unwrap();
    let reader = build(&temp_dir, "people.col", WriteOptions::compressed());

    let rows = QueryEngine::new(&reader)
        .execute("SELECT name, salary FROM people WHERE department = 'Engineering'")
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(column_of(&rows, "name"), strings(&["Alice", "Evan"]));
    assert_eq!(
        column_of(&rows, "salary"),
        vec![Value::Float(75000.5), Value::Float(68000.0)]
    );
    assert_eq!(rows[0].labels().collect::<Vec<_>>(), vec!["name", "salary"]);
}

#[test]
fn test_every_operator() {
    let temp_dir = TempDir::new().unwrap();
    let reader = build(&temp_dir, "people.col", WriteOptions::single_file());
    let engine = QueryEngine::new(&reader);

    let cases = [
        ("id >= 6", vec![6, 7]),
        ("id <= 2", vec![1, 2]),
        ("id != 4", vec![1, 2, 3, 5, 6, 7]),
        ("id = 4", vec![4]),
        ("id > 6", vec![7]),
        ("id < 2", vec![1]),
    ];
    for (predicate, expected) in cases {
        let rows = engine
            .execute(&format!("SELECT id FROM t WHERE {}", predicate))
            .unwrap();
        let expected: Vec<Value> = expected.into_iter().map(Value::Int).collect();
        assert_eq!(column_of(&rows, "id"), expected, "predicate {}", predicate);
    }
}

#[test]
fn test_layouts_answer_identically() {
    let temp_dir = TempDir::new().unwrap();
    let readers = [
        build(&temp_dir, "a.col", WriteOptions::single_file()),
        build(&temp_dir, "b.col", WriteOptions::compressed()),
        build(&temp_dir, "c_dir", WriteOptions::directory()),
    ];

    let sql = "SELECT * FROM people WHERE salary < 70000.0";
    let results: Vec<Vec<Row>> = readers
        .iter()
        .map(|reader| QueryEngine::new(reader).execute(sql).unwrap())
        .collect();

    assert_eq!(results[0].len(), 4);
    assert_eq!(results[0], results[1]);
    assert_eq!(results[0], results[2]);
    assert_eq!(
        results[0][0].labels().collect::<Vec<_>>(),
        vec!["id", "name", "age", "salary", "department"]
    );
}

// =============================================================================
// Aggregates
// =============================================================================

#[test]
fn test_aggregates_over_sample() {
    let temp_dir = TempDir::new().unwrap();
    let reader = build(&temp_dir, "people.col", WriteOptions::single_file());

    let rows = QueryEngine::new(&reader)
        .execute("SELECT COUNT(*), SUM(age), AVG(age), MIN(salary), MAX(name) FROM people")
        .unwrap();

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.get("COUNT(*)"), Some(&Value::Int(7)));
    assert_eq!(row.get("SUM(age)"), Some(&Value::Int(236)));
    match row.get("AVG(age)") {
        Some(Value::Float(avg)) => assert!((avg - 236.0 / 7.0).abs() < 1e-9),
        other => panic!("unexpected AVG {:?}", other),
    }
    assert_eq!(row.get("MIN(salary)"), Some(&Value::Float(48000.0)));
    assert_eq!(row.get("MAX(name)"), Some(&Value::from("George")));
}

#[test]
fn test_filtered_aggregates() {
    let temp_dir = TempDir::new().unwrap();
    let reader = build(&temp_dir, "people_dir", WriteOptions::directory());

    let rows = QueryEngine::new(&reader)
        .execute("select count(id), sum(salary) from people where department = Marketing")
        .unwrap();

    let row = &rows[0];
    assert_eq!(row.get("COUNT(id)"), Some(&Value::Int(2)));
    assert_eq!(row.get("SUM(salary)"), Some(&Value::Float(117000.25)));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_query_errors() {
    let temp_dir = TempDir::new().unwrap();
    let reader = build(&temp_dir, "people.col", WriteOptions::single_file());
    let engine = QueryEngine::new(&reader);

    let cases = [
        ("SELECT bonus FROM people", "COL_COLUMN_NOT_FOUND"),
        ("SELECT name FROM people WHERE age > thirty", "COL_VALUE_CAST"),
        ("SELECT AVG(department) FROM people", "COL_UNSUPPORTED_AGGREGATE"),
        ("SELECT MEDIAN(age) FROM people", "COL_UNSUPPORTED_AGGREGATE"),
        ("SELECT name FROM people WHERE age", "COL_QUERY_SYNTAX"),
        ("DELETE FROM people", "COL_QUERY_SYNTAX"),
        ("SELECT name, MAX(age) FROM people", "COL_QUERY_SYNTAX"),
    ];

    for (sql, code) in cases {
        let err = engine.execute(sql).unwrap_err();
        assert_eq!(err.code(), code, "query {:?} gave {:?}", sql, err);
        assert!(!err.is_fatal());
    }

    let err = engine.execute("SELECT bonus FROM people").unwrap_err();
    assert!(matches!(err, ColumnarError::ColumnNotFound(ref name) if name == "bonus"));
}

#[test]
fn test_explain_matches_execution_inputs() {
    let plan = explain("SELECT name FROM people WHERE age > 35").unwrap();
    assert_eq!(plan.projection, vec!["name"]);
    assert_eq!(plan.needed_columns, vec!["name", "age"]);
    assert_eq!(plan.predicate.map(|p| p.op), Some(">".to_string()));
}
