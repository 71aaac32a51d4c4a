//! CSV ingestion
//!
//! Turns a headed CSV file into typed columns and hands them to the
//! storage writer.

mod infer;
mod reader;

pub use infer::{convert_values, infer_type};
pub use reader::{csv_to_columnar, read_csv};
