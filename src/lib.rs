//! colstore - an immutable columnar storage engine with a small SQL surface
//!
//! - `codec`: binary encoding of int, float and string columns
//! - `storage`: single-file and directory artifacts, written once
//! - `query`: `SELECT ... FROM ... [WHERE ...]` with aggregates
//! - `ingest`: CSV to artifact conversion

pub mod cli;
pub mod codec;
pub mod errors;
pub mod ingest;
pub mod observability;
pub mod query;
pub mod storage;

pub use errors::{ColumnarError, ColumnarResult};
