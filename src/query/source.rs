//! Column access for the query engine

use std::collections::HashMap;

use crate::codec::{ColumnType, Value};
use crate::errors::{ColumnarError, ColumnarResult};
use crate::storage::ColumnarReader;

/// Read-only access to named columns.
///
/// The engine only goes through this trait, so it can run over an
/// artifact on disk or an in-memory table.
pub trait ColumnSource {
    /// Row count shared by every column
    fn num_rows(&self) -> u64;

    /// Column names in storage order
    fn column_names(&self) -> Vec<String>;

    /// Declared type, or `None` if the column does not exist
    fn column_type(&self, name: &str) -> Option<ColumnType>;

    /// Returns the full column, exactly `num_rows` values.
    /// Returns `ColumnNotFound` for unknown names.
    fn read_column(&self, name: &str) -> ColumnarResult<Vec<Value>>;
}

impl ColumnSource for ColumnarReader {
    fn num_rows(&self) -> u64 {
        ColumnarReader::num_rows(self)
    }

    fn column_names(&self) -> Vec<String> {
        ColumnarReader::column_names(self)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn column_type(&self, name: &str) -> Option<ColumnType> {
        ColumnarReader::column_type(self, name)
    }

    fn read_column(&self, name: &str) -> ColumnarResult<Vec<Value>> {
        ColumnarReader::read_column(self, name)
    }
}

/// Columns fetched during one query, each read at most once
pub(crate) struct ColumnCache<'a, S: ColumnSource + ?Sized> {
    source: &'a S,
    columns: HashMap<String, Vec<Value>>,
}

impl<'a, S: ColumnSource + ?Sized> ColumnCache<'a, S> {
    pub(crate) fn new(source: &'a S) -> Self {
        Self {
            source,
            columns: HashMap::new(),
        }
    }

    /// Reads the column from the source unless it is already cached.
    ///
    /// A column whose length differs from the source row count is `CorruptData`.
    pub(crate) fn load(&mut self, name: &str) -> ColumnarResult<()> {
        if !self.columns.contains_key(name) {
            let values = self.source.read_column(name)?;
            let expected = self.source.num_rows();
            if values.len() as u64 != expected {
                return Err(ColumnarError::CorruptData(format!(
                    "column '{}' returned {} rows, source has {}",
                    name,
                    values.len(),
                    expected
                )));
            }
            self.columns.insert(name.to_string(), values);
        }
        Ok(())
    }

    /// Returns a column previously passed to [`ColumnCache::load`]
    pub(crate) fn column(&self, name: &str) -> ColumnarResult<&[Value]> {
        self.columns
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| ColumnarError::ColumnNotFound(name.to_string()))
    }

    /// Number of distinct columns read so far
    pub(crate) fn len(&self) -> usize {
        self.columns.len()
    }
}
