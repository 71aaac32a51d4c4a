//! Artifact writer
//!
//! Validates the whole dataset before any byte reaches the destination,
//! encodes every column in memory, then writes the chosen layout and fsyncs.
//! An I/O failure mid-write can leave a partial artifact behind.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};

use crate::codec::{compute_checksum, encode_column, format_checksum, Column, Schema};
use crate::errors::{ColumnarError, ColumnarResult};
use crate::observability::Logger;

use super::compression::compress;
use super::metadata::{
    DirectoryColumnMeta, DirectoryMetadata, FileColumnMeta, FileMetadata, DIRECTORY_METADATA_FILE,
    FORMAT_VERSION,
};
use super::options::{Compression, Layout, WriteOptions};

/// What a successful write produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub path: PathBuf,
    pub layout: Layout,
    pub num_rows: u64,
    pub num_columns: usize,
    /// Total bytes written, metadata included
    pub bytes_written: u64,
}

/// Writes immutable columnar artifacts.
#[derive(Debug, Clone, Default)]
pub struct ColumnarWriter {
    options: WriteOptions,
}

impl ColumnarWriter {
    pub fn new(options: WriteOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    /// Writes `columns` to `destination`; column order is storage order.
    ///
    /// # Errors
    ///
    /// - `SchemaMismatch` if there are no columns, names repeat, lengths
    ///   differ, or a value does not fit its declared type
    /// - `UnsupportedType` if a column is missing from `schema`
    /// - `Io` on any filesystem failure
    pub fn write(
        &self,
        destination: &Path,
        columns: &[Column],
        schema: &Schema,
    ) -> ColumnarResult<WriteSummary> {
        let num_rows = validate_dataset(columns, schema)?;

        let summary = match self.options.layout {
            Layout::File => self.write_single_file(destination, columns, schema, num_rows)?,
            Layout::Directory => self.write_directory(destination, columns, schema, num_rows)?,
        };

        Logger::info(
            "ARTIFACT_WRITTEN",
            &[
                ("path", &summary.path.display().to_string()),
                ("layout", summary.layout.as_str()),
                ("num_rows", &summary.num_rows.to_string()),
                ("num_columns", &summary.num_columns.to_string()),
                ("bytes", &summary.bytes_written.to_string()),
                ("compression", self.options.compression.as_str()),
            ],
        );

        Ok(summary)
    }

    fn write_single_file(
        &self,
        destination: &Path,
        columns: &[Column],
        schema: &Schema,
        num_rows: u64,
    ) -> ColumnarResult<WriteSummary> {
        let mut payloads = Vec::with_capacity(columns.len());
        let mut column_meta = Vec::with_capacity(columns.len());

        for column in columns {
            let column_type = schema[&column.name];
            let encoded = encode_column(column_type, &column.values)?;
            let original_length = encoded.len() as u64;
            let stored = compress(
                self.options.compression,
                self.options.compression_level,
                encoded,
            )?;

            column_meta.push(FileColumnMeta {
                name: column.name.clone(),
                column_type,
                length: stored.len() as u64,
                original_length: match self.options.compression {
                    Compression::None => None,
                    Compression::Zlib => Some(original_length),
                },
                compression: self.options.compression,
                checksum: Some(format_checksum(compute_checksum(&stored))),
            });
            payloads.push(stored);
        }

        let metadata = FileMetadata {
            columns: column_meta,
            num_rows,
            schema: schema_for(columns, schema),
            format_version: FORMAT_VERSION,
            created_at: Some(now_rfc3339()),
        };
        let metadata_bytes = metadata.to_json_bytes()?;
        let metadata_len = u32::try_from(metadata_bytes.len()).map_err(|_| {
            ColumnarError::UnsupportedType(format!(
                "metadata document of {} bytes exceeds the u32 header",
                metadata_bytes.len()
            ))
        })?;

        create_parent_dirs(destination)?;
        let file = File::create(destination)
            .map_err(|e| ColumnarError::io_at_path("Failed to create", destination, e))?;
        let mut out = BufWriter::new(file);

        let write_err = |e| ColumnarError::io_at_path("Failed to write", destination, e);
        out.write_all(&metadata_len.to_le_bytes()).map_err(write_err)?;
        out.write_all(&metadata_bytes).map_err(write_err)?;
        for payload in &payloads {
            out.write_all(payload).map_err(write_err)?;
        }

        let file = out
            .into_inner()
            .map_err(|e| ColumnarError::io_at_path("Failed to flush", destination, e.into_error()))?;
        file.sync_all()
            .map_err(|e| ColumnarError::io_at_path("Failed to fsync", destination, e))?;

        Ok(WriteSummary {
            path: destination.to_path_buf(),
            layout: Layout::File,
            num_rows,
            num_columns: columns.len(),
            bytes_written: 4 + metadata_bytes.len() as u64 + metadata.payload_bytes(),
        })
    }

    fn write_directory(
        &self,
        destination: &Path,
        columns: &[Column],
        schema: &Schema,
        num_rows: u64,
    ) -> ColumnarResult<WriteSummary> {
        if !self.options.compression.is_none() {
            Logger::warn(
                "COMPRESSION_IGNORED",
                &[
                    ("path", &destination.display().to_string()),
                    ("compression", self.options.compression.as_str()),
                    ("reason", "directory layout stores raw payloads"),
                ],
            );
        }

        // Encode everything before touching the filesystem
        let mut payloads = Vec::with_capacity(columns.len());
        for column in columns {
            payloads.push(encode_column(schema[&column.name], &column.values)?);
        }

        fs::create_dir_all(destination)
            .map_err(|e| ColumnarError::io_at_path("Failed to create directory", destination, e))?;

        let mut column_meta = Vec::with_capacity(columns.len());
        let mut bytes_written = 0u64;
        for (index, (column, payload)) in columns.iter().zip(&payloads).enumerate() {
            let file_name = column_file_name(index);
            write_synced(&destination.join(&file_name), payload)?;
            bytes_written += payload.len() as u64;
            column_meta.push(DirectoryColumnMeta {
                name: column.name.clone(),
                column_type: schema[&column.name],
                file: file_name,
            });
        }

        let metadata = DirectoryMetadata {
            columns: column_meta,
            num_rows,
            schema: schema_for(columns, schema),
            format_version: FORMAT_VERSION,
            created_at: Some(now_rfc3339()),
        };
        let metadata_bytes = metadata.to_json_bytes()?;
        // Metadata last: a directory without it is not an artifact
        write_synced(&destination.join(DIRECTORY_METADATA_FILE), &metadata_bytes)?;
        bytes_written += metadata_bytes.len() as u64;

        Ok(WriteSummary {
            path: destination.to_path_buf(),
            layout: Layout::Directory,
            num_rows,
            num_columns: columns.len(),
            bytes_written,
        })
    }
}

/// Checks every write precondition and returns the shared row count.
fn validate_dataset(columns: &[Column], schema: &Schema) -> ColumnarResult<u64> {
    let first = columns
        .first()
        .ok_or_else(|| ColumnarError::SchemaMismatch("at least one column is required".into()))?;
    let num_rows = first.len();

    let mut seen = HashSet::with_capacity(columns.len());
    for column in columns {
        if !seen.insert(column.name.as_str()) {
            return Err(ColumnarError::SchemaMismatch(format!(
                "duplicate column '{}'",
                column.name
            )));
        }
        if column.len() != num_rows {
            return Err(ColumnarError::SchemaMismatch(format!(
                "all columns must have the same number of rows: '{}' has {}, '{}' has {}",
                first.name,
                num_rows,
                column.name,
                column.len()
            )));
        }
    }

    for column in columns {
        let column_type = schema.get(&column.name).ok_or_else(|| {
            ColumnarError::UnsupportedType(format!("column '{}' has no type in schema", column.name))
        })?;
        if let Some((row, value)) = column
            .values
            .iter()
            .enumerate()
            .find(|(_, v)| !column_type.accepts(v))
        {
            return Err(ColumnarError::SchemaMismatch(format!(
                "column '{}' row {}: {:?} is not a valid {}",
                column.name, row, value, column_type
            )));
        }
    }

    Ok(num_rows as u64)
}

/// The stored schema covers exactly the stored columns
fn schema_for(columns: &[Column], schema: &Schema) -> Schema {
    columns
        .iter()
        .map(|c| (c.name.clone(), schema[&c.name]))
        .collect()
}

fn column_file_name(index: usize) -> String {
    format!("col_{:04}.bin", index)
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn create_parent_dirs(path: &Path) -> ColumnarResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            fs::create_dir_all(parent)
                .map_err(|e| ColumnarError::io_at_path("Failed to create directory", parent, e))
        }
        _ => Ok(()),
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> ColumnarResult<()> {
    let mut file =
        File::create(path).map_err(|e| ColumnarError::io_at_path("Failed to create", path, e))?;
    file.write_all(bytes)
        .map_err(|e| ColumnarError::io_at_path("Failed to write", path, e))?;
    file.sync_all()
        .map_err(|e| ColumnarError::io_at_path("Failed to fsync", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{ColumnType, Value};
    use tempfile::TempDir;

    fn schema(entries: &[(&str, ColumnType)]) -> Schema {
        entries.iter().map(|(n, t)| (n.to_string(), *t)).collect()
    }

    #[test]
    fn test_unequal_lengths_rejected_before_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("t.col");
        let columns = vec![
            Column::from_values("a", [1, 2, 3]),
            Column::from_values("b", [1, 2]),
        ];
        let schema = schema(&[("a", ColumnType::Int), ("b", ColumnType::Int)]);

        let err = ColumnarWriter::default().write(&path, &columns, &schema).unwrap_err();
        assert!(matches!(err, ColumnarError::SchemaMismatch(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let err = ColumnarWriter::default()
            .write(&temp_dir.path().join("t.col"), &[], &Schema::new())
            .unwrap_err();
        assert!(matches!(err, ColumnarError::SchemaMismatch(_)));
    }

    #[test]
    fn test_missing_schema_entry_is_unsupported_type() {
        let temp_dir = TempDir::new().unwrap();
        let columns = vec![Column::from_values("a", [1])];
        let err = ColumnarWriter::default()
            .write(&temp_dir.path().join("t.col"), &columns, &Schema::new())
            .unwrap_err();
        assert!(matches!(err, ColumnarError::UnsupportedType(_)));
    }

    #[test]
    fn test_value_type_mismatch_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let columns = vec![Column::new("a", vec![Value::Int(1), Value::from("two")])];
        let err = ColumnarWriter::default()
            .write(
                &temp_dir.path().join("t.col"),
                &columns,
                &schema(&[("a", ColumnType::Int)]),
            )
            .unwrap_err();
        assert!(matches!(err, ColumnarError::SchemaMismatch(_)));
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let columns = vec![Column::from_values("a", [1]), Column::from_values("a", [2])];
        let err = ColumnarWriter::default()
            .write(
                &temp_dir.path().join("t.col"),
                &columns,
                &schema(&[("a", ColumnType::Int)]),
            )
            .unwrap_err();
        assert!(matches!(err, ColumnarError::SchemaMismatch(_)));
    }

    #[test]
    fn test_single_file_header_and_size() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("t.col");
        let columns = vec![
            Column::from_values("id", [1, 2, 3]),
            Column::from_values("name", ["x", "yy", "zzz"]),
        ];
        let schema = schema(&[("id", ColumnType::Int), ("name", ColumnType::String)]);

        let summary = ColumnarWriter::default().write(&path, &columns, &schema).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(summary.bytes_written, bytes.len() as u64);
        let metadata_len = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        let metadata = FileMetadata::from_json_bytes(&bytes[4..4 + metadata_len]).unwrap();
        assert_eq!(metadata.num_rows, 3);
        assert_eq!(metadata.columns[0].length, 12);
        assert_eq!(metadata.columns[1].length, 4 * 3 + 6);
        assert_eq!(
            4 + metadata_len as u64 + metadata.payload_bytes(),
            bytes.len() as u64
        );
    }

    #[test]
    fn test_schema_extras_not_stored() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("t.col");
        let columns = vec![Column::from_values("a", [1.5])];
        let schema = schema(&[("a", ColumnType::Float), ("unused", ColumnType::Int)]);

        ColumnarWriter::default().write(&path, &columns, &schema).unwrap();

        let bytes = fs::read(&path).unwrap();
        let metadata_len = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        let metadata = FileMetadata::from_json_bytes(&bytes[4..4 + metadata_len]).unwrap();
        assert_eq!(metadata.schema.len(), 1);
    }

    #[test]
    fn test_directory_layout_files() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("artifact");
        let columns = vec![
            Column::from_values("a", [1, 2]),
            Column::from_values("b", ["p", "q"]),
        ];
        let schema = schema(&[("a", ColumnType::Int), ("b", ColumnType::String)]);

        let summary = ColumnarWriter::new(WriteOptions::directory().with_compression(Compression::Zlib))
            .write(&dest, &columns, &schema)
            .unwrap();
        assert_eq!(summary.layout, Layout::Directory);

        let metadata =
            DirectoryMetadata::from_json_bytes(&fs::read(dest.join(DIRECTORY_METADATA_FILE)).unwrap())
                .unwrap();
        assert_eq!(metadata.columns[0].file, "col_0000.bin");
        assert_eq!(fs::read(dest.join("col_0000.bin")).unwrap().len(), 8);
        // Raw payload even though compression was requested
        assert_eq!(fs::read(dest.join("col_0001.bin")).unwrap().len(), 10);
    }
}
