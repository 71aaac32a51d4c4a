//! Artifact metadata documents
//!
//! Single-file layout (stored after the u32 LE length header):
//! ```json
//! {
//!   "columns": [
//!     {"name": "id", "type": "int", "length": 12},
//!     {"name": "name", "type": "string", "length": 31, "original_length": 29,
//!      "compression": "zlib", "checksum": "crc32:0badf00d"}
//!   ],
//!   "num_rows": 3,
//!   "schema": {"id": "int", "name": "string"},
//!   "format_version": 1,
//!   "created_at": "2026-10-19T10:00:00Z"
//! }
//! ```
//!
//! Directory layout (`metadata.json`): the same, with `{"name", "type", "file"}`
//! column entries and no lengths.
//!
//! Metadata is the only source of payload boundaries.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::codec::{ColumnType, Schema};
use crate::errors::{ColumnarError, ColumnarResult};

use super::options::Compression;

/// Metadata format version written by this crate
pub const FORMAT_VERSION: u32 = 1;

/// Metadata file name inside a directory artifact
pub const DIRECTORY_METADATA_FILE: &str = "metadata.json";

fn default_format_version() -> u32 {
    FORMAT_VERSION
}

/// One column entry of the single-file layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileColumnMeta {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Stored (possibly compressed) payload length in bytes
    pub length: u64,
    /// Encoded length before compression; absent when uncompressed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Compression::is_none")]
    pub compression: Compression,
    /// CRC32 of the stored payload bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl FileColumnMeta {
    /// Length of the encoded payload after decompression
    pub fn uncompressed_length(&self) -> u64 {
        self.original_length.unwrap_or(self.length)
    }
}

/// Metadata of a single-file artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub columns: Vec<FileColumnMeta>,
    pub num_rows: u64,
    pub schema: Schema,
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// One column entry of the directory layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryColumnMeta {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Payload file name, relative to the artifact directory
    pub file: String,
}

/// Metadata of a directory artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryMetadata {
    pub columns: Vec<DirectoryColumnMeta>,
    pub num_rows: u64,
    pub schema: Schema,
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Metadata of either layout
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArtifactMetadata {
    File(FileMetadata),
    Directory(DirectoryMetadata),
}

impl ArtifactMetadata {
    pub fn num_rows(&self) -> u64 {
        match self {
            ArtifactMetadata::File(m) => m.num_rows,
            ArtifactMetadata::Directory(m) => m.num_rows,
        }
    }

    pub fn schema(&self) -> &Schema {
        match self {
            ArtifactMetadata::File(m) => &m.schema,
            ArtifactMetadata::Directory(m) => &m.schema,
        }
    }

    /// Column names and types in storage order
    pub fn columns(&self) -> Vec<(&str, ColumnType)> {
        match self {
            ArtifactMetadata::File(m) => m
                .columns
                .iter()
                .map(|c| (c.name.as_str(), c.column_type))
                .collect(),
            ArtifactMetadata::Directory(m) => m
                .columns
                .iter()
                .map(|c| (c.name.as_str(), c.column_type))
                .collect(),
        }
    }

    pub fn created_at(&self) -> Option<&str> {
        match self {
            ArtifactMetadata::File(m) => m.created_at.as_deref(),
            ArtifactMetadata::Directory(m) => m.created_at.as_deref(),
        }
    }
}

fn to_json_bytes<T: Serialize>(value: &T) -> ColumnarResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| {
        ColumnarError::io(
            "Failed to serialize metadata",
            std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        )
    })
}

fn from_json_bytes<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> ColumnarResult<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| ColumnarError::CorruptData(format!("Failed to parse metadata: {}", e)))
}

/// Checks the column list against the schema: names unique, every column
/// in the schema with the same type, and nothing in the schema left over.
fn validate_columns<'a>(
    columns: impl Iterator<Item = (&'a str, ColumnType)>,
    schema: &Schema,
) -> ColumnarResult<()> {
    let mut seen = HashSet::new();
    for (name, column_type) in columns {
        if !seen.insert(name) {
            return Err(ColumnarError::CorruptData(format!(
                "duplicate column '{}' in metadata",
                name
            )));
        }
        match schema.get(name) {
            Some(declared) if *declared == column_type => {}
            Some(declared) => {
                return Err(ColumnarError::CorruptData(format!(
                    "column '{}' is {} but the schema declares {}",
                    name, column_type, declared
                )))
            }
            None => {
                return Err(ColumnarError::CorruptData(format!(
                    "column '{}' missing from schema",
                    name
                )))
            }
        }
    }
    if seen.len() != schema.len() {
        return Err(ColumnarError::CorruptData(format!(
            "schema lists {} columns, metadata stores {}",
            schema.len(),
            seen.len()
        )));
    }
    Ok(())
}

impl FileMetadata {
    pub fn to_json_bytes(&self) -> ColumnarResult<Vec<u8>> {
        to_json_bytes(self)
    }

    /// Parses and validates a metadata document.
    ///
    /// # Errors
    ///
    /// `CorruptData` if the document does not parse or is inconsistent.
    pub fn from_json_bytes(bytes: &[u8]) -> ColumnarResult<Self> {
        let metadata: Self = from_json_bytes(bytes)?;
        metadata.validate()?;
        Ok(metadata)
    }

    fn validate(&self) -> ColumnarResult<()> {
        validate_columns(
            self.columns.iter().map(|c| (c.name.as_str(), c.column_type)),
            &self.schema,
        )?;
        for column in &self.columns {
            match (column.compression, column.original_length) {
                (Compression::Zlib, None) => {
                    return Err(ColumnarError::CorruptData(format!(
                        "compressed column '{}' has no original_length",
                        column.name
                    )))
                }
                (Compression::None, Some(original)) if original != column.length => {
                    return Err(ColumnarError::CorruptData(format!(
                        "uncompressed column '{}' declares length {} but original_length {}",
                        column.name, column.length, original
                    )))
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Sum of the stored payload lengths
    pub fn payload_bytes(&self) -> u64 {
        self.columns.iter().map(|c| c.length).sum()
    }
}

impl DirectoryMetadata {
    pub fn to_json_bytes(&self) -> ColumnarResult<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| {
            ColumnarError::io(
                "Failed to serialize metadata",
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })
    }

    /// Parses and validates a metadata document.
    pub fn from_json_bytes(bytes: &[u8]) -> ColumnarResult<Self> {
        let metadata: Self = from_json_bytes(bytes)?;
        validate_columns(
            metadata.columns.iter().map(|c| (c.name.as_str(), c.column_type)),
            &metadata.schema,
        )?;
        for column in &metadata.columns {
            if column.file.is_empty()
                || column.file.contains('/')
                || column.file.contains('\\')
                || column.file == ".."
            {
                return Err(ColumnarError::CorruptData(format!(
                    "column '{}' references invalid file name '{}'",
                    column.name, column.file
                )));
            }
        }
        Ok(metadata)
    }
}
