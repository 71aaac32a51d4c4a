//! Artifact reader with strict corruption detection
//!
//! - Metadata is parsed once at `open`; column data is never cached
//! - Payload extents come only from metadata (or file boundaries in the
//!   directory layout), never from payload content
//! - Every decoded column must hold exactly `num_rows` values

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::codec::{compute_checksum, decode_column, decode_exact, parse_checksum, ColumnType, Schema, Value};
use crate::errors::{ColumnarError, ColumnarResult};
use crate::observability::Logger;

use super::compression::decompress;
use super::metadata::{
    ArtifactMetadata, DirectoryMetadata, FileColumnMeta, FileMetadata, DIRECTORY_METADATA_FILE,
};
use super::options::Layout;

/// Size of the single-file metadata length header
pub const HEADER_LEN: u64 = 4;

/// Where a column's payload lives
#[derive(Debug, Clone)]
enum ColumnLocation {
    /// Absolute byte range inside the single artifact file
    Range { offset: u64, meta: FileColumnMeta },
    /// Separate payload file of a directory artifact
    File { path: PathBuf, column_type: ColumnType },
}

/// Random-access reader over one artifact.
///
/// Holds no open file handle; each `read_column` opens its own, so a reader
/// can be shared between threads.
#[derive(Debug, Clone)]
pub struct ColumnarReader {
    path: PathBuf,
    metadata: ArtifactMetadata,
    locations: Vec<ColumnLocation>,
    index: HashMap<String, usize>,
}

impl ColumnarReader {
    /// Opens an artifact, detecting its layout.
    ///
    /// A directory is read as a directory artifact, anything else as a
    /// single-file artifact.
    ///
    /// # Errors
    ///
    /// - `Io` if the source cannot be opened
    /// - `CorruptData` if the header or metadata is malformed, or declared
    ///   lengths run past the end of the file
    pub fn open(source: &Path) -> ColumnarResult<Self> {
        let stat = fs::metadata(source)
            .map_err(|e| ColumnarError::io_at_path("Failed to open", source, e))?;

        let reader = if stat.is_dir() {
            Self::open_directory(source)?
        } else {
            Self::open_file(source, stat.len())?
        };

        Logger::info(
            "ARTIFACT_OPENED",
            &[
                ("path", &source.display().to_string()),
                ("layout", reader.layout().as_str()),
                ("num_rows", &reader.num_rows().to_string()),
                ("num_columns", &reader.locations.len().to_string()),
            ],
        );
        Ok(reader)
    }

    fn open_file(path: &Path, file_size: u64) -> ColumnarResult<Self> {
        if file_size < HEADER_LEN {
            return Err(ColumnarError::CorruptData(format!(
                "metadata length missing: file is {} bytes",
                file_size
            )));
        }

        let mut file =
            File::open(path).map_err(|e| ColumnarError::io_at_path("Failed to open", path, e))?;

        let mut len_buf = [0u8; 4];
        read_exact_at(&mut file, path, 0, &mut len_buf)?;
        let metadata_len = u32::from_le_bytes(len_buf) as u64;

        if metadata_len > file_size - HEADER_LEN {
            return Err(ColumnarError::corrupt_at_offset(
                0,
                format!(
                    "metadata length {} exceeds remaining file size {}",
                    metadata_len,
                    file_size - HEADER_LEN
                ),
            ));
        }

        let mut metadata_buf = vec![0u8; metadata_len as usize];
        read_exact_at(&mut file, path, HEADER_LEN, &mut metadata_buf)?;
        let metadata = FileMetadata::from_json_bytes(&metadata_buf)?;

        // Prefix-sum declared lengths from the end of the metadata block
        let mut locations = Vec::with_capacity(metadata.columns.len());
        let mut offset = HEADER_LEN + metadata_len;
        for column in &metadata.columns {
            locations.push(ColumnLocation::Range {
                offset,
                meta: column.clone(),
            });
            offset = offset.checked_add(column.length).ok_or_else(|| {
                ColumnarError::CorruptData(format!("column '{}' length overflows", column.name))
            })?;
        }
        if offset > file_size {
            return Err(ColumnarError::CorruptData(format!(
                "declared payloads end at byte {}, file is {} bytes",
                offset, file_size
            )));
        }

        let index = build_index(metadata.columns.iter().map(|c| c.name.as_str()));
        Ok(Self {
            path: path.to_path_buf(),
            metadata: ArtifactMetadata::File(metadata),
            locations,
            index,
        })
    }

    fn open_directory(dir: &Path) -> ColumnarResult<Self> {
        let metadata_path = dir.join(DIRECTORY_METADATA_FILE);
        let bytes = fs::read(&metadata_path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ColumnarError::CorruptData(format!(
                    "directory artifact has no {}: {}",
                    DIRECTORY_METADATA_FILE,
                    dir.display()
                ))
            } else {
                ColumnarError::io_at_path("Failed to read", &metadata_path, e)
            }
        })?;
        let metadata = DirectoryMetadata::from_json_bytes(&bytes)?;

        let locations = metadata
            .columns
            .iter()
            .map(|c| ColumnLocation::File {
                path: dir.join(&c.file),
                column_type: c.column_type,
            })
            .collect();

        let index = build_index(metadata.columns.iter().map(|c| c.name.as_str()));
        Ok(Self {
            path: dir.to_path_buf(),
            metadata: ArtifactMetadata::Directory(metadata),
            locations,
            index,
        })
    }

    /// Path the artifact was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn layout(&self) -> Layout {
        match self.metadata {
            ArtifactMetadata::File(_) => Layout::File,
            ArtifactMetadata::Directory(_) => Layout::Directory,
        }
    }

    pub fn metadata(&self) -> &ArtifactMetadata {
        &self.metadata
    }

    pub fn num_rows(&self) -> u64 {
        self.metadata.num_rows()
    }

    pub fn schema(&self) -> &Schema {
        self.metadata.schema()
    }

    /// Column names in storage order
    pub fn column_names(&self) -> Vec<&str> {
        self.metadata.columns().into_iter().map(|(name, _)| name).collect()
    }

    /// Declared type of a column, if present
    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.index.get(name).map(|&i| match &self.locations[i] {
            ColumnLocation::Range { meta, .. } => meta.column_type,
            ColumnLocation::File { column_type, .. } => *column_type,
        })
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Reads and decodes one column from storage.
    ///
    /// Every call goes back to storage.
    ///
    /// # Errors
    ///
    /// - `ColumnNotFound` if `name` is not in the metadata
    /// - `CorruptData` on checksum, decompression, decoding or row-count failure
    /// - `Io` on filesystem failure
    pub fn read_column(&self, name: &str) -> ColumnarResult<Vec<Value>> {
        let idx = *self
            .index
            .get(name)
            .ok_or_else(|| ColumnarError::ColumnNotFound(name.to_string()))?;

        let result = match &self.locations[idx] {
            ColumnLocation::Range { offset, meta } => self.read_range(*offset, meta),
            ColumnLocation::File { path, column_type } => self.read_column_file(path, *column_type),
        };

        match &result {
            Ok(values) => Logger::trace(
                "COLUMN_READ",
                &[
                    ("path", &self.path.display().to_string()),
                    ("column", name),
                    ("rows", &values.len().to_string()),
                ],
            ),
            Err(e) if e.is_fatal() => Logger::error(
                "CORRUPTION_DETECTED",
                &[
                    ("path", &self.path.display().to_string()),
                    ("column", name),
                    ("error", &e.to_string()),
                ],
            ),
            Err(_) => {}
        }
        result
    }

    fn read_range(&self, offset: u64, meta: &FileColumnMeta) -> ColumnarResult<Vec<Value>> {
        let mut file = File::open(&self.path)
            .map_err(|e| ColumnarError::io_at_path("Failed to open", &self.path, e))?;
        let mut stored = vec![0u8; meta.length as usize];
        read_exact_at(&mut file, &self.path, offset, &mut stored)?;

        if let Some(expected) = &meta.checksum {
            let expected = parse_checksum(expected).ok_or_else(|| {
                ColumnarError::CorruptData(format!(
                    "column '{}' has malformed checksum '{}'",
                    meta.name, expected
                ))
            })?;
            let actual = compute_checksum(&stored);
            if actual != expected {
                return Err(ColumnarError::corrupt_at_offset(
                    offset,
                    format!(
                        "checksum mismatch in column '{}': expected {:08x}, got {:08x}",
                        meta.name, expected, actual
                    ),
                ));
            }
        }

        let payload = decompress(meta.compression, stored, meta.uncompressed_length())?;
        let values = decode_column(meta.column_type, &payload)
            .map_err(|e| in_column(&meta.name, e))?;
        self.check_row_count(&meta.name, values.len())?;
        Ok(values)
    }

    fn read_column_file(&self, path: &Path, column_type: ColumnType) -> ColumnarResult<Vec<Value>> {
        let payload = fs::read(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ColumnarError::CorruptData(format!("column file missing: {}", path.display()))
            } else {
                ColumnarError::io_at_path("Failed to read", path, e)
            }
        })?;

        let num_rows = usize::try_from(self.num_rows()).map_err(|_| {
            ColumnarError::CorruptData(format!("row count {} is not addressable", self.num_rows()))
        })?;
        let (values, consumed) = decode_exact(column_type, &payload, num_rows)
            .map_err(|e| in_file(path, e))?;
        if consumed != payload.len() {
            return Err(ColumnarError::CorruptData(format!(
                "{}: {} trailing bytes after {} rows",
                path.display(),
                payload.len() - consumed,
                num_rows
            )));
        }
        Ok(values)
    }

    fn check_row_count(&self, name: &str, decoded: usize) -> ColumnarResult<()> {
        if decoded as u64 != self.num_rows() {
            return Err(ColumnarError::CorruptData(format!(
                "column '{}' has {} rows, expected {}",
                name,
                decoded,
                self.num_rows()
            )));
        }
        Ok(())
    }
}

fn build_index<'a>(names: impl Iterator<Item = &'a str>) -> HashMap<String, usize> {
    names.enumerate().map(|(i, n)| (n.to_string(), i)).collect()
}

fn read_exact_at(file: &mut File, path: &Path, offset: u64, buf: &mut [u8]) -> ColumnarResult<()> {
    file.seek(SeekFrom::Start(offset))
        .map_err(|e| ColumnarError::io_at_path("Failed to seek", path, e))?;
    file.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            ColumnarError::corrupt_at_offset(
                offset,
                format!("truncated artifact: wanted {} bytes", buf.len()),
            )
        } else {
            ColumnarError::io_at_path("Failed to read", path, e)
        }
    })
}

fn in_column(name: &str, err: ColumnarError) -> ColumnarError {
    match err {
        ColumnarError::CorruptData(msg) => {
            ColumnarError::CorruptData(format!("column '{}': {}", name, msg))
        }
        other => other,
    }
}

fn in_file(path: &Path, err: ColumnarError) -> ColumnarError {
    match err {
        ColumnarError::CorruptData(msg) => {
            ColumnarError::CorruptData(format!("{}: {}", path.display(), msg))
        }
        other => other,
    }
}
