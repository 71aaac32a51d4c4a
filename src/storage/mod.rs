//! Columnar storage engine
//!
//! Artifacts are written once and never modified.
//!
//! # Layouts
//!
//! Single file:
//! ```text
//! offset 0      : u32 LE metadata length (L)
//! offset 4      : L bytes of JSON metadata
//! offset 4+L    : column payloads, concatenated in metadata order
//! ```
//!
//! Directory: `metadata.json` plus one raw payload file per column.
//!
//! Payload compression (zlib) applies to the single-file layout only.

mod compression;
mod metadata;
mod options;
mod reader;
mod writer;

pub use compression::{compress, decompress};
pub use metadata::{
    ArtifactMetadata, DirectoryColumnMeta, DirectoryMetadata, FileColumnMeta, FileMetadata,
    DIRECTORY_METADATA_FILE, FORMAT_VERSION,
};
pub use options::{Compression, Layout, WriteOptions, DEFAULT_COMPRESSION_LEVEL};
pub use reader::{ColumnarReader, HEADER_LEN};
pub use writer::{ColumnarWriter, WriteSummary};
