//! Writer configuration: physical layout and payload compression

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Physical artifact layout.
///
/// Chosen at write time; detected at read time from the artifact itself
/// (a regular file vs. a directory).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Length-prefixed metadata followed by concatenated payloads
    #[default]
    File,
    /// One payload file per column plus `metadata.json`
    Directory,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::File => "file",
            Layout::Directory => "directory",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(Layout::File),
            "directory" | "dir" => Ok(Layout::Directory),
            other => Err(format!("unknown layout '{}', expected 'file' or 'directory'", other)),
        }
    }
}

/// Payload compression codec.
///
/// Serialized as the metadata `compression` field; `None` is written by
/// omitting the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    None,
    /// DEFLATE with zlib framing
    Zlib,
}

impl Compression {
    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Zlib => "zlib",
        }
    }

    pub fn is_none(&self) -> bool {
        *self == Compression::None
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Compression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Compression::None),
            "zlib" => Ok(Compression::Zlib),
            other => Err(format!("unknown compression '{}', expected 'none' or 'zlib'", other)),
        }
    }
}

/// Default zlib level
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Options for `ColumnarWriter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    pub layout: Layout,
    /// Only honored by the single-file layout
    pub compression: Compression,
    /// zlib level, 0..=9
    pub compression_level: u32,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            layout: Layout::File,
            compression: Compression::None,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl WriteOptions {
    /// Single file, uncompressed
    pub fn single_file() -> Self {
        Self::default()
    }

    /// Single file, zlib-compressed payloads
    pub fn compressed() -> Self {
        Self {
            compression: Compression::Zlib,
            ..Self::default()
        }
    }

    /// Directory layout (payloads are never compressed)
    pub fn directory() -> Self {
        Self {
            layout: Layout::Directory,
            ..Self::default()
        }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Levels above 9 are clamped to 9
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level.min(9);
        self
    }
}
