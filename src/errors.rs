//! Error types for the columnar engine
//!
//! Error codes:
//! - COL_SCHEMA_MISMATCH (ERROR)
//! - COL_UNSUPPORTED_TYPE (ERROR)
//! - COL_IO_ERROR (ERROR)
//! - COL_CORRUPT_DATA (FATAL)
//! - COL_COLUMN_NOT_FOUND (ERROR)
//! - COL_QUERY_SYNTAX (ERROR)
//! - COL_UNSUPPORTED_AGGREGATE (ERROR)
//! - COL_VALUE_CAST (ERROR)

use std::fmt;
use std::io;
use std::path::Path;

use thiserror::Error;

/// Severity levels for engine errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The call failed, the artifact is fine
    Error,
    /// The artifact itself cannot be trusted
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Result type for engine operations
pub type ColumnarResult<T> = Result<T, ColumnarError>;

/// Errors raised by the codec, the storage layer and the query executor.
///
/// Every error is terminal for the call that raised it.
#[derive(Debug, Error)]
pub enum ColumnarError {
    /// Column shapes or values do not agree with each other or the schema
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Unknown type tag, or a value that cannot be encoded under its tag
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Filesystem failure
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// Malformed or truncated metadata/payload, or a row-count mismatch
    #[error("Corrupt data: {0}")]
    CorruptData(String),

    /// Column absent from the artifact metadata
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Query text does not follow the grammar
    #[error("Query syntax error: {0}")]
    QuerySyntax(String),

    /// Aggregate function is unknown or not applicable to the column
    #[error("Unsupported aggregate: {0}")]
    UnsupportedAggregate(String),

    /// Predicate literal does not parse as the column's type
    #[error("Cannot cast '{literal}' to {target}")]
    ValueCast { literal: String, target: String },
}

impl ColumnarError {
    /// Wraps an I/O error with a message
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        ColumnarError::Io {
            context: context.into(),
            source,
        }
    }

    /// Wraps an I/O error with the path it happened on
    pub fn io_at_path(action: &str, path: &Path, source: io::Error) -> Self {
        Self::io(format!("{} {}", action, path.display()), source)
    }

    /// Corruption error carrying a byte offset
    pub fn corrupt_at_offset(offset: u64, reason: impl fmt::Display) -> Self {
        ColumnarError::CorruptData(format!("{} (byte_offset: {})", reason, offset))
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ColumnarError::SchemaMismatch(_) => "COL_SCHEMA_MISMATCH",
            ColumnarError::UnsupportedType(_) => "COL_UNSUPPORTED_TYPE",
            ColumnarError::Io { .. } => "COL_IO_ERROR",
            ColumnarError::CorruptData(_) => "COL_CORRUPT_DATA",
            ColumnarError::ColumnNotFound(_) => "COL_COLUMN_NOT_FOUND",
            ColumnarError::QuerySyntax(_) => "COL_QUERY_SYNTAX",
            ColumnarError::UnsupportedAggregate(_) => "COL_UNSUPPORTED_AGGREGATE",
            ColumnarError::ValueCast { .. } => "COL_VALUE_CAST",
        }
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        match self {
            ColumnarError::CorruptData(_) => Severity::Fatal,
            _ => Severity::Error,
        }
    }

    /// Returns whether the artifact involved should no longer be trusted
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}
