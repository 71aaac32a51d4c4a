//! Observability for colstore
//!
//! Structured logging only. Logging is read-only: it never changes the
//! outcome of the operation being logged.
//!
//! ```ignore
//! use colstore::observability::Logger;
//!
//! Logger::info("QUERY_EXECUTED", &[("rows", "42")]);
//! ```

mod logger;

pub use logger::{Logger, Severity};
