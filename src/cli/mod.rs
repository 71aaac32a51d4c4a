//! CLI module for colstore
//!
//! Provides command-line interface for:
//! - convert: CSV to columnar artifact
//! - query: one-shot query execution
//! - inspect: artifact metadata
//! - explain: query description without reading data

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{convert, explain, inspect, query, run, run_command};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
