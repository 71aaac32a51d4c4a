//! CLI command implementations
//!
//! Each command loads the configuration, does its work and returns the
//! `data` payload; `run_command` wraps it in the JSON envelope.

use std::path::Path;

use serde_json::{json, Value};

use crate::ingest::csv_to_columnar;
use crate::observability::Logger;
use crate::query::{self, QueryEngine};
use crate::storage::{ColumnarReader, Compression, Layout};

use super::args::Command;
use super::config::Config;
use super::errors::CliResult;
use super::io::{write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command and print its JSON response
pub fn run_command(cmd: Command) -> CliResult<()> {
    let result = match cmd {
        Command::Convert {
            csv,
            dest,
            layout,
            compression,
            config,
        } => convert(&config, &csv, &dest, layout, compression),
        Command::Query {
            artifact,
            sql,
            config,
        } => query(&config, &artifact, &sql),
        Command::Inspect { artifact, config } => inspect(&config, &artifact),
        Command::Explain { sql, config } => explain(&config, &sql),
    };

    match result {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

fn load_config(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.log_severity()?);
    Ok(config)
}

/// Convert a CSV file into an artifact
pub fn convert(
    config_path: &Path,
    csv_path: &Path,
    destination: &Path,
    layout: Option<Layout>,
    compression: Option<Compression>,
) -> CliResult<Value> {
    let config = load_config(config_path)?;
    let options = config.write_options(layout, compression)?;

    let summary = csv_to_columnar(csv_path, destination, &options)?;

    Ok(json!({
        "path": summary.path.display().to_string(),
        "layout": summary.layout.as_str(),
        "num_rows": summary.num_rows,
        "num_columns": summary.num_columns,
        "bytes_written": summary.bytes_written,
    }))
}

/// Execute a single query against an artifact
pub fn query(config_path: &Path, artifact: &Path, sql: &str) -> CliResult<Value> {
    load_config(config_path)?;

    let reader = ColumnarReader::open(artifact)?;
    let rows = QueryEngine::new(&reader).execute(sql)?;

    Ok(serde_json::to_value(rows)?)
}

/// Describe an artifact's metadata
pub fn inspect(config_path: &Path, artifact: &Path) -> CliResult<Value> {
    load_config(config_path)?;

    let reader = ColumnarReader::open(artifact)?;

    Ok(json!({
        "path": reader.path().display().to_string(),
        "layout": reader.layout().as_str(),
        "metadata": serde_json::to_value(reader.metadata())?,
    }))
}

/// Explain a query without opening any artifact
pub fn explain(config_path: &Path, sql: &str) -> CliResult<Value> {
    load_config(config_path)?;

    let plan = query::explain(sql)?;
    Ok(serde_json::to_value(plan)?)
}
