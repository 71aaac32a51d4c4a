//! CLI argument definitions using clap
//!
//! Commands:
//! - colstore convert <csv> <dest> [--layout] [--compression]
//! - colstore query <artifact> <sql>
//! - colstore inspect <artifact>
//! - colstore explain <sql>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::storage::{Compression, Layout};

/// colstore - immutable columnar files with a small SQL surface
#[derive(Parser, Debug)]
#[command(name = "colstore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert a CSV file into a columnar artifact
    Convert {
        /// CSV file with a header row
        csv: PathBuf,

        /// Destination file or directory
        dest: PathBuf,

        /// Physical layout: file or directory
        #[arg(long)]
        layout: Option<Layout>,

        /// Payload compression: none or zlib
        #[arg(long)]
        compression: Option<Compression>,

        /// Path to configuration file
        #[arg(long, default_value = "./colstore.json")]
        config: PathBuf,
    },

    /// Run one SELECT statement against an artifact
    Query {
        /// Artifact file or directory
        artifact: PathBuf,

        /// Query text, e.g. "SELECT name FROM t WHERE age > 35"
        sql: String,

        /// Path to configuration file
        #[arg(long, default_value = "./colstore.json")]
        config: PathBuf,
    },

    /// Print an artifact's metadata
    Inspect {
        /// Artifact file or directory
        artifact: PathBuf,

        /// Path to configuration file
        #[arg(long, default_value = "./colstore.json")]
        config: PathBuf,
    },

    /// Describe how a query would run, without reading data
    Explain {
        /// Query text
        sql: String,

        /// Path to configuration file
        #[arg(long, default_value = "./colstore.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
