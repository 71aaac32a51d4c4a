//! colstore CLI entry point
//!
//! Parses arguments and dispatches through `cli::run`. Command failures are
//! reported as JSON on stdout by the command layer; only the exit code is
//! decided here.

use colstore::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
