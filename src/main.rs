//! Lockline: file-based cross-process locks and atomic JSONL journals.
//!
//! This is the main entry point for the `lockline` CLI. It parses
//! arguments, dispatches to the appropriate command handler, and handles
//! errors with proper exit codes.

mod cli;
mod commands;

use cli::Cli;
use lockline::exit_codes;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match commands::dispatch(cli.command) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            // Return appropriate exit code
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
