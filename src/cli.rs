//! CLI argument parsing for lockline.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Lockline: file-based cross-process locks and atomic JSONL journals.
///
/// A lock is a marker file (`<path>.lock`) created with exclusive-create
/// semantics. Journal operations append and drain newline-delimited JSON
/// records while holding the corresponding lock.
#[derive(Parser, Debug)]
#[command(name = "lockline")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Available commands for lockline.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the lock status of a target path.
    ///
    /// Reads the marker file next to the target and reports the holder's
    /// pid, host, age, and whether the lock is stale.
    Status(StatusArgs),

    /// Force-remove the marker for a target path.
    ///
    /// The caller is responsible for verifying that the holder is truly
    /// gone; this does not check staleness.
    Clear(ClearArgs),

    /// Append one JSON record to a journal, atomically.
    Append(AppendArgs),

    /// Drain a journal: print every record and clear the file.
    Drain(DrainArgs),
}

/// Arguments for the status command.
#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// The locked target path (not the marker itself).
    pub path: PathBuf,
}

/// Arguments for the clear command.
#[derive(clap::Args, Debug)]
pub struct ClearArgs {
    /// The locked target path (not the marker itself).
    pub path: PathBuf,
}

/// Arguments for the append command.
#[derive(clap::Args, Debug)]
pub struct AppendArgs {
    /// The journal file to append to.
    pub path: PathBuf,

    /// The record to append, as a JSON value.
    pub record: String,

    /// Take the lock and open the journal, but write nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// How long to wait for the journal lock, in milliseconds.
    #[arg(long, default_value_t = 30_000)]
    pub timeout_ms: u64,
}

/// Arguments for the drain command.
#[derive(clap::Args, Debug)]
pub struct DrainArgs {
    /// The journal file to drain.
    pub path: PathBuf,

    /// Print the records but keep the file.
    #[arg(long)]
    pub dry_run: bool,

    /// How long to wait for the journal lock, in milliseconds.
    #[arg(long, default_value_t = 30_000)]
    pub timeout_ms: u64,
}
